use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::domain::menu_analysis::{
    entities::{AnalysisResults, DishAnalysis, ErrorCode, Failure, TopDishes},
    helpers::round_half_up_mean,
};

/// Build the final result from the analyzed dishes (menu order).
///
/// Selection rules:
/// - healthiest: highest score, then lowest price (missing price ranks last), then menu order
/// - indulgent: lowest score, same tie-break as healthiest
/// - balanced: score closest to the median, then menu order
pub fn aggregate(
    dishes: Vec<DishAnalysis>,
    timestamp: DateTime<Utc>,
) -> Result<AnalysisResults, Failure> {
    if dishes.is_empty() {
        return Err(Failure::analysis_failed("aggregation received no dishes"));
    }

    let scores: Vec<u8> = dishes.iter().map(|d| d.health_score).collect();
    let average_health_score = round_half_up_mean(&scores);

    let healthiest = select_healthiest(&dishes);
    let indulgent = select_indulgent(&dishes);
    let balanced = select_balanced(&dishes);

    let top_dishes = TopDishes {
        healthiest: locate(&dishes, healthiest, "healthiest")?,
        balanced: locate(&dishes, balanced, "balanced")?,
        indulgent: locate(&dishes, indulgent, "indulgent")?,
    };

    Ok(AnalysisResults {
        timestamp,
        average_health_score,
        dishes,
        top_dishes,
    })
}

/// Missing prices sort after every real price.
fn compare_price(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(f64::INFINITY)
        .total_cmp(&b.unwrap_or(f64::INFINITY))
}

/// Index of the first dish that is strictly better than every earlier one.
fn select_by<F>(dishes: &[DishAnalysis], better: F) -> usize
where
    F: Fn(&DishAnalysis, &DishAnalysis) -> Ordering,
{
    dishes
        .iter()
        .enumerate()
        .skip(1)
        .fold(0, |best, (index, dish)| {
            if better(dish, &dishes[best]) == Ordering::Less {
                index
            } else {
                best
            }
        })
}

pub fn select_healthiest(dishes: &[DishAnalysis]) -> usize {
    select_by(dishes, |a, b| {
        b.health_score
            .cmp(&a.health_score)
            .then_with(|| compare_price(a.price, b.price))
    })
}

pub fn select_indulgent(dishes: &[DishAnalysis]) -> usize {
    select_by(dishes, |a, b| {
        a.health_score
            .cmp(&b.health_score)
            .then_with(|| compare_price(a.price, b.price))
    })
}

pub fn select_balanced(dishes: &[DishAnalysis]) -> usize {
    let median = median_score(dishes);
    select_by(dishes, |a, b| {
        let distance_a = (f64::from(a.health_score) - median).abs();
        let distance_b = (f64::from(b.health_score) - median).abs();
        distance_a.total_cmp(&distance_b)
    })
}

/// Mean of the two middle values for an even count.
fn median_score(dishes: &[DishAnalysis]) -> f64 {
    let mut scores: Vec<u8> = dishes.iter().map(|d| d.health_score).collect();
    scores.sort_unstable();

    let mid = scores.len() / 2;
    if scores.len() % 2 == 0 {
        (f64::from(scores[mid - 1]) + f64::from(scores[mid])) / 2.0
    } else {
        f64::from(scores[mid])
    }
}

fn locate(dishes: &[DishAnalysis], index: usize, role: &str) -> Result<DishAnalysis, Failure> {
    dishes.get(index).cloned().ok_or_else(|| {
        Failure::new(
            ErrorCode::DishNotFound,
            "A selected dish is missing from the analysis",
        )
        .with_details(format!(
            "{} selection points at index {} of {} dishes",
            role,
            index,
            dishes.len()
        ))
    })
}
