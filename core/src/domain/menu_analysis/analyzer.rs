use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::domain::menu_analysis::{
    entities::{
        DishAnalysis, DishCategory, DishError, HealthPrediction, MacroLevel, MacroProfile,
        ProviderError, RawMenuItem, UserProfile,
    },
    helpers::{as_number, extract_json, label_set, non_empty_string, string_list},
    ports::ProviderGateway,
    prompts::{ANALYSIS_SYSTEM_PROMPT, build_dish_prompt},
    value_objects::{CompletionRequest, Provider, ProviderPayload},
};

const DISH_MAX_TOKENS: u32 = 1024;

/// Score one menu item against the user's goals and restrictions.
///
/// Name and price are taken from the menu item; everything else comes from
/// the provider and is validated here.
#[instrument(skip_all, fields(dish = %item.name, provider = %provider))]
pub async fn analyze_dish<G>(
    gateway: &G,
    item: &RawMenuItem,
    profile: &UserProfile,
    provider: Provider,
) -> Result<DishAnalysis, DishError>
where
    G: ProviderGateway,
{
    let request = CompletionRequest::new(provider, build_dish_prompt(item, profile))
        .with_system_prompt(ANALYSIS_SYSTEM_PROMPT)
        .with_max_tokens(DISH_MAX_TOKENS)
        .expecting_json();

    let processing_failed = |source: ProviderError| DishError::ProcessingFailed {
        dish: item.name.clone(),
        source,
    };

    let value = match gateway.complete(request).await.map_err(processing_failed)? {
        ProviderPayload::Json(value) => value,
        ProviderPayload::Text(text) => extract_json(&text).ok_or_else(|| {
            processing_failed(ProviderError::malformed(
                provider,
                "dish analysis reply did not contain JSON",
            ))
        })?,
    };

    let analysis = parse_dish_analysis(item, &value)?;
    debug!(health_score = analysis.health_score, "Dish analyzed");

    Ok(analysis)
}

pub fn parse_dish_analysis(item: &RawMenuItem, value: &Value) -> Result<DishAnalysis, DishError> {
    let invalid = |reason: String| DishError::InvalidDish {
        dish: item.name.clone(),
        reason,
    };

    let object = value
        .as_object()
        .ok_or_else(|| invalid("expected a JSON object".to_string()))?;

    let raw_score = object
        .get("healthScore")
        .or_else(|| object.get("health_score"))
        .ok_or_else(|| invalid("missing healthScore".to_string()))?;
    let score = as_number(raw_score)
        .ok_or_else(|| invalid(format!("healthScore is not a number: {}", raw_score)))?;
    let health_score = score.round().clamp(0.0, 100.0) as u8;

    let macros = object
        .get("macros")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("missing macros".to_string()))
        .and_then(|macros| parse_macros(macros).map_err(invalid))?;

    let prediction = object
        .get("health_prediction")
        .or_else(|| object.get("healthPrediction"));

    Ok(DishAnalysis {
        name: item.name.clone(),
        price: item.price,
        macros,
        health_score,
        category: DishCategory::from_score(health_score),
        tags: label_set(object.get("tags")),
        flags: label_set(object.get("flags")),
        improvements: string_list(object.get("improvements")),
        health_prediction: HealthPrediction {
            short_term: non_empty_string(prediction.and_then(|p| p.get("short_term")))
                .unwrap_or_default(),
            long_term: non_empty_string(prediction.and_then(|p| p.get("long_term")))
                .unwrap_or_default(),
        },
    })
}

fn parse_macros(macros: &Map<String, Value>) -> Result<MacroProfile, String> {
    let calories = macros
        .get("calories")
        .and_then(as_number)
        .filter(|c| *c >= 0.0)
        .ok_or_else(|| "macros.calories must be a non-negative number".to_string())?;

    let level = |key: &str| {
        macros
            .get(key)
            .and_then(Value::as_str)
            .and_then(MacroLevel::parse)
            .ok_or_else(|| format!("macros.{} must be Low, Mid or High", key))
    };

    Ok(MacroProfile {
        calories: calories.round() as u32,
        protein: level("protein")?,
        carbs: level("carbs")?,
        fat: level("fat")?,
        sugar: level("sugar")?,
    })
}
