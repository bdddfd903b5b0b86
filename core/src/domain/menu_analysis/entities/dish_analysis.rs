use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DishAnalysis {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub macros: MacroProfile,
    pub health_score: u8,
    pub category: DishCategory,
    pub tags: BTreeSet<String>,
    pub flags: BTreeSet<String>,
    pub improvements: Vec<String>,
    #[serde(rename = "health_prediction")]
    pub health_prediction: HealthPrediction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MacroProfile {
    pub calories: u32,
    pub protein: MacroLevel,
    pub carbs: MacroLevel,
    pub fat: MacroLevel,
    pub sugar: MacroLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MacroLevel {
    Low,
    Mid,
    High,
}

impl MacroLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(MacroLevel::Low),
            "mid" | "medium" | "moderate" => Some(MacroLevel::Mid),
            "high" => Some(MacroLevel::High),
            _ => None,
        }
    }
}

/// Score band a dish falls into. `Neutral` is only used for records that
/// were never scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DishCategory {
    Healthiest,
    Balanced,
    Indulgent,
    #[default]
    Neutral,
}

impl DishCategory {
    pub const HEALTHIEST_MIN_SCORE: u8 = 80;
    pub const BALANCED_MIN_SCORE: u8 = 50;

    pub fn from_score(score: u8) -> Self {
        if score >= Self::HEALTHIEST_MIN_SCORE {
            DishCategory::Healthiest
        } else if score >= Self::BALANCED_MIN_SCORE {
            DishCategory::Balanced
        } else {
            DishCategory::Indulgent
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthPrediction {
    pub short_term: String,
    pub long_term: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_bands() {
        assert_eq!(DishCategory::from_score(100), DishCategory::Healthiest);
        assert_eq!(DishCategory::from_score(80), DishCategory::Healthiest);
        assert_eq!(DishCategory::from_score(79), DishCategory::Balanced);
        assert_eq!(DishCategory::from_score(50), DishCategory::Balanced);
        assert_eq!(DishCategory::from_score(49), DishCategory::Indulgent);
        assert_eq!(DishCategory::from_score(0), DishCategory::Indulgent);
    }

    #[test]
    fn test_macro_level_synonyms() {
        assert_eq!(MacroLevel::parse("Medium"), Some(MacroLevel::Mid));
        assert_eq!(MacroLevel::parse(" HIGH "), Some(MacroLevel::High));
        assert_eq!(MacroLevel::parse("lots"), None);
    }
}
