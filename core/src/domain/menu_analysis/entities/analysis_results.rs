use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::menu_analysis::entities::DishAnalysis;

/// Final, immutable artifact of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResults {
    pub timestamp: DateTime<Utc>,
    pub average_health_score: u8,
    /// Menu order, never empty.
    pub dishes: Vec<DishAnalysis>,
    pub top_dishes: TopDishes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TopDishes {
    pub healthiest: DishAnalysis,
    pub balanced: DishAnalysis,
    pub indulgent: DishAnalysis,
}
