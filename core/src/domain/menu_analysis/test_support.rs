use futures::future::BoxFuture;
use serde_json::{Value, json};

use crate::domain::menu_analysis::{
    entities::{ProviderError, RawMenuItem},
    value_objects::ProviderPayload,
};

/// Boxed future in the shape `MockProviderGateway` expectations return.
pub fn reply(
    result: Result<ProviderPayload, ProviderError>,
) -> BoxFuture<'static, Result<ProviderPayload, ProviderError>> {
    Box::pin(async move { result })
}

pub fn reply_json(value: Value) -> BoxFuture<'static, Result<ProviderPayload, ProviderError>> {
    reply(Ok(ProviderPayload::Json(value)))
}

/// A well-formed dish analysis payload with the given score.
pub fn dish_payload(score: u8) -> Value {
    json!({
        "healthScore": score,
        "macros": {
            "calories": 650,
            "protein": "High",
            "carbs": "Mid",
            "fat": "Mid",
            "sugar": "Low"
        },
        "tags": ["High-Protein"],
        "flags": [],
        "improvements": ["Ask for dressing on the side"],
        "health_prediction": {
            "short_term": "Steady energy",
            "long_term": "Supports muscle maintenance"
        }
    })
}

pub fn menu_payload(items: &[RawMenuItem]) -> Value {
    Value::Array(
        items
            .iter()
            .map(|item| json!({ "name": item.name, "price": item.price }))
            .collect(),
    )
}

/// Stands in for a provider adapter that panics mid-call.
pub fn explode() -> Result<ProviderPayload, ProviderError> {
    panic!("provider adapter bug")
}
