use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::domain::menu_analysis::{
    entities::{Failure, ProviderError, RawMenuItem, UserProfile},
    helpers::{extract_json, non_empty_string, parse_price},
    ports::ProviderGateway,
    prompts::{STRUCTURING_SYSTEM_PROMPT, build_structuring_prompt},
    value_objects::{CompletionRequest, Provider, ProviderPayload},
};

const STRUCTURING_MAX_TOKENS: u32 = 4096;
const ITEM_ARRAY_KEYS: [&str; 4] = ["items", "menuItems", "menu_items", "dishes"];

/// Turn normalized menu text into menu item candidates with one provider call.
///
/// Provider unavailability is reported as `PROVIDER_UNAVAILABLE` so the caller
/// can fall back to another backend; every other problem is
/// `MENU_STRUCTURING_FAILED`.
#[instrument(skip_all, fields(provider = %provider))]
pub async fn structure_menu<G>(
    gateway: &G,
    menu_text: &str,
    profile: &UserProfile,
    provider: Provider,
) -> Result<Vec<RawMenuItem>, Failure>
where
    G: ProviderGateway,
{
    let request = CompletionRequest::new(provider, build_structuring_prompt(menu_text, profile))
        .with_system_prompt(STRUCTURING_SYSTEM_PROMPT)
        .with_max_tokens(STRUCTURING_MAX_TOKENS)
        .expecting_json();

    let payload = gateway.complete(request).await.map_err(|e| match e {
        ProviderError::Unavailable { .. } => Failure::from(e),
        ProviderError::MalformedResponse { .. } => Failure::menu_structuring_failed(e.to_string()),
    })?;

    let items = parse_menu_items(payload)?;
    debug!(item_count = items.len(), "Menu structured");

    Ok(items)
}

pub fn parse_menu_items(payload: ProviderPayload) -> Result<Vec<RawMenuItem>, Failure> {
    let value = match payload {
        ProviderPayload::Json(value) => value,
        ProviderPayload::Text(text) => extract_json(&text).ok_or_else(|| {
            Failure::menu_structuring_failed("provider reply did not contain JSON")
        })?,
    };

    let entries = item_array(&value).ok_or_else(|| {
        Failure::menu_structuring_failed("provider reply did not contain a list of menu items")
    })?;

    if entries.is_empty() {
        return Err(Failure::menu_structuring_failed(
            "provider returned no menu items",
        ));
    }

    let items: Vec<RawMenuItem> = entries.iter().filter_map(parse_menu_item).collect();

    if items.is_empty() {
        return Err(Failure::menu_structuring_failed(format!(
            "none of the {} extracted entries had a name",
            entries.len()
        )));
    }

    if items.len() < entries.len() {
        warn!(
            dropped = entries.len() - items.len(),
            "Dropped menu entries without a name"
        );
    }

    Ok(items)
}

fn item_array(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(entries) => Some(entries),
        Value::Object(map) => ITEM_ARRAY_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array)),
        _ => None,
    }
}

fn parse_menu_item(entry: &Value) -> Option<RawMenuItem> {
    let name = non_empty_string(entry.get("name"))?;

    Some(RawMenuItem {
        name,
        price: entry.get("price").and_then(parse_price),
        description: non_empty_string(entry.get("description")),
        category: non_empty_string(entry.get("category")),
    })
}
