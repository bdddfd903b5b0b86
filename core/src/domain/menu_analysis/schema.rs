use serde_json::json;

/// Returns the JSON schema the menu structurer asks the provider to follow
pub fn get_menu_structure_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "price": { "type": ["number", "null"] },
                        "description": { "type": ["string", "null"] },
                        "category": { "type": ["string", "null"] }
                    },
                    "required": ["name"]
                }
            }
        },
        "required": ["items"]
    })
}

/// Returns the JSON schema for a single dish analysis response
pub fn get_dish_analysis_schema() -> serde_json::Value {
    let level = json!({ "type": "string", "enum": ["Low", "Mid", "High"] });

    json!({
        "type": "object",
        "properties": {
            "healthScore": { "type": "integer", "minimum": 0, "maximum": 100 },
            "macros": {
                "type": "object",
                "properties": {
                    "calories": { "type": "integer", "minimum": 0 },
                    "protein": level,
                    "carbs": level,
                    "fat": level,
                    "sugar": level
                },
                "required": ["calories", "protein", "carbs", "fat", "sugar"]
            },
            "tags": { "type": "array", "items": { "type": "string" } },
            "flags": { "type": "array", "items": { "type": "string" } },
            "improvements": { "type": "array", "items": { "type": "string" } },
            "health_prediction": {
                "type": "object",
                "properties": {
                    "short_term": { "type": "string" },
                    "long_term": { "type": "string" }
                },
                "required": ["short_term", "long_term"]
            }
        },
        "required": ["healthScore", "macros", "tags", "flags", "improvements", "health_prediction"]
    })
}
