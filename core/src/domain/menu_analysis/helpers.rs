use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;
use serde_json::Value;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("code fence pattern is valid")
});

static PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}(?:[,.]\d{3})+(?:[.,]\d{1,2})?|\d+(?:[.,]\d{1,2})?")
        .expect("price pattern is valid")
});

/// Parse a provider reply that should contain JSON, tolerating Markdown fences
/// and prose around the payload.
pub fn extract_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    if let Some(fenced) = CODE_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        if let Ok(value) = serde_json::from_str(fenced.as_str()) {
            return Some(value);
        }
    }

    // Prose may contain brackets of its own, so try the other delimiter pair
    // when the first one does not yield a document.
    let start = trimmed.find(['{', '['])?;
    let delimiters = if trimmed[start..].starts_with('{') {
        [('{', '}'), ('[', ']')]
    } else {
        [('[', ']'), ('{', '}')]
    };

    delimiters
        .into_iter()
        .filter_map(|(open, close)| outermost_span(trimmed, open, close))
        .find_map(|span| serde_json::from_str(span).ok())
}

fn outermost_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Number, or a string holding one.
pub fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Menu prices arrive as numbers or as printed strings ("$32", "€9,90").
pub fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_printed_price(s),
        _ => None,
    }?;

    (price.is_finite() && price >= 0.0).then_some(price)
}

/// A trailing separator followed by one or two digits is the decimal mark;
/// every other separator groups thousands ("1,250.00", "1.234,56", "¥1,200").
fn parse_printed_price(text: &str) -> Option<f64> {
    let number = PRICE.find(text)?.as_str();

    let normalized = match number.rfind([',', '.']) {
        Some(index) if number.len() - index - 1 <= 2 => {
            let (whole, fraction) = number.split_at(index);
            format!("{}.{}", whole.replace([',', '.'], ""), &fraction[1..])
        }
        _ => number.replace([',', '.'], ""),
    };

    normalized.parse::<f64>().ok()
}

pub fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|v| non_empty_string(Some(v)))
                .collect()
        })
        .unwrap_or_default()
}

/// Lowercased, trimmed, de-duplicated labels.
pub fn label_set(value: Option<&Value>) -> BTreeSet<String> {
    string_list(value)
        .into_iter()
        .map(|label| label.to_lowercase())
        .collect()
}

/// Integer mean rounded half up. Empty input yields 0.
pub fn round_half_up_mean(scores: &[u8]) -> u8 {
    if scores.is_empty() {
        return 0;
    }
    let sum: u32 = scores.iter().map(|&s| u32::from(s)).sum();
    let count = scores.len() as u32;
    ((2 * sum + count) / (2 * count)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_json_plain_and_fenced() {
        assert_eq!(extract_json("[1, 2]"), Some(json!([1, 2])));
        assert_eq!(
            extract_json("```json\n{\"a\": 1}\n```"),
            Some(json!({ "a": 1 }))
        );
        assert_eq!(
            extract_json("Here you go: {\"a\": {\"b\": 2}} hope it helps"),
            Some(json!({ "a": { "b": 2 } }))
        );
        assert_eq!(extract_json("no json here"), None);
    }

    #[test]
    fn test_extract_json_skips_bracketed_prose() {
        assert_eq!(
            extract_json("see [1]: {\"items\":[]}"),
            Some(json!({ "items": [] }))
        );
        assert_eq!(
            extract_json("As noted {sic}, here: [{\"name\": \"Soup\"}]"),
            Some(json!([{ "name": "Soup" }]))
        );
    }

    #[test]
    fn test_parse_price_variants() {
        assert_eq!(parse_price(&json!(32)), Some(32.0));
        assert_eq!(parse_price(&json!("$32")), Some(32.0));
        assert_eq!(parse_price(&json!("€9,90")), Some(9.9));
        assert_eq!(parse_price(&json!("12.50 USD")), Some(12.5));
        assert_eq!(parse_price(&json!("market price")), None);
        assert_eq!(parse_price(&json!(-4)), None);
        assert_eq!(parse_price(&Value::Null), None);
    }

    #[test]
    fn test_parse_price_thousands_separators() {
        assert_eq!(parse_price(&json!("¥1,200")), Some(1200.0));
        assert_eq!(parse_price(&json!("$1,250.00")), Some(1250.0));
        assert_eq!(parse_price(&json!("1.234,56 €")), Some(1234.56));
        assert_eq!(parse_price(&json!("₩15,000")), Some(15000.0));
        assert_eq!(parse_price(&json!("1200")), Some(1200.0));
    }

    #[test]
    fn test_as_number_accepts_numeric_strings() {
        assert_eq!(as_number(&json!("88")), Some(88.0));
        assert_eq!(as_number(&json!(71.5)), Some(71.5));
        assert_eq!(as_number(&json!("high")), None);
    }

    #[test]
    fn test_label_set_normalizes() {
        let labels = label_set(Some(&json!([" Vegan", "vegan", "", "High-Protein", 4])));
        assert_eq!(
            labels.into_iter().collect::<Vec<_>>(),
            vec!["high-protein", "vegan"]
        );
    }

    #[test]
    fn test_round_half_up_mean() {
        assert_eq!(round_half_up_mean(&[88, 55]), 72);
        assert_eq!(round_half_up_mean(&[40, 60, 90]), 63);
        assert_eq!(round_half_up_mean(&[1, 2]), 2);
        assert_eq!(round_half_up_mean(&[100]), 100);
        assert_eq!(round_half_up_mean(&[]), 0);
    }
}
