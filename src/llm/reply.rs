//! Turning a model's free-text reply into an ingredient list.
//!
//! Models often wrap the JSON in prose or code fences. The reply is parsed
//! directly first; failing that, the first `[` through the last `]` is tried.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ProviderError;
use crate::heuristics::estimate_quantity;
use crate::schema::Ingredient;

static JSON_ARRAY: OnceLock<Regex> = OnceLock::new();

fn json_array() -> &'static Regex {
    JSON_ARRAY.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("array pattern is valid"))
}

/// Parse a model reply into ingredients.
pub fn parse_ingredient_reply(provider: &str, reply: &str) -> Result<Vec<Ingredient>, ProviderError> {
    let value = match serde_json::from_str::<Value>(reply.trim()) {
        Ok(value) => value,
        Err(_) => {
            let found = json_array()
                .find(reply)
                .ok_or_else(|| ProviderError::malformed(provider, "No JSON array found in response"))?;
            serde_json::from_str::<Value>(found.as_str()).map_err(|e| {
                ProviderError::malformed(provider, format!("Invalid JSON in response: {}", e))
            })?
        }
    };

    let items = match value {
        Value::Array(items) if !items.is_empty() => items,
        Value::Array(_) => return Err(ProviderError::malformed(provider, "Empty ingredient list")),
        _ => return Err(ProviderError::malformed(provider, "Response is not a JSON array")),
    };

    let ingredients: Vec<Ingredient> = items.iter().filter_map(to_ingredient).collect();
    if ingredients.is_empty() {
        return Err(ProviderError::malformed(provider, "No usable ingredients in response"));
    }
    Ok(ingredients)
}

/// Objects with a non-blank `name`; quantity is filled in when missing.
fn to_ingredient(item: &Value) -> Option<Ingredient> {
    let name = item.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let quantity = match item.get("quantity") {
        Some(Value::String(q)) if !q.trim().is_empty() => q.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => estimate_quantity(name).to_string(),
    };

    Some(Ingredient::new(name, quantity))
}
