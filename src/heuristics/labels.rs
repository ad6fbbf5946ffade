//! Last-resort extraction straight from vision labels and detected text.
//!
//! Used when no language model could analyze the vision output. Labels are kept
//! if they name something edible; detected text is scanned for
//! "<quantity> <unit> <words>" lines.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::quantity::estimate_quantity;
use crate::schema::{Ingredient, VisionData};

const FOOD_KEYWORDS: &[&str] = &[
    "tomato", "onion", "pepper", "garlic", "ginger", "carrot", "potato", "yam", "plantain",
    "rice", "bean", "chicken", "beef", "goat", "fish", "shrimp", "crayfish", "egg", "cheese",
    "bread", "lettuce", "spinach", "cabbage", "cucumber", "broccoli", "mushroom", "apple",
    "banana", "orange", "lemon", "lime", "avocado", "meat", "pasta", "noodle", "corn", "okra",
    "basil", "parsley", "cilantro", "chili", "milk", "butter", "egusi", "melon seed",
    "palm oil", "leaf", "herb", "nut", "sausage", "bacon", "salmon", "tuna",
];

/// Labels the vision provider returns for scenes rather than ingredients.
const NON_INGREDIENT_TERMS: &[&str] = &[
    "food", "dish", "cuisine", "recipe", "ingredient", "produce", "meal", "tableware",
    "plate", "bowl", "cooking", "staple food", "natural foods", "whole food", "vegetable",
    "fruit", "superfood", "local food", "comfort food", "fast food", "finger food",
    "still life", "kitchen", "table", "leaf vegetable", "root vegetable", "fines herbes",
];

static QUANTITY_LINE: OnceLock<Regex> = OnceLock::new();

fn quantity_line() -> &'static Regex {
    QUANTITY_LINE.get_or_init(|| {
        Regex::new(
            r"(?i)(\d+(?:[./]\d+)?(?:\s*-\s*\d+)?)\s*(cups?|tablespoons?|tbsp|teaspoons?|tsp|grams?|g|kg|ounces?|oz|pounds?|lbs?|ml|liters?|litres?|cloves?|pieces?|pinch(?:es)?|cans?|slices?)\.?[ \t]+(?:of[ \t]+)?([a-z][a-z \t-]{1,40})",
        )
        .expect("quantity line pattern is valid")
    })
}

fn is_food_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    !NON_INGREDIENT_TERMS.contains(&lower.as_str())
        && FOOD_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Scan OCR text for explicit "<quantity> <unit> <name>" ingredient lines.
fn scan_detected_text(text: &str) -> Vec<Ingredient> {
    quantity_line()
        .captures_iter(text)
        .filter_map(|cap| {
            let amount = cap.get(1)?.as_str().replace(' ', "");
            let unit = cap.get(2)?.as_str().to_lowercase();
            let name = cap
                .get(3)?
                .as_str()
                .split_whitespace()
                .take(4)
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            if name.is_empty() {
                return None;
            }
            Some(Ingredient::new(name, format!("{} {}", amount, unit)))
        })
        .collect()
}

/// Build an ingredient list from raw vision output without a language model.
pub fn extract_from_vision(vision: &VisionData) -> Vec<Ingredient> {
    let mut seen = HashSet::new();
    let mut ingredients = Vec::new();

    for ingredient in scan_detected_text(&vision.detected_text) {
        if seen.insert(ingredient.name.clone()) {
            ingredients.push(ingredient);
        }
    }

    for label in vision.food_items.iter().filter(|l| is_food_label(l)) {
        let name = label.trim().to_lowercase();
        if seen.insert(name.clone()) {
            let quantity = estimate_quantity(&name);
            ingredients.push(Ingredient::new(name, quantity));
        }
    }

    debug!(
        "Heuristic vision extraction: {} ingredients from {} labels",
        ingredients.len(),
        vision.food_items.len()
    );
    ingredients
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vision(items: &[&str], text: &str) -> VisionData {
        VisionData {
            food_items: items.iter().map(|s| s.to_string()).collect(),
            detected_text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_labels_filtered() {
        let data = vision(&["Food", "Tomato", "Tableware", "Bell pepper", "Vegetable", "Rice"], "");
        let names: Vec<String> = extract_from_vision(&data)
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["tomato", "bell pepper", "rice"]);
    }

    #[test]
    fn test_detected_text_lines() {
        let data = vision(&[], "Jollof\n2 cups long grain rice\n1/2 tsp thyme\nServe hot");
        let found = extract_from_vision(&data);
        assert_eq!(
            found,
            vec![
                Ingredient::new("long grain rice", "2 cups"),
                Ingredient::new("thyme", "1/2 tsp"),
            ]
        );
    }

    #[test]
    fn test_text_wins_over_label_duplicate() {
        let data = vision(&["Rice"], "3 cups rice");
        let found = extract_from_vision(&data);
        assert_eq!(found, vec![Ingredient::new("rice", "3 cups")]);
    }

    #[test]
    fn test_nothing_edible() {
        assert!(extract_from_vision(&vision(&["Table", "Kitchen"], "Menu")).is_empty());
    }
}
