//! System prompts and user-content builders for each ingredient task.

use crate::schema::VisionData;

const OUTPUT_FORMAT: &str = r#"Return ONLY a JSON array, no prose and no markdown:
[{"name": "ingredient name", "quantity": "amount with unit"}]
Use an estimated common amount when no quantity is given."#;

/// Literal extraction from recipe text. Must not add ingredients the text does not mention.
pub const LITERAL_TEXT_SYSTEM: &str = r#"You extract grocery ingredients from recipe text.
List ONLY ingredients that are explicitly written in the text. Do not add ingredients that
are typical for the dish but not mentioned. Keep the quantities exactly as written.
"#;

/// Traditional dish lookup. Must enumerate the full authentic ingredient set.
pub const DISH_LOOKUP_SYSTEM: &str = r#"You are an expert in traditional and regional cooking.
Given the name of a dish, list the COMPLETE set of ingredients used in its authentic,
traditional preparation: proteins, vegetables, starches, oils, seasonings, spices and stock.
Do not simplify or substitute. Give realistic quantities for a family-sized serving.
"#;

/// Direct image analysis by a vision-capable model.
pub const IMAGE_SYSTEM: &str = r#"You identify food ingredients in photos.
List the ingredients you can see in the image. If a description is supplied, use it only to
disambiguate what is visible. Do not list ingredients you cannot see evidence of.
"#;

/// Analysis of pre-extracted vision labels. Must stay within what is plausibly visible.
pub const VISION_ANALYSIS_SYSTEM: &str = r#"You turn image-recognition output into a grocery ingredient list.
You receive labels, detected objects and any text read from a food photo.
Restrict the list to ingredients that are plausibly visible or written in the detected text.
If the data is ambiguous, return only what the data supports. Never fall back to a generic
recipe, and never pad the list with ingredients the data does not suggest.
"#;

pub fn system_prompt(base: &str) -> String {
    format!("{}\n{}", base.trim_end(), OUTPUT_FORMAT)
}

pub fn literal_text_user(text: &str) -> String {
    format!("Extract the ingredients from this recipe:\n\n{}", text)
}

pub fn dish_lookup_user(dish: &str) -> String {
    format!(
        "List all ingredients needed to cook the traditional dish \"{}\".",
        dish.trim()
    )
}

pub fn image_user(description: Option<&str>) -> String {
    match description {
        Some(desc) => format!(
            "Identify the ingredients in this food image. The user describes it as: \"{}\"",
            desc
        ),
        None => "Identify the ingredients in this food image.".to_string(),
    }
}

pub fn vision_analysis_user(vision: &VisionData, description: Option<&str>) -> String {
    let mut prompt = String::from("Image recognition results:\n");

    if vision.food_items.is_empty() {
        prompt.push_str("Labels and objects: (none)\n");
    } else {
        prompt.push_str(&format!(
            "Labels and objects: {}\n",
            vision.food_items.join(", ")
        ));
    }

    let text = vision.detected_text.trim();
    if !text.is_empty() {
        prompt.push_str(&format!("Detected text:\n{}\n", text));
    }

    if let Some(desc) = description {
        prompt.push_str(&format!("User description: \"{}\"\n", desc));
    }

    prompt.push_str("\nList the ingredients these results support.");
    prompt
}
