//! Request, result and grocery-list types shared across the service.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::error::ExtractError;

/// Generate ISO8601 timestamp for current time.
pub fn now_iso8601() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let days_since_epoch = secs / 86400;
    let time_of_day = secs % 86400;
    let hours = time_of_day / 3600;
    let minutes = (time_of_day % 3600) / 60;
    let seconds = time_of_day % 60;

    let mut year = 1970i32;
    let mut remaining_days = days_since_epoch as i32;
    loop {
        let days_in_year = if is_leap_year(year) { 366 } else { 365 };
        if remaining_days < days_in_year {
            break;
        }
        remaining_days -= days_in_year;
        year += 1;
    }

    let days_in_months: [i32; 12] = if is_leap_year(year) {
        [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    } else {
        [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    };

    let mut month = 1;
    for days in days_in_months {
        if remaining_days < days {
            break;
        }
        remaining_days -= days;
        month += 1;
    }
    let day = remaining_days + 1;

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year, month, day, hours, minutes, seconds
    )
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// A single extracted ingredient. Both fields are non-empty once produced by a parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
        }
    }
}

/// Raw JSON body of the extraction endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractBody {
    #[serde(default)]
    pub recipe_text: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub user_description: Option<String>,
}

/// Validated extraction input: exactly one of the two shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionRequest {
    Text {
        recipe_text: String,
    },
    Image {
        image_base64: String,
        user_description: Option<String>,
    },
}

impl ExtractionRequest {
    /// Text that may name a dish: the recipe text, or the description sent with an image.
    pub fn text_content(&self) -> Option<&str> {
        match self {
            Self::Text { recipe_text } => Some(recipe_text),
            Self::Image {
                user_description, ..
            } => user_description.as_deref(),
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            Self::Image { image_base64, .. } => Some(image_base64),
            Self::Text { .. } => None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl TryFrom<ExtractBody> for ExtractionRequest {
    type Error = ExtractError;

    fn try_from(body: ExtractBody) -> Result<Self, Self::Error> {
        let description = non_blank(body.user_description);
        if let Some(image_base64) = non_blank(body.image_base64) {
            return Ok(Self::Image {
                image_base64,
                user_description: description,
            });
        }
        match non_blank(body.recipe_text) {
            Some(recipe_text) => Ok(Self::Text { recipe_text }),
            None => Err(ExtractError::BadRequest(
                "Either an image or recipe text is required".to_string(),
            )),
        }
    }
}

/// Successful extraction, tagged with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub ingredients: Vec<Ingredient>,
    pub analysis_method: String,
}

/// A label as reported by the vision provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionLabel {
    pub description: String,
    #[serde(default)]
    pub score: f64,
}

/// A localized object as reported by the vision provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionObject {
    pub name: String,
    #[serde(default)]
    pub score: f64,
}

/// Normalised output of the image-labelling provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisionData {
    /// Label descriptions followed by object names, de-duplicated case-insensitively.
    pub food_items: Vec<String>,
    pub detected_text: String,
    pub raw_labels: Vec<VisionLabel>,
    pub raw_objects: Vec<VisionObject>,
}

impl VisionData {
    pub fn is_empty(&self) -> bool {
        self.food_items.is_empty() && self.detected_text.trim().is_empty()
    }
}

/// One entry on a user's grocery list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    pub id: Uuid,
    pub name: String,
    pub quantity: String,
    pub completed: bool,
    pub frequent: bool,
    pub added_at: String,
}
