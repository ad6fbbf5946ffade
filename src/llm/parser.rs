//! One prompt-and-parse routine for every provider and task.

use tracing::{debug, info};

use super::client::Message;
use super::prompts;
use super::reply::parse_ingredient_reply;
use super::LanguageModel;
use crate::error::ProviderError;
use crate::schema::{Ingredient, VisionData};

/// What the model is asked to do. Each variant fixes the system prompt and
/// how the user content is built.
#[derive(Debug, Clone, Copy)]
pub enum IngredientTask<'a> {
    /// Extract only what the recipe text mentions.
    LiteralText { text: &'a str },
    /// Enumerate the full ingredient set of a named traditional dish.
    DishLookup { dish: &'a str },
    /// Look at the photo directly.
    ImageDescription {
        image_base64: &'a str,
        description: Option<&'a str>,
    },
    /// Interpret labels/objects/text from the vision provider.
    VisionAnalysis {
        vision: &'a VisionData,
        description: Option<&'a str>,
    },
}

impl IngredientTask<'_> {
    /// Suffix of the analysis method tag for this task.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::LiteralText { .. } => "text",
            Self::DishLookup { .. } => "traditional-recipe",
            Self::ImageDescription { .. } => "image",
            Self::VisionAnalysis { .. } => "vision-analysis",
        }
    }

    pub fn needs_image(&self) -> bool {
        matches!(self, Self::ImageDescription { .. })
    }

    fn messages(&self) -> Vec<Message> {
        match *self {
            Self::LiteralText { text } => vec![
                Message::system(prompts::system_prompt(prompts::LITERAL_TEXT_SYSTEM)),
                Message::user(prompts::literal_text_user(text)),
            ],
            Self::DishLookup { dish } => vec![
                Message::system(prompts::system_prompt(prompts::DISH_LOOKUP_SYSTEM)),
                Message::user(prompts::dish_lookup_user(dish)),
            ],
            Self::ImageDescription {
                image_base64,
                description,
            } => vec![
                Message::system(prompts::system_prompt(prompts::IMAGE_SYSTEM)),
                Message::user_with_image(prompts::image_user(description), image_base64),
            ],
            Self::VisionAnalysis {
                vision,
                description,
            } => vec![
                Message::system(prompts::system_prompt(prompts::VISION_ANALYSIS_SYSTEM)),
                Message::user(prompts::vision_analysis_user(vision, description)),
            ],
        }
    }
}

/// Send the task to `model` and parse its reply into ingredients.
pub async fn parse_ingredients(
    model: &dyn LanguageModel,
    task: &IngredientTask<'_>,
) -> Result<Vec<Ingredient>, ProviderError> {
    let label = model.label();

    if task.needs_image() && !model.supports_images() {
        return Err(ProviderError::malformed(label, "Image input is not supported"));
    }

    if let IngredientTask::VisionAnalysis {
        vision,
        description: None,
    } = task
    {
        if vision.is_empty() {
            return Err(ProviderError::malformed(label, "No food items or text detected"));
        }
    }

    debug!("Running {} task with {}", task.mode(), label);
    let reply = model.complete(task.messages()).await?;
    debug!("Raw {} reply length: {} chars", label, reply.len());

    let ingredients = parse_ingredient_reply(label, &reply)?;
    info!(
        "{} {} task produced {} ingredients",
        label,
        task.mode(),
        ingredients.len()
    );
    Ok(ingredients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::{MessageContent, Role};
    use std::sync::Mutex;

    struct ScriptedModel {
        images: bool,
        reply: Result<String, ProviderError>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedModel {
        fn new(reply: Result<&str, ProviderError>) -> Self {
            Self {
                images: true,
                reply: reply.map(String::from),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl LanguageModel for ScriptedModel {
        fn label(&self) -> &str {
            "scripted"
        }

        fn supports_images(&self) -> bool {
            self.images
        }

        async fn complete(&self, messages: Vec<Message>) -> Result<String, ProviderError> {
            self.seen.lock().unwrap().push(messages);
            self.reply.clone()
        }
    }

    fn system_text(messages: &[Message]) -> String {
        match &messages[0].content {
            MessageContent::Text(t) => t.clone(),
            MessageContent::Parts(_) => panic!("system prompt should be text"),
        }
    }

    #[tokio::test]
    async fn test_dish_lookup_uses_dish_prompt() {
        let model = ScriptedModel::new(Ok(r#"[{"name":"melon seeds","quantity":"2 cups"}]"#));
        let list = parse_ingredients(&model, &IngredientTask::DishLookup { dish: "Egusi" })
            .await
            .unwrap();
        assert_eq!(list, vec![Ingredient::new("melon seeds", "2 cups")]);

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][0].role, Role::System);
        assert!(system_text(&seen[0]).contains("COMPLETE set of ingredients"));
    }

    #[tokio::test]
    async fn test_empty_vision_fails_before_call() {
        let model = ScriptedModel::new(Ok("[]"));
        let vision = VisionData::default();
        let err = parse_ingredients(
            &model,
            &IngredientTask::VisionAnalysis {
                vision: &vision,
                description: None,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err, ProviderError::malformed("scripted", "No food items or text detected"));
        assert!(model.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_image_task_needs_image_support() {
        let mut model = ScriptedModel::new(Ok(r#"[{"name":"tomato","quantity":"2"}]"#));
        model.images = false;
        let task = IngredientTask::ImageDescription {
            image_base64: "AAAA",
            description: None,
        };
        assert!(parse_ingredients(&model, &task).await.is_err());
        assert!(model.seen.lock().unwrap().is_empty());

        model.images = true;
        parse_ingredients(&model, &task).await.unwrap();
        assert!(model.seen.lock().unwrap()[0][1].has_image());
    }

    #[tokio::test]
    async fn test_provider_error_passes_through() {
        let quota = ProviderError::QuotaExceeded {
            provider: "scripted".into(),
            message: "quota".into(),
        };
        let model = ScriptedModel::new(Err(quota.clone()));
        let err = parse_ingredients(&model, &IngredientTask::LiteralText { text: "2 eggs" })
            .await
            .unwrap_err();
        assert_eq!(err, quota);
    }
}
