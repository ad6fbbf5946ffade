//! Extraction orchestrator: decides which providers to try, in which order.
//!
//! The policy is an ordered plan of [`Strategy`] values computed from the request
//! shape and the configured providers. Strategies run one after another; the first
//! that yields ingredients wins. Every provider failure is recorded in an
//! [`ApiErrorLog`] and only total exhaustion becomes an error for the caller.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{ExtractError, ProviderError};
use crate::heuristics::{extract_from_vision, is_generic_list, is_likely_dish};
use crate::llm::{parse_ingredients, ChatCompletionClient, IngredientTask, LanguageModel, LlmProviderKind};
use crate::schema::{ExtractionRequest, ExtractionResult, Ingredient, VisionData};
use crate::vision::{GoogleVisionProvider, VisionProvider};

const VISION_DIRECT_TAG: &str = "google-vision-direct";

/// Which providers have credentials. Fixed for the life of the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderAvailability {
    pub vision: bool,
    pub llm_a: bool,
    pub llm_b: bool,
}

impl ProviderAvailability {
    pub fn any(&self) -> bool {
        self.vision || self.any_llm()
    }

    pub fn any_llm(&self) -> bool {
        self.llm_a || self.llm_b
    }
}

/// One step of the fallback plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    DishLookup,
    VisionThenLlm,
    DirectLlmImage,
    HeuristicFromVision,
    LiteralText,
}

/// Build the ordered plan for a request.
pub fn plan(request: &ExtractionRequest, availability: &ProviderAvailability) -> Vec<Strategy> {
    let mut steps = Vec::new();

    if availability.any_llm() && request.text_content().is_some_and(is_likely_dish) {
        steps.push(Strategy::DishLookup);
    }

    if request.image().is_some() {
        if availability.vision {
            steps.push(Strategy::VisionThenLlm);
        }
        if availability.any_llm() {
            steps.push(Strategy::DirectLlmImage);
        }
        if availability.vision {
            steps.push(Strategy::HeuristicFromVision);
        }
    } else if availability.any_llm() {
        steps.push(Strategy::LiteralText);
    }

    steps
}

/// Failures collected during one request, in the order they happened.
#[derive(Debug, Default)]
pub struct ApiErrorLog {
    entries: Vec<(String, ProviderError)>,
}

impl ApiErrorLog {
    pub fn push(&mut self, label: impl Into<String>, error: ProviderError) {
        let label = label.into();
        warn!("{} failed: {}", label, error);
        self.entries.push((label, error));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn any_quota(&self) -> bool {
        self.entries.iter().any(|(_, e)| e.is_quota())
    }

    pub fn summary(&self) -> String {
        self.entries
            .iter()
            .map(|(label, e)| format!("{}: {}", label, e))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// The error returned when every strategy came up empty.
    pub fn into_terminal_error(self) -> ExtractError {
        if self.is_empty() {
            return ExtractError::NoIngredientsFound(
                "No ingredients could be extracted from the provided input".to_string(),
            );
        }
        let message = format!("Failed to extract ingredients. {}", self.summary());
        if self.any_quota() {
            ExtractError::AllProvidersQuotaExceeded(message)
        } else {
            ExtractError::NoIngredientsFound(message)
        }
    }
}

/// The external providers the orchestrator may call.
#[derive(Clone, Default)]
pub struct Providers {
    pub vision: Option<Arc<dyn VisionProvider>>,
    pub llm_a: Option<Arc<dyn LanguageModel>>,
    pub llm_b: Option<Arc<dyn LanguageModel>>,
}

impl Providers {
    pub fn from_config(config: &AppConfig, client: reqwest::Client) -> Self {
        let vision = config.vision.as_ref().map(|v| {
            Arc::new(GoogleVisionProvider::new(client.clone(), &v.api_key, &v.url))
                as Arc<dyn VisionProvider>
        });

        let llm = |kind: LlmProviderKind| {
            config.llms.iter().find(|l| l.kind == kind).map(|l| {
                Arc::new(
                    ChatCompletionClient::new(client.clone(), kind, &l.api_key)
                        .with_model(&l.model)
                        .with_url(&l.url),
                ) as Arc<dyn LanguageModel>
            })
        };

        Self {
            vision,
            llm_a: llm(LlmProviderKind::Deepseek),
            llm_b: llm(LlmProviderKind::OpenAi),
        }
    }
}

/// Per-request scratch state shared between strategies.
#[derive(Default)]
struct RunState {
    errors: ApiErrorLog,
    vision: Option<VisionData>,
}

pub struct Extractor {
    providers: Providers,
}

impl Extractor {
    pub fn new(providers: Providers) -> Self {
        Self { providers }
    }

    pub fn availability(&self) -> ProviderAvailability {
        ProviderAvailability {
            vision: self.providers.vision.is_some(),
            llm_a: self.providers.llm_a.is_some(),
            llm_b: self.providers.llm_b.is_some(),
        }
    }

    /// Configured language models, provider A first.
    fn models(&self) -> impl Iterator<Item = &dyn LanguageModel> {
        self.providers
            .llm_a
            .iter()
            .chain(self.providers.llm_b.iter())
            .map(|m| m.as_ref())
    }

    /// Run the fallback plan for one request.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult, ExtractError> {
        let availability = self.availability();
        if !availability.any() {
            return Err(ExtractError::Configuration(
                "No AI providers are configured. Set GOOGLE_VISION_API_KEY, DEEPSEEK_API_KEY or OPENAI_API_KEY."
                    .to_string(),
            ));
        }

        let steps = plan(request, &availability);
        info!("Extraction plan: {:?} (availability: {:?})", steps, availability);

        let mut run = RunState::default();
        for step in steps {
            if let Some(result) = self.attempt(step, request, &mut run).await {
                info!(
                    "Extraction succeeded via {} with {} ingredients",
                    result.analysis_method,
                    result.ingredients.len()
                );
                return Ok(result);
            }
        }

        Err(run.errors.into_terminal_error())
    }

    async fn attempt(
        &self,
        step: Strategy,
        request: &ExtractionRequest,
        run: &mut RunState,
    ) -> Option<ExtractionResult> {
        debug!("Attempting strategy {:?}", step);
        match step {
            Strategy::DishLookup => {
                let dish = request.text_content()?;
                self.dish_lookup(dish, &mut run.errors).await
            }
            Strategy::LiteralText => {
                let text = request.text_content()?;
                self.first_success(&IngredientTask::LiteralText { text }, &mut run.errors)
                    .await
            }
            Strategy::VisionThenLlm => {
                let image = request.image()?;
                self.vision_then_llm(image, request.text_content(), run).await
            }
            Strategy::DirectLlmImage => {
                let task = IngredientTask::ImageDescription {
                    image_base64: request.image()?,
                    description: request.text_content(),
                };
                self.first_success(&task, &mut run.errors).await
            }
            Strategy::HeuristicFromVision => {
                let vision = run.vision.as_ref()?;
                let ingredients = extract_from_vision(vision);
                if ingredients.is_empty() {
                    run.errors.push(
                        VISION_DIRECT_TAG,
                        ProviderError::malformed(
                            "google-vision",
                            "No recognizable ingredients in vision labels or text",
                        ),
                    );
                    return None;
                }
                Some(result(ingredients, VISION_DIRECT_TAG.to_string()))
            }
        }
    }

    /// Try each capable model in preference order; first success wins.
    async fn first_success(
        &self,
        task: &IngredientTask<'_>,
        errors: &mut ApiErrorLog,
    ) -> Option<ExtractionResult> {
        for model in self.models() {
            if task.needs_image() && !model.supports_images() {
                debug!("Skipping {} for {} task: no image support", model.label(), task.mode());
                continue;
            }
            let tag = format!("{}-{}", model.label(), task.mode());
            match parse_ingredients(model, task).await {
                Ok(ingredients) => return Some(result(ingredients, tag)),
                Err(e) => errors.push(tag, e),
            }
        }
        None
    }

    async fn dish_lookup(&self, dish: &str, errors: &mut ApiErrorLog) -> Option<ExtractionResult> {
        info!("Treating \"{}\" as a dish name", dish);
        self.first_success(&IngredientTask::DishLookup { dish }, errors)
            .await
    }

    async fn vision_then_llm(
        &self,
        image: &str,
        description: Option<&str>,
        run: &mut RunState,
    ) -> Option<ExtractionResult> {
        let vision = self.providers.vision.as_ref()?;
        let data = match vision.analyze(image).await {
            Ok(data) => data,
            Err(e) => {
                run.errors.push(vision.name(), e);
                return None;
            }
        };
        let data: &VisionData = run.vision.insert(data);

        for model in self.models() {
            let task = IngredientTask::VisionAnalysis {
                vision: data,
                description,
            };
            let tag = format!("google-vision-{}", model.label());
            match parse_ingredients(model, &task).await {
                Ok(ingredients) => {
                    if is_generic_list(&ingredients) {
                        if let Some(dish) = description.filter(|d| is_likely_dish(d)) {
                            info!("Vision result looks generic, retrying as dish lookup");
                            if let Some(better) = self.dish_lookup(dish, &mut run.errors).await {
                                return Some(better);
                            }
                        }
                    }
                    return Some(result(ingredients, tag));
                }
                Err(e) => run.errors.push(tag, e),
            }
        }
        None
    }
}

fn result(ingredients: Vec<Ingredient>, analysis_method: String) -> ExtractionResult {
    ExtractionResult {
        ingredients,
        analysis_method,
    }
}
