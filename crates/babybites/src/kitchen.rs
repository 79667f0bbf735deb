//! The [`Kitchen`]: one recipe run from order to photo.
//!
//! A run validates the order, composes the prompts, asks the text model for
//! a recipe, parses the reply, then asks the image model for a photo of the
//! dish. The two upstream calls are strictly sequential and never retried.
//!
//! ```text
//! RecipeOrder ──validate──▶ RecipeRequest ──compose──▶ ChatRequest
//!                                                          │
//!                                                   Backend::chat
//!                                                          │
//! CookedRecipe ◀── Backend::generate_image ◀── image prompt ◀── parse
//! ```
//!
//! [`Kitchen::cook_until`] races the whole run against a caller-supplied
//! future. When that future resolves first, the in-flight call is dropped and
//! the run ends with [`KitchenError::Cancelled`].

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::{Instrument, debug, info, info_span};

use crate::api::{CostEstimate, generate_trace_id};
use crate::config::KitchenConfig;
use crate::error::{KitchenError, ValidationError};
use crate::events::{EventHandler, KitchenEvent, Stage};
use crate::recipe::{
    ParsedRecipe, RecipeOrder, RecipeRequest, SENTINEL, build_image_prompt_styled, compose, parse,
};
use crate::{Backend, ChatRequest, GeneratedImage, ImageRequest, UsageInfo};

/// Everything a frontend needs to render one successful run.
#[derive(Serialize, Debug, Clone)]
pub struct CookedRecipe {
    pub trace_id: String,
    pub request: RecipeRequest,
    pub recipe: ParsedRecipe,
    pub image: GeneratedImage,
    /// Prompt sent to the image model.
    pub image_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageInfo>,
    pub estimated_cost: CostEstimate,
}

/// Sequences the two upstream calls for a recipe run.
///
/// Holds no per-run state, so one `Kitchen` can serve concurrent runs.
pub struct Kitchen {
    backend: Arc<dyn Backend>,
    config: KitchenConfig,
}

impl Kitchen {
    pub fn new(backend: Arc<dyn Backend>, config: KitchenConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    /// Run `order` to completion.
    pub async fn cook(
        &self,
        order: RecipeOrder,
        handler: &dyn EventHandler,
    ) -> Result<CookedRecipe, KitchenError> {
        self.cook_until(order, handler, std::future::pending()).await
    }

    /// Run `order` unless `cancelled` resolves first.
    ///
    /// A `cancelled` future that is already ready wins before any upstream
    /// call is made.
    pub async fn cook_until(
        &self,
        order: RecipeOrder,
        handler: &dyn EventHandler,
        cancelled: impl Future<Output = ()>,
    ) -> Result<CookedRecipe, KitchenError> {
        let trace_id = generate_trace_id();
        let span = info_span!(
            "cook",
            trace_id = %trace_id,
            age = order.baby_age_months,
            style = order.food_style.slug(),
        );

        async {
            let result = tokio::select! {
                biased;
                () = cancelled => Err(KitchenError::Cancelled),
                result = self.run(&trace_id, order, handler) => result,
            };

            match &result {
                Ok(cooked) => info!("{}", cooked.estimated_cost.summary()),
                Err(KitchenError::Validation(err)) => {
                    handler.on_event(&KitchenEvent::Rejected(err));
                    handler.on_event(&KitchenEvent::StageEntered(Stage::UserWarned));
                }
                Err(err) => {
                    handler.on_event(&KitchenEvent::Failed(err));
                    handler.on_event(&KitchenEvent::StageEntered(Stage::ErrorDisplayed));
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Report an order that a frontend rejected before it could be built.
    ///
    /// Emits the same events as a run that fails validation and returns the
    /// error to render.
    pub fn reject(&self, invalid: ValidationError, handler: &dyn EventHandler) -> KitchenError {
        let _span = info_span!("cook", trace_id = %generate_trace_id()).entered();
        handler.on_event(&KitchenEvent::StageEntered(Stage::Validating));
        handler.on_event(&KitchenEvent::Rejected(&invalid));
        handler.on_event(&KitchenEvent::StageEntered(Stage::UserWarned));
        KitchenError::Validation(invalid)
    }

    async fn run(
        &self,
        trace_id: &str,
        order: RecipeOrder,
        handler: &dyn EventHandler,
    ) -> Result<CookedRecipe, KitchenError> {
        let stage = |s| handler.on_event(&KitchenEvent::StageEntered(s));

        stage(Stage::Validating);
        let request = order.validate()?;

        stage(Stage::ComposingPrompt);
        let chat_request = ChatRequest {
            model: self.config.text_model.clone(),
            messages: compose(&request).into_messages(),
            temperature: self.config.temperature,
        };

        stage(Stage::AwaitingTextGeneration);
        let completion = self.backend.chat(&chat_request).await?;
        let usage = completion.usage.clone();
        if let Some(usage) = &usage {
            handler.on_event(&KitchenEvent::TokenUsage(usage));
        }
        let text = completion.into_text()?;
        handler.on_event(&KitchenEvent::TextReceived { chars: text.len() });

        stage(Stage::ParsingResponse);
        let recipe = parse(&text);
        if !recipe.has_dish_name() {
            handler.on_event(&KitchenEvent::DishNameMissing);
        }
        if !text.contains(SENTINEL) {
            handler.on_event(&KitchenEvent::SuggestionMissing);
        }
        debug!(dish = %recipe.dish_name, "Parsed recipe");

        stage(Stage::AwaitingImageGeneration);
        let image_prompt = build_image_prompt_styled(
            &recipe.dish_name,
            request.baby_age_months(),
            self.config.image_style,
        );
        let image_request = ImageRequest::new(
            self.config.image_model.clone(),
            image_prompt.clone(),
            self.config.image_size.clone(),
        );
        let image = self.backend.generate_image(&image_request).await?;

        let estimated_cost = CostEstimate::for_run(
            &self.config.text_model,
            usage.as_ref(),
            &self.config.image_model,
            &self.config.image_size,
        );

        handler.on_event(&KitchenEvent::Finished {
            dish_name: &recipe.dish_name,
        });

        Ok(CookedRecipe {
            trace_id: trace_id.to_string(),
            request,
            recipe,
            image,
            image_prompt,
            usage,
            estimated_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ValidationError};
    use crate::events::{EventObserver, NoopHandler};
    use crate::recipe::{FoodStyle, ImageStyle};
    use crate::{BackendFuture, ChatCompletion, MessageRole};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const REPLY: &str = "[Beef Broccoli Risotto]\nCook the rice.\n---COUPANG_SUGGESTION---\nBuy oats.";

    #[derive(Default)]
    struct FakeBackend {
        reply: Option<String>,
        fail_chat: bool,
        fail_image: bool,
        hang_chat: bool,
        chat_calls: AtomicUsize,
        image_calls: AtomicUsize,
        last_chat: Mutex<Option<ChatRequest>>,
        last_image: Mutex<Option<ImageRequest>>,
    }

    impl FakeBackend {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                ..Self::default()
            }
        }
    }

    impl Backend for FakeBackend {
        fn chat<'a>(&'a self, body: &'a ChatRequest) -> BackendFuture<'a, ChatCompletion> {
            Box::pin(async move {
                self.chat_calls.fetch_add(1, Ordering::SeqCst);
                *self.last_chat.lock().unwrap() = Some(body.clone());
                if self.hang_chat {
                    std::future::pending::<()>().await;
                }
                if self.fail_chat {
                    return Err(ApiError::Api("model overloaded".into()));
                }
                Ok(ChatCompletion {
                    content: self.reply.clone(),
                    usage: Some(UsageInfo {
                        prompt_tokens: Some(300),
                        completion_tokens: Some(500),
                        total_tokens: Some(800),
                    }),
                    finish_reason: Some("stop".into()),
                })
            })
        }

        fn generate_image<'a>(
            &'a self,
            body: &'a ImageRequest,
        ) -> BackendFuture<'a, GeneratedImage> {
            Box::pin(async move {
                self.image_calls.fetch_add(1, Ordering::SeqCst);
                *self.last_image.lock().unwrap() = Some(body.clone());
                if self.fail_image {
                    return Err(ApiError::NoImage);
                }
                Ok(GeneratedImage {
                    url: "https://images.example/dish.png".into(),
                    revised_prompt: None,
                })
            })
        }
    }

    fn order(ingredients: &[&str]) -> RecipeOrder {
        RecipeOrder {
            baby_age_months: 15,
            food_style: FoodStyle::RiceBowl,
            allergy: String::new(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn kitchen(backend: Arc<FakeBackend>) -> Kitchen {
        Kitchen::new(backend, KitchenConfig::default())
    }

    #[tokio::test]
    async fn happy_path_returns_parsed_recipe_and_image() {
        let backend = Arc::new(FakeBackend::replying(REPLY));
        let cooked = kitchen(backend.clone())
            .cook(order(&["beef tenderloin", "broccoli"]), &NoopHandler)
            .await
            .unwrap();

        assert_eq!(cooked.recipe.dish_name, "Beef Broccoli Risotto");
        assert_eq!(cooked.recipe.recipe_body, "Cook the rice.");
        assert_eq!(cooked.recipe.shopping_tip, "Buy oats.");
        assert_eq!(cooked.image.url, "https://images.example/dish.png");
        assert!(cooked.trace_id.starts_with("tr-"));
        assert_eq!(cooked.estimated_cost.prompt_tokens, 300);
        assert!(cooked.estimated_cost.image_usd > 0.0);
        assert_eq!(backend.chat_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.image_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn requests_have_expected_shape() {
        let backend = Arc::new(FakeBackend::replying(REPLY));
        kitchen(backend.clone())
            .cook(order(&["egg"]), &NoopHandler)
            .await
            .unwrap();

        let chat = backend.last_chat.lock().unwrap().clone().unwrap();
        assert_eq!(chat.model, "gpt-4o-mini");
        assert!((chat.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, MessageRole::System);
        assert_eq!(chat.messages[1].role, MessageRole::User);

        let image = backend.last_image.lock().unwrap().clone().unwrap();
        assert_eq!(image.model, "dall-e-3");
        assert_eq!(image.size, "1024x1024");
        assert_eq!(image.n, 1);
        assert!(image.prompt.contains("homemade Beef Broccoli Risotto"));
        assert!(image.prompt.contains("15-month-old"));
    }

    #[tokio::test]
    async fn empty_ingredients_never_call_upstream() {
        let backend = Arc::new(FakeBackend::replying(REPLY));
        let err = kitchen(backend.clone())
            .cook(order(&[" ", ""]), &NoopHandler)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            KitchenError::Validation(ValidationError::NoIngredients)
        ));
        assert_eq!(backend.chat_calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.image_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn validation_failure_ends_in_user_warned() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let s = stages.clone();
        let handler = EventObserver::new(move |event| {
            if let KitchenEvent::StageEntered(stage) = event {
                s.lock().unwrap().push(*stage);
            }
        });

        let backend = Arc::new(FakeBackend::replying(REPLY));
        let _ = kitchen(backend).cook(order(&[]), &handler).await;
        assert_eq!(
            *stages.lock().unwrap(),
            vec![Stage::Validating, Stage::UserWarned]
        );
    }

    #[test]
    fn frontend_rejection_reports_like_failed_validation() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let rejected = Arc::new(Mutex::new(None));
        let (s, r) = (stages.clone(), rejected.clone());
        let handler = EventObserver::new(move |event| match event {
            KitchenEvent::StageEntered(stage) => s.lock().unwrap().push(*stage),
            KitchenEvent::Rejected(err) => *r.lock().unwrap() = Some((*err).clone()),
            _ => {}
        });

        let backend = Arc::new(FakeBackend::replying(REPLY));
        let err = kitchen(backend.clone())
            .reject(ValidationError::UnknownFoodStyle("casserole".into()), &handler);

        assert!(err.is_user_error());
        assert_eq!(
            *stages.lock().unwrap(),
            vec![Stage::Validating, Stage::UserWarned]
        );
        assert_eq!(
            *rejected.lock().unwrap(),
            Some(ValidationError::UnknownFoodStyle("casserole".into()))
        );
        assert_eq!(backend.chat_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stages_are_emitted_in_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let s = stages.clone();
        let handler = EventObserver::new(move |event| {
            if let KitchenEvent::StageEntered(stage) = event {
                s.lock().unwrap().push(*stage);
            }
        });

        let backend = Arc::new(FakeBackend::replying(REPLY));
        kitchen(backend).cook(order(&["egg"]), &handler).await.unwrap();
        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                Stage::Validating,
                Stage::ComposingPrompt,
                Stage::AwaitingTextGeneration,
                Stage::ParsingResponse,
                Stage::AwaitingImageGeneration,
            ]
        );
    }

    #[tokio::test]
    async fn text_failure_skips_image_and_surfaces_cause() {
        let backend = Arc::new(FakeBackend {
            fail_chat: true,
            ..FakeBackend::default()
        });
        let err = kitchen(backend.clone())
            .cook(order(&["egg"]), &NoopHandler)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "upstream");
        assert!(err.to_string().contains("model overloaded"));
        assert_eq!(backend.image_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_completion_is_upstream_error() {
        let backend = Arc::new(FakeBackend::default());
        let err = kitchen(backend.clone())
            .cook(order(&["egg"]), &NoopHandler)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            KitchenError::Upstream(ApiError::EmptyCompletion)
        ));
        assert_eq!(backend.image_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn image_failure_discards_recipe() {
        let backend = Arc::new(FakeBackend {
            reply: Some(REPLY.into()),
            fail_image: true,
            ..FakeBackend::default()
        });
        let err = kitchen(backend)
            .cook(order(&["egg"]), &NoopHandler)
            .await
            .unwrap_err();
        assert!(matches!(err, KitchenError::Upstream(ApiError::NoImage)));
    }

    #[tokio::test]
    async fn missing_dish_name_still_requests_image() {
        let dish_missing = Arc::new(Mutex::new(false));
        let flag = dish_missing.clone();
        let handler = EventObserver::new(move |event| {
            if matches!(event, KitchenEvent::DishNameMissing) {
                *flag.lock().unwrap() = true;
            }
        });

        let backend = Arc::new(FakeBackend::replying("\n"));
        let cooked = kitchen(backend.clone())
            .cook(order(&["egg"]), &handler)
            .await
            .unwrap();

        assert!(!cooked.recipe.has_dish_name());
        assert!(*dish_missing.lock().unwrap());
        assert_eq!(backend.image_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ready_cancellation_makes_no_calls() {
        let backend = Arc::new(FakeBackend::replying(REPLY));
        let err = kitchen(backend.clone())
            .cook_until(order(&["egg"]), &NoopHandler, std::future::ready(()))
            .await
            .unwrap_err();

        assert!(matches!(err, KitchenError::Cancelled));
        assert_eq!(backend.chat_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancellation_drops_in_flight_call() {
        let backend = Arc::new(FakeBackend {
            hang_chat: true,
            ..FakeBackend::default()
        });
        let err = kitchen(backend.clone())
            .cook_until(
                order(&["egg"]),
                &NoopHandler,
                tokio::time::sleep(Duration::from_millis(20)),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "cancelled");
        assert_eq!(backend.chat_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.image_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn studio_style_flows_into_image_prompt() {
        let backend = Arc::new(FakeBackend::replying(REPLY));
        let kitchen = Kitchen::new(
            backend.clone(),
            KitchenConfig::default().with_image_style(ImageStyle::Studio),
        );
        kitchen.cook(order(&["egg"]), &NoopHandler).await.unwrap();

        let image = backend.last_image.lock().unwrap().clone().unwrap();
        assert!(image.prompt.contains("professional food styling"));
    }
}
