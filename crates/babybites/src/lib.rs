//! Baby-food recipe generator backed by hosted text and image models.
//!
//! `babybites` turns what is left in the fridge into a recipe for a baby of a
//! given age. One submission makes exactly two calls to the
//! [OpenAI](https://platform.openai.com/) API, in order:
//!
//! 1. a chat completion that writes the recipe and a shopping suggestion,
//!    separated by the literal [`recipe::SENTINEL`] line, and
//! 2. an image generation for the dish named on the recipe's first line.
//!
//! The [`Kitchen`](kitchen::Kitchen) sequences those calls and returns a typed
//! result. Everything in between is plain string work: the
//! [composer](recipe::compose) builds the prompts, the [parser](recipe::parse)
//! splits the model output, and the [image prompt builder](recipe::image)
//! templates the photo request.
//!
//! # Getting started
//!
//! ```ignore
//! use std::sync::Arc;
//! use babybites::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAiClient::new(&ClientConfig::from_env()?)?;
//!     let kitchen = Kitchen::new(Arc::new(client), KitchenConfig::default());
//!
//!     let order = RecipeOrder {
//!         baby_age_months: 15,
//!         food_style: FoodStyle::RiceBowl,
//!         allergy: String::new(),
//!         ingredients: vec!["beef tenderloin".into(), "broccoli".into()],
//!     };
//!
//!     let cooked = kitchen.cook(order, &LoggingHandler).await?;
//!     println!("{}\n\n{}", cooked.recipe.dish_name, cooked.recipe.recipe_body);
//!     println!("{}", cooked.image.url);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`recipe`] | Food styles, ingredient catalog, validation, composer, parser, image prompt |
//! | [`kitchen`] | [`Kitchen`](kitchen::Kitchen) orchestration with cancellation |
//! | [`events`] | [`Stage`](events::Stage) progression and [`EventHandler`](events::EventHandler) observers |
//! | [`config`] | [`KitchenConfig`](config::KitchenConfig) and [`ClientConfig`](config::ClientConfig) |
//! | [`error`] | Typed errors for validation, upstream calls and configuration |
//! | [`api`] | Trace ids and cost estimation |
//! | [`prompt`] | [`SystemPromptBuilder`](prompt::SystemPromptBuilder) |

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod kitchen;
pub mod logging;
pub mod prelude;
pub mod prompt;
pub mod recipe;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;
use tracing::{debug, trace};

use crate::config::ClientConfig;
pub use crate::error::ApiError;

// ── Constants ──────────────────────────────────────────────────────

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for recipe text.
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";

/// Default model for the dish photo.
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Sampling temperature for recipe text.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Image size requested from the image model.
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body.
#[derive(Serialize, Debug, Default, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
}

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
        }
    }
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Image generation request body. `n` is always 1: one photo per dish.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
    pub n: u8,
}

impl ImageRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            size: size.into(),
            n: 1,
        }
    }
}

// ── Response types ─────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawImageResponse {
    data: Option<Vec<RawImageData>>,
    error: Option<ApiErrorResponse>,
}

#[derive(Deserialize, Debug)]
struct RawImageData {
    url: Option<String>,
    revised_prompt: Option<String>,
}

/// Error envelope: `{"error": {"message": "..."}}`.
#[derive(Deserialize, Debug)]
struct ApiErrorEnvelope {
    error: ApiErrorResponse,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Clean return type from [`Backend::chat`].
#[derive(Debug, Clone, Default)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub usage: Option<UsageInfo>,
    pub finish_reason: Option<String>,
}

impl ChatCompletion {
    /// The completion text, or [`ApiError::EmptyCompletion`] when the model
    /// returned nothing.
    pub fn into_text(self) -> Result<String, ApiError> {
        self.content.ok_or(ApiError::EmptyCompletion)
    }
}

/// Token usage statistics.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// A generated image, referenced by URL. The image itself is never downloaded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

// ── Backend seam ───────────────────────────────────────────────────

/// Boxed future returned by [`Backend`] methods.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// The two upstream calls the [`Kitchen`](kitchen::Kitchen) makes.
///
/// [`OpenAiClient`] is the production implementation. Tests substitute a
/// double to count calls or inject failures.
pub trait Backend: Send + Sync {
    /// Send a chat completion request.
    fn chat<'a>(&'a self, body: &'a ChatRequest) -> BackendFuture<'a, ChatCompletion>;

    /// Generate one image.
    fn generate_image<'a>(&'a self, body: &'a ImageRequest) -> BackendFuture<'a, GeneratedImage>;
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the OpenAI chat completions and images APIs.
///
/// Built once at startup and shared by handle; it holds no per-request state.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Create a client from a [`ClientConfig`].
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("babybites/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send a chat completion request.
    pub async fn chat(&self, body: &ChatRequest) -> Result<ChatCompletion, ApiError> {
        debug!(
            "LLM request: model={}, messages={}, temp={}",
            body.model,
            body.messages.len(),
            body.temperature,
        );

        let text = self.post_json("/chat/completions", body).await?;
        let parsed: RawChatResponse = serde_json::from_str(&text)?;

        if let Some(err) = parsed.error {
            return Err(ApiError::Api(err.message));
        }

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
                usage.total_tokens.unwrap_or(0),
            );
        }

        let Some(choice) = parsed.choices.and_then(|c| c.into_iter().next()) else {
            debug!("LLM output: empty (no choices)");
            return Ok(ChatCompletion {
                content: None,
                usage: parsed.usage,
                finish_reason: None,
            });
        };

        if choice.message.content.is_none()
            && let Some(refusal) = choice.message.refusal
        {
            return Err(ApiError::Refusal(refusal));
        }

        debug!(
            "LLM output: {} chars, finish_reason={}",
            choice.message.content.as_ref().map_or(0, |s| s.len()),
            choice.finish_reason.as_deref().unwrap_or("(none)"),
        );

        Ok(ChatCompletion {
            content: choice.message.content,
            usage: parsed.usage,
            finish_reason: choice.finish_reason,
        })
    }

    /// Generate one image and return its URL.
    pub async fn generate_image(&self, body: &ImageRequest) -> Result<GeneratedImage, ApiError> {
        debug!(
            "Image request: model={}, size={}, prompt={} chars",
            body.model,
            body.size,
            body.prompt.len(),
        );

        let text = self.post_json("/images/generations", body).await?;
        let parsed: RawImageResponse = serde_json::from_str(&text)?;

        if let Some(err) = parsed.error {
            return Err(ApiError::Api(err.message));
        }

        parsed
            .data
            .and_then(|d| d.into_iter().next())
            .and_then(|d| {
                d.url.map(|url| GeneratedImage {
                    url,
                    revised_prompt: d.revised_prompt,
                })
            })
            .ok_or(ApiError::NoImage)
    }

    /// POST a JSON body and return the response text of a 2xx reply.
    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<String, ApiError> {
        let url = format!("{}{path}", self.base_url);
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        debug!(
            "{path}: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(ApiError::Status { status, message });
        }

        Ok(text)
    }
}

impl Backend for OpenAiClient {
    fn chat<'a>(&'a self, body: &'a ChatRequest) -> BackendFuture<'a, ChatCompletion> {
        Box::pin(OpenAiClient::chat(self, body))
    }

    fn generate_image<'a>(&'a self, body: &'a ImageRequest) -> BackendFuture<'a, GeneratedImage> {
        Box::pin(OpenAiClient::generate_image(self, body))
    }
}
