//! Configuration for the [`Kitchen`](crate::kitchen::Kitchen) and the HTTP client.
//!
//! [`KitchenConfig`] carries the model choices and generation parameters;
//! [`ClientConfig`] carries the credential and transport settings. Both have
//! production defaults and builder methods for the common overrides:
//!
//! ```
//! use babybites::config::KitchenConfig;
//! use babybites::recipe::image::ImageStyle;
//!
//! let config = KitchenConfig::default()
//!     .with_text_model("gpt-4o")
//!     .with_image_style(ImageStyle::Studio);
//! assert_eq!(config.image_model, "dall-e-3");
//! ```

use std::time::Duration;

use crate::error::ConfigError;
use crate::recipe::image::ImageStyle;
use crate::{
    DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_SIZE, DEFAULT_TEMPERATURE, DEFAULT_TEXT_MODEL,
    OPENAI_BASE_URL,
};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Optional environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Default HTTP timeout for a single upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Model and generation settings for one recipe run.
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Chat model for the recipe text. Default: `"gpt-4o-mini"`.
    pub text_model: String,
    /// Image model for the dish photo. Default: `"dall-e-3"`.
    pub image_model: String,
    /// Sampling temperature for the recipe text. Default: `0.7`.
    pub temperature: f32,
    /// Requested image size. Default: `"1024x1024"`.
    pub image_size: String,
    /// Photo aesthetic. Default: [`ImageStyle::Documentary`].
    pub image_style: ImageStyle,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
            image_style: ImageStyle::default(),
        }
    }
}

impl KitchenConfig {
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_image_style(mut self, style: ImageStyle) -> Self {
        self.image_style = style;
        self
    }
}

/// Credential and transport settings for [`OpenAiClient`](crate::OpenAiClient).
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    /// API root without a trailing slash. Default: `https://api.openai.com/v1`.
    pub base_url: String,
    /// Per-call HTTP timeout. Default: 120 s.
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the API key (required) and base URL (optional) from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingEnv(API_KEY_ENV))?;
        let mut config = Self::new(api_key);
        if let Some(base_url) = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|u| !u.trim().is_empty())
        {
            config = config.with_base_url(base_url)?;
        }
        Ok(config)
    }

    /// Point the client at another OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: BASE_URL_ENV,
                reason: format!("expected an http(s) URL, got {base_url:?}"),
            });
        }
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Per-call HTTP timeout for both upstream calls.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
