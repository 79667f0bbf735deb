//! Error types, one enum per layer.
//!
//! | Error | Raised by | Recovery |
//! |-------|-----------|----------|
//! | [`ValidationError`] | [`RecipeOrder::validate`](crate::recipe::RecipeOrder::validate) | Warn the user locally, no upstream call |
//! | [`ApiError`] | [`OpenAiClient`](crate::OpenAiClient) | None; shown once with its cause |
//! | [`KitchenError`] | [`Kitchen`](crate::kitchen::Kitchen) | Rendered per kind by the frontend |
//! | [`ConfigError`] | Startup | Fatal |
//!
//! A response that does not follow the sentinel format is not an error; the
//! parser degrades to placeholder values instead.

use thiserror::Error;

/// The submitted order cannot be cooked as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("select or type at least one ingredient")]
    NoIngredients,
    #[error("enter the baby's age in months")]
    MissingAge,
    #[error("baby age must be between 4 and 36 months (got {0})")]
    AgeOutOfRange(u32),
    #[error("unknown food style: {0}")]
    UnknownFoodStyle(String),
}

/// A call to the hosted model API failed.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request could not be sent or the response body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The API returned a non-2xx status.
    #[error("API returned HTTP {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
    /// The API returned a 2xx response carrying an error object.
    #[error("API error: {0}")]
    Api(String),
    /// The response body was not the JSON we expected.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The model refused to answer.
    #[error("model refused: {0}")]
    Refusal(String),
    /// The completion had no choices or no text.
    #[error("the model returned an empty completion")]
    EmptyCompletion,
    /// The image response had no URL.
    #[error("the image API returned no image")]
    NoImage,
}

/// Why a [`Kitchen::cook`](crate::kitchen::Kitchen::cook) run did not produce a recipe.
#[derive(Error, Debug)]
pub enum KitchenError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upstream(#[from] ApiError),
    /// The caller's cancellation future resolved before the run finished.
    #[error("the request was cancelled before it finished")]
    Cancelled,
}

impl KitchenError {
    /// Short machine-readable kind, used in JSON error bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            KitchenError::Validation(_) => "validation",
            KitchenError::Upstream(_) => "upstream",
            KitchenError::Cancelled => "cancelled",
        }
    }

    /// Whether the user can fix this by changing the form.
    pub fn is_user_error(&self) -> bool {
        matches!(self, KitchenError::Validation(_))
    }
}

/// Startup configuration problem.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set; add it to the environment or a .env file")]
    MissingEnv(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
