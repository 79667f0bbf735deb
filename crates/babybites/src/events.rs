//! Stages, events, and handlers for a [`Kitchen`](crate::kitchen::Kitchen) run.
//!
//! A run moves through [`Stage`]s in a fixed order with no branching except
//! the two terminal failure stages:
//!
//! ```text
//! Idle → Validating → ComposingPrompt → AwaitingTextGeneration → ParsingResponse
//!      → AwaitingImageGeneration → Rendering → Idle
//!
//! Validating ──(invalid order)──▶ UserWarned
//! any await  ──(upstream error)─▶ ErrorDisplayed
//! ```
//!
//! The kitchen reports every stage it enters, plus a few notable facts, as
//! [`KitchenEvent`]s. Frontends report `Rendering` and the return to `Idle`
//! themselves, since rendering is theirs.
//!
//! # Choosing an event handler
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or fire-and-forget runs |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`EventObserver`] | Quick closures, e.g. recording stages in a test |
//! | [`CompositeEventHandler`] | Compose multiple handlers in order |

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::UsageInfo;
use crate::error::{KitchenError, ValidationError};

// ── Stages ─────────────────────────────────────────────────────────

/// Where a recipe run currently is.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Validating,
    ComposingPrompt,
    AwaitingTextGeneration,
    ParsingResponse,
    AwaitingImageGeneration,
    Rendering,
    /// Terminal: the order was invalid and the user was warned.
    UserWarned,
    /// Terminal: an upstream call failed or the run was cancelled.
    ErrorDisplayed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Validating => "validating",
            Stage::ComposingPrompt => "composing prompt",
            Stage::AwaitingTextGeneration => "awaiting text generation",
            Stage::ParsingResponse => "parsing response",
            Stage::AwaitingImageGeneration => "awaiting image generation",
            Stage::Rendering => "rendering",
            Stage::UserWarned => "user warned",
            Stage::ErrorDisplayed => "error displayed",
        };
        f.write_str(name)
    }
}

// ── Events ─────────────────────────────────────────────────────────

/// Events emitted during a run.
#[derive(Debug)]
pub enum KitchenEvent<'a> {
    /// The run entered a new stage.
    StageEntered(Stage),
    /// Validation rejected the order. No upstream call will be made.
    Rejected(&'a ValidationError),
    /// Token usage reported by the text call.
    TokenUsage(&'a UsageInfo),
    /// The text call returned; `chars` is the reply length.
    TextReceived { chars: usize },
    /// The reply had no recoverable dish name; the photo prompt will be generic.
    DishNameMissing,
    /// The reply had no sentinel; the shopping tip is a placeholder.
    SuggestionMissing,
    /// The run failed after validation.
    Failed(&'a KitchenError),
    /// The run produced a recipe and a photo.
    Finished { dish_name: &'a str },
}

/// Handler for kitchen events.
///
/// Handlers observe only; they cannot alter the run.
///
/// # Example
///
/// ```ignore
/// struct PrintStages;
///
/// impl EventHandler for PrintStages {
///     fn on_event(&self, event: &KitchenEvent<'_>) {
///         if let KitchenEvent::StageEntered(stage) = event {
///             eprintln!("[{stage}]");
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Called for each event during the run.
    fn on_event(&self, event: &KitchenEvent<'_>) {
        let _ = event;
    }
}

/// A handler that ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// Wrapper that adapts a closure into an [`EventHandler`].
///
/// ```ignore
/// let stages = Arc::new(Mutex::new(Vec::new()));
/// let s = stages.clone();
/// let handler = EventObserver::new(move |event| {
///     if let KitchenEvent::StageEntered(stage) = event {
///         s.lock().unwrap().push(*stage);
///     }
/// });
/// ```
pub struct EventObserver<F>(F)
where
    F: Fn(&KitchenEvent<'_>) + Send + Sync;

impl<F> EventObserver<F>
where
    F: Fn(&KitchenEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for EventObserver<F>
where
    F: Fn(&KitchenEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &KitchenEvent<'_>) {
        (self.0)(event);
    }
}

/// An event handler that delegates to multiple inner handlers, in
/// registration order.
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Add a handler to the chain.
    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Conditionally add a handler to the chain.
    pub fn with_if(self, condition: bool, handler: impl EventHandler + 'static) -> Self {
        if condition { self.with(handler) } else { self }
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &KitchenEvent<'_>) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}

/// An event handler that logs events via `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &KitchenEvent<'_>) {
        match event {
            KitchenEvent::StageEntered(stage) => {
                debug!("Stage: {stage}");
            }
            KitchenEvent::Rejected(err) => {
                info!("Order rejected: {err}");
            }
            KitchenEvent::TokenUsage(usage) => {
                debug!(
                    "Tokens: prompt={}, completion={}",
                    usage.prompt_tokens.unwrap_or(0),
                    usage.completion_tokens.unwrap_or(0),
                );
            }
            KitchenEvent::TextReceived { chars } => {
                debug!("Recipe text received: {chars} chars");
            }
            KitchenEvent::DishNameMissing => {
                warn!("Model reply had no dish name on its first line");
            }
            KitchenEvent::SuggestionMissing => {
                warn!("Model reply had no shopping suggestion separator");
            }
            KitchenEvent::Failed(err) => {
                warn!(kind = err.kind(), "Recipe run failed: {err}");
            }
            KitchenEvent::Finished { dish_name } => {
                info!("Recipe ready: {dish_name}");
            }
        }
    }
}
