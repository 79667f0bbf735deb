//! Convenience re-exports for common `babybites` types.
//!
//! ```ignore
//! use babybites::prelude::*;
//! ```
//!
//! Pulls in the client, the [`Kitchen`], orders and their results, and the
//! event handlers. Pricing tables and prompt builders stay in their modules.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{Backend, GeneratedImage, OpenAiClient, UsageInfo};

// ── Configuration and errors ────────────────────────────────────────
pub use crate::config::{ClientConfig, KitchenConfig};
pub use crate::error::{ApiError, ConfigError, KitchenError, ValidationError};

// ── Orchestration ───────────────────────────────────────────────────
pub use crate::events::{
    CompositeEventHandler, EventHandler, EventObserver, KitchenEvent, LoggingHandler,
    NoopHandler, Stage,
};
pub use crate::kitchen::{CookedRecipe, Kitchen};

// ── Recipes ─────────────────────────────────────────────────────────
pub use crate::recipe::{FoodStyle, ImageStyle, ParsedRecipe, RecipeOrder, RecipeRequest};
