//! Request bookkeeping around the upstream calls.
//!
//! - [`tracing`]: per-run trace ids, OpenAI pricing tables, and the
//!   [`CostEstimate`] attached to every cooked recipe.

pub mod tracing;

pub use tracing::{CostEstimate, generate_trace_id, image_price_usd, pricing_for_model};
