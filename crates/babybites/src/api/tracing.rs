//! Correlation ids and cost estimation for recipe runs.
//!
//! Every [`Kitchen::cook`](crate::kitchen::Kitchen::cook) run gets a `trace_id`
//! that tags its log lines and is returned with the result. The cost estimate
//! covers the text call (from reported token usage) plus one image.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use serde::Serialize;

use crate::UsageInfo;

/// Generate a unique trace ID for a recipe run.
pub fn generate_trace_id() -> String {
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    // Counter disambiguates ids minted within the same clock tick.
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("tr-{ts:x}-{count:04x}")
}

/// Per-model pricing for cost estimation (USD per 1M tokens).
#[derive(Debug, Clone)]
pub struct ModelPricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelPricing {
    /// Estimate cost for given token counts.
    pub fn estimate_cost(&self, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        (prompt_tokens as f64 / 1_000_000.0) * self.input_per_million
            + (completion_tokens as f64 / 1_000_000.0) * self.output_per_million
    }
}

impl Default for ModelPricing {
    fn default() -> Self {
        Self {
            input_per_million: 2.50,
            output_per_million: 10.0,
        }
    }
}

/// Approximate pricing for a chat model by name. Unknown models get GPT-4o
/// rates.
pub fn pricing_for_model(model: &str) -> ModelPricing {
    let name = model.rsplit('/').next().unwrap_or(model).to_lowercase();

    if name.contains("4o-mini") || name.contains("4.1-mini") {
        ModelPricing {
            input_per_million: 0.15,
            output_per_million: 0.60,
        }
    } else if name.contains("4.1-nano") {
        ModelPricing {
            input_per_million: 0.10,
            output_per_million: 0.40,
        }
    } else if name.starts_with("o1") || name.starts_with("o3") {
        ModelPricing {
            input_per_million: 15.0,
            output_per_million: 60.0,
        }
    } else {
        ModelPricing::default()
    }
}

/// Approximate price of one generated image.
pub fn image_price_usd(model: &str, size: &str) -> f64 {
    let name = model.to_lowercase();
    if name.contains("dall-e-2") {
        match size {
            "256x256" => 0.016,
            "512x512" => 0.018,
            _ => 0.020,
        }
    } else if size == "1024x1024" {
        0.040
    } else {
        0.080
    }
}

/// Estimated spend for one recipe run.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct CostEstimate {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub text_usd: f64,
    pub image_usd: f64,
}

impl CostEstimate {
    /// Estimate from the text call's usage (if reported) and one image.
    pub fn for_run(
        text_model: &str,
        usage: Option<&UsageInfo>,
        image_model: &str,
        image_size: &str,
    ) -> Self {
        let prompt_tokens = usage.and_then(|u| u.prompt_tokens).unwrap_or(0);
        let completion_tokens = usage.and_then(|u| u.completion_tokens).unwrap_or(0);
        Self {
            prompt_tokens,
            completion_tokens,
            text_usd: pricing_for_model(text_model).estimate_cost(prompt_tokens, completion_tokens),
            image_usd: image_price_usd(image_model, image_size),
        }
    }

    pub fn total_usd(&self) -> f64 {
        self.text_usd + self.image_usd
    }

    /// Format as a short summary string.
    pub fn summary(&self) -> String {
        format!(
            "tokens: {} prompt + {} completion, est. cost: ${:.4}",
            self.prompt_tokens,
            self.completion_tokens,
            self.total_usd(),
        )
    }
}
