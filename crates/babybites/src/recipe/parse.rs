//! Splits the text model's reply into dish name, recipe body and shopping tip.
//!
//! The reply is expected to look like:
//!
//! ```text
//! [Dish name]
//! recipe body ...
//! ---COUPANG_SUGGESTION---
//! shopping suggestion ...
//! ```
//!
//! Nothing enforces that shape upstream, so [`parse`] is total: a missing
//! sentinel yields [`SUGGESTION_UNAVAILABLE`], a missing or bracket-less first
//! line yields whatever text is there, and empty input yields empty fields.

use serde::Serialize;

/// Separator line between the recipe and the shopping suggestion.
pub const SENTINEL: &str = "---COUPANG_SUGGESTION---";

/// Shopping tip used when the reply has no sentinel.
pub const SUGGESTION_UNAVAILABLE: &str = "Suggestion unavailable.";

/// Structured view of one model reply. Immutable once built.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecipe {
    /// First recipe line without brackets. Empty when the reply had none.
    pub dish_name: String,
    pub recipe_body: String,
    pub shopping_tip: String,
}

impl ParsedRecipe {
    /// Whether a dish name was recovered. Callers warn the user when not.
    pub fn has_dish_name(&self) -> bool {
        !self.dish_name.is_empty()
    }
}

/// Parse a raw model reply. Never fails.
///
/// ```
/// use babybites::recipe::parse;
///
/// let recipe = parse("[Beef Risotto]\nStep 1\n---COUPANG_SUGGESTION---\nBuy oats");
/// assert_eq!(recipe.dish_name, "Beef Risotto");
/// assert_eq!(recipe.recipe_body, "Step 1");
/// assert_eq!(recipe.shopping_tip, "Buy oats");
/// ```
pub fn parse(raw: &str) -> ParsedRecipe {
    let (recipe_part, shopping_tip) = match raw.split_once(SENTINEL) {
        Some((before, after)) => (before.trim(), after.trim().to_string()),
        None => (raw.trim(), SUGGESTION_UNAVAILABLE.to_string()),
    };

    let (first_line, rest) = recipe_part.split_once('\n').unwrap_or((recipe_part, ""));

    let dish_name = first_line.replace(['[', ']'], "").trim().to_string();
    let recipe_body = rest.trim().to_string();

    ParsedRecipe {
        dish_name,
        recipe_body,
        shopping_tip,
    }
}
