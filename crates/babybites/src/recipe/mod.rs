//! Recipe domain: food styles, orders, validation, and the three string stages.
//!
//! An unvalidated [`RecipeOrder`] comes in from a form, the JSON API or the
//! CLI. [`RecipeOrder::validate`] turns it into a [`RecipeRequest`], which is
//! the only input the [`compose`] stage accepts, so an empty ingredient list
//! can never reach the model.
//!
//! - [`compose`]: system and user prompts for the text model.
//! - [`parse`]: splits the model's text into dish name, body and shopping tip.
//! - [`image`]: photo prompt for the image model.
//! - [`catalog`]: the ingredient choices offered by the form.

pub mod catalog;
pub mod compose;
pub mod image;
pub mod parse;

pub use compose::{ComposedPrompt, compose};
pub use image::{ImageStyle, build_image_prompt, build_image_prompt_styled};
pub use parse::{ParsedRecipe, SENTINEL, SUGGESTION_UNAVAILABLE, parse};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Youngest supported age, in months.
pub const MIN_AGE_MONTHS: u32 = 4;

/// Oldest supported age, in months.
pub const MAX_AGE_MONTHS: u32 = 36;

/// Age preselected in the form.
pub const DEFAULT_AGE_MONTHS: u32 = 15;

// ── Food style ─────────────────────────────────────────────────────

/// The dish shape the parent asked for. Closed set.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FoodStyle {
    /// Risotto or rice bowl.
    #[default]
    RiceBowl,
    /// Finger food or grilled pieces.
    FingerFood,
    /// Side dish or stir-fry.
    SideDish,
    /// Soup or stew.
    Soup,
    /// Snack or bread.
    SnackBread,
}

impl FoodStyle {
    pub const ALL: [FoodStyle; 5] = [
        FoodStyle::RiceBowl,
        FoodStyle::FingerFood,
        FoodStyle::SideDish,
        FoodStyle::Soup,
        FoodStyle::SnackBread,
    ];

    /// Wire and form value.
    pub fn slug(self) -> &'static str {
        match self {
            FoodStyle::RiceBowl => "rice-bowl",
            FoodStyle::FingerFood => "finger-food",
            FoodStyle::SideDish => "side-dish",
            FoodStyle::Soup => "soup",
            FoodStyle::SnackBread => "snack-bread",
        }
    }

    /// Human label, used in prompts and the UI.
    pub fn label(self) -> &'static str {
        match self {
            FoodStyle::RiceBowl => "Risotto / rice bowl",
            FoodStyle::FingerFood => "Finger food / grilled",
            FoodStyle::SideDish => "Side dish / stir-fry",
            FoodStyle::Soup => "Soup / stew",
            FoodStyle::SnackBread => "Snack / bread",
        }
    }
}

impl fmt::Display for FoodStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FoodStyle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FoodStyle::ALL
            .into_iter()
            .find(|style| style.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownFoodStyle(wanted.to_string()))
    }
}

// ── Orders and requests ────────────────────────────────────────────

/// What the user submitted, before validation.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct RecipeOrder {
    pub baby_age_months: u32,
    pub food_style: FoodStyle,
    /// Free-text allergies or ingredients to exclude. Blank means none.
    #[serde(default)]
    pub allergy: String,
    /// Ingredients in selection order. Blank entries are dropped.
    #[serde(default)]
    pub ingredients: Vec<String>,
}

impl RecipeOrder {
    /// Check the order and normalize it into a [`RecipeRequest`].
    pub fn validate(&self) -> Result<RecipeRequest, ValidationError> {
        let ingredients: Vec<String> = self
            .ingredients
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .map(str::to_string)
            .collect();
        if ingredients.is_empty() {
            return Err(ValidationError::NoIngredients);
        }

        if !(MIN_AGE_MONTHS..=MAX_AGE_MONTHS).contains(&self.baby_age_months) {
            return Err(ValidationError::AgeOutOfRange(self.baby_age_months));
        }

        let allergy = self.allergy.trim();
        Ok(RecipeRequest {
            baby_age_months: self.baby_age_months,
            food_style: self.food_style,
            allergy_exclusions: (!allergy.is_empty()).then(|| allergy.to_string()),
            ingredients,
        })
    }
}

/// A validated order. Only [`RecipeOrder::validate`] creates one.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct RecipeRequest {
    baby_age_months: u32,
    food_style: FoodStyle,
    allergy_exclusions: Option<String>,
    ingredients: Vec<String>,
}

impl RecipeRequest {
    /// Age in months, within `[4, 36]`.
    pub fn baby_age_months(&self) -> u32 {
        self.baby_age_months
    }

    pub fn food_style(&self) -> FoodStyle {
        self.food_style
    }

    /// Trimmed allergy text, `None` when the user left it blank.
    pub fn allergy_exclusions(&self) -> Option<&str> {
        self.allergy_exclusions.as_deref()
    }

    /// Trimmed, non-empty ingredients. Never empty.
    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    /// Ingredients joined with `", "`, as sent to the model.
    pub fn ingredient_list(&self) -> String {
        self.ingredients.join(", ")
    }
}

/// Split a free-text ingredient field on commas and newlines.
///
/// ```
/// use babybites::recipe::split_ingredients;
///
/// assert_eq!(
///     split_ingredients(" abalone, asparagus\neggplant ,, "),
///     vec!["abalone", "asparagus", "eggplant"],
/// );
/// ```
pub fn split_ingredients(text: &str) -> Vec<String> {
    text.split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
