//! The HTML order form and its mapping onto a [`RecipeOrder`].

use babybites::error::ValidationError;
use babybites::recipe::{DEFAULT_AGE_MONTHS, FoodStyle, RecipeOrder, split_ingredients};
use serde::{Deserialize, Deserializer, Serialize};

/// Fields posted by the form on `/`.
///
/// The three category multi-selects post one `key=value` pair per selected
/// item, so they decode into vectors.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RecipeForm {
    /// `None` when the age box was cleared or held no number.
    #[serde(default = "default_age", deserialize_with = "blank_as_none")]
    pub baby_age: Option<u32>,
    /// Food style slug. Blank selects the default style.
    #[serde(default)]
    pub food_style: String,
    #[serde(default)]
    pub allergy: String,
    #[serde(default)]
    pub proteins: Vec<String>,
    #[serde(default)]
    pub veggies: Vec<String>,
    #[serde(default)]
    pub extras: Vec<String>,
    /// Ingredients not in the catalog, comma separated.
    #[serde(default)]
    pub other: String,
}

fn default_age() -> Option<u32> {
    Some(DEFAULT_AGE_MONTHS)
}

/// Browsers post `baby_age=` for an empty number input.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

impl Default for RecipeForm {
    fn default() -> Self {
        Self {
            baby_age: Some(DEFAULT_AGE_MONTHS),
            food_style: FoodStyle::default().slug().to_string(),
            allergy: String::new(),
            proteins: Vec::new(),
            veggies: Vec::new(),
            extras: Vec::new(),
            other: String::new(),
        }
    }
}

impl RecipeForm {
    /// Build the order: category selections in form order, then the free-text
    /// extras.
    pub fn to_order(&self) -> Result<RecipeOrder, ValidationError> {
        let baby_age_months = self.baby_age.ok_or(ValidationError::MissingAge)?;
        let food_style = if self.food_style.trim().is_empty() {
            FoodStyle::default()
        } else {
            self.food_style.parse()?
        };

        let ingredients = self
            .proteins
            .iter()
            .chain(&self.veggies)
            .chain(&self.extras)
            .cloned()
            .chain(split_ingredients(&self.other))
            .collect();

        Ok(RecipeOrder {
            baby_age_months,
            food_style,
            allergy: self.allergy.clone(),
            ingredients,
        })
    }

    /// Whether `item` was selected in any category.
    pub fn is_selected(&self, item: &str) -> bool {
        [&self.proteins, &self.veggies, &self.extras]
            .iter()
            .any(|selected| selected.iter().any(|s| s == item))
    }
}
