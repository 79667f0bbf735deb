//! Ingredient choices offered by the form, grouped by category.
//!
//! The catalog only drives the UI. Orders may contain any free-text
//! ingredient; nothing is checked against this list.

use serde::Serialize;

/// One multi-select group in the form.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientCategory {
    /// Form field name.
    pub key: &'static str,
    pub label: &'static str,
    pub items: &'static [&'static str],
}

pub const PROTEINS: IngredientCategory = IngredientCategory {
    key: "proteins",
    label: "Protein",
    items: &[
        "beef tenderloin",
        "ground beef",
        "chicken tenderloin",
        "chicken breast",
        "pork",
        "white fish",
        "shrimp",
        "egg",
        "tofu",
    ],
};

pub const VEGETABLES: IngredientCategory = IngredientCategory {
    key: "veggies",
    label: "Vegetables & fruit",
    items: &[
        "broccoli",
        "kabocha squash",
        "onion",
        "carrot",
        "potato",
        "sweet potato",
        "zucchini",
        "mushroom",
        "spinach",
        "bok choy",
        "apple",
        "banana",
    ],
};

pub const EXTRAS: IngredientCategory = IngredientCategory {
    key: "extras",
    label: "Dairy & other",
    items: &[
        "unsalted butter",
        "baby cheese",
        "milk",
        "oatmeal",
        "cooked rice",
        "flour",
    ],
};

/// All categories, in form order.
pub const CATEGORIES: [IngredientCategory; 3] = [PROTEINS, VEGETABLES, EXTRAS];
