//! HTML rendering with minijinja.
//!
//! There is one page. It always shows the form, prefilled with the last
//! submission, and below it at most one [`Outcome`].

use babybites::error::KitchenError;
use babybites::kitchen::CookedRecipe;
use babybites::recipe::catalog::CATEGORIES;
use babybites::recipe::{FoodStyle, MAX_AGE_MONTHS, MIN_AGE_MONTHS};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::form::RecipeForm;

const INDEX: &str = "index.html";

/// What to show under the form after a submission.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Recipe {
        trace_id: String,
        /// Empty when the model did not name the dish.
        dish_name: String,
        recipe_body: String,
        shopping_tip: String,
        image_url: String,
        cost_summary: String,
    },
    /// The order was not cookable; nothing was sent upstream.
    Warning { message: String },
    /// An upstream call failed or the run was cancelled.
    Error { message: String },
}

impl Outcome {
    pub fn from_result(result: &Result<CookedRecipe, KitchenError>) -> Self {
        match result {
            Ok(cooked) => Outcome::Recipe {
                trace_id: cooked.trace_id.clone(),
                dish_name: cooked.recipe.dish_name.clone(),
                recipe_body: cooked.recipe.recipe_body.clone(),
                shopping_tip: cooked.recipe.shopping_tip.clone(),
                image_url: cooked.image.url.clone(),
                cost_summary: cooked.estimated_cost.summary(),
            },
            Err(err) => Self::from_error(err),
        }
    }

    pub fn from_error(err: &KitchenError) -> Self {
        if err.is_user_error() {
            Outcome::Warning {
                message: capitalize(&err.to_string()),
            }
        } else {
            Outcome::Error {
                message: format!("Something went wrong. Please try again shortly. ({err})"),
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Serialize)]
struct StyleOption {
    slug: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Serialize)]
struct CategoryView {
    key: &'static str,
    label: &'static str,
    items: Vec<ItemView>,
}

#[derive(Serialize)]
struct ItemView {
    name: &'static str,
    selected: bool,
}

/// Compiled page templates.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    /// Compile the embedded page templates.
    pub fn new() -> Result<Self, minijinja::Error> {
        Self::from_source(include_str!("../templates/index.html"))
    }

    fn from_source(index: &'static str) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(INDEX, index)?;
        Ok(Self { env })
    }

    /// Render the page for `form` with an optional outcome below it.
    pub fn index(&self, form: &RecipeForm, outcome: Option<&Outcome>) -> Result<String, minijinja::Error> {
        let styles: Vec<StyleOption> = FoodStyle::ALL
            .into_iter()
            .map(|style| StyleOption {
                slug: style.slug(),
                label: style.label(),
                selected: form.food_style.eq_ignore_ascii_case(style.slug()),
            })
            .collect();

        let categories: Vec<CategoryView> = CATEGORIES
            .iter()
            .map(|category| CategoryView {
                key: category.key,
                label: category.label,
                items: category
                    .items
                    .iter()
                    .map(|&name| ItemView {
                        name,
                        selected: form.is_selected(name),
                    })
                    .collect(),
            })
            .collect();

        self.env.get_template(INDEX)?.render(context! {
            form => form,
            styles => styles,
            categories => categories,
            outcome => outcome,
            min_age => MIN_AGE_MONTHS,
            max_age => MAX_AGE_MONTHS,
        })
    }
}
