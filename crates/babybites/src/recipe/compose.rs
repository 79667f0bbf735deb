//! Prompt composer for the recipe text call.

use serde::Serialize;

use super::RecipeRequest;
use super::parse::SENTINEL;
use crate::Message;
use crate::prompt::{BulletList, SystemPromptBuilder};

/// The two prompts sent to the text model, system first.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

impl ComposedPrompt {
    /// Messages in API order: system, then user.
    pub fn into_messages(self) -> Vec<Message> {
        vec![Message::system(self.system), Message::user(self.user)]
    }
}

/// Build the system and user prompts for `request`.
pub fn compose(request: &RecipeRequest) -> ComposedPrompt {
    let age = request.baby_age_months();
    let style = request.food_style().label();

    let recipe_rules = BulletList::new()
        .item(
            "Strictly keep the dish salt-free or low-salt, but raise the calories \
             with unsalted butter, cheese and similar.",
        )
        .item_opt(
            request
                .allergy_exclusions()
                .map(|allergy| format!("Caution: never include {allergy}.")),
        )
        .item(format!("The dish must be in the '{style}' style."))
        .item(
            "For first-time parents, give exact measurements (g, spoons), heat \
             levels and cooking times.",
        )
        .build();

    let shopping_rules = BulletList::new()
        .item(
            "If the parent could buy only 1-2 more ingredients on Coupang, which \
             versatile ones would combine with the current ingredients to unlock \
             the most new menus? Recommend them and briefly explain why.",
        )
        .build();

    let output_format = format!(
        "You must answer in exactly this format and keep the separator line.\n\
         [Dish name]\n\
         (recipe body...)\n\
         {SENTINEL}\n\
         (Coupang ingredient suggestions and reasons...)"
    );

    let system = SystemPromptBuilder::new(format!(
        "You are the best nutritionist and cooking instructor for a {age}-month-old baby."
    ))
    .section("Task 1: Write the recipe", recipe_rules)
    .section("Task 2: Suggest ingredients to buy", shopping_rules)
    .section("Output format", output_format)
    .build();

    let user = format!("Fridge ingredients: '{}'.", request.ingredient_list());

    ComposedPrompt { system, user }
}
