//! Turn leftover fridge ingredients into a baby-food recipe and dish photo.
//!
//! Reads the API key from the `OPENAI_API_KEY` environment variable (a `.env`
//! file in the working directory is loaded first).
//!
//! # Examples
//!
//! ```sh
//! # Basic request
//! babybites --ingredients "abalone, asparagus, eggplant"
//!
//! # Older baby, soup, avoiding eggs
//! babybites --ingredients "chicken breast, potato" --age 24 \
//!   --style soup --allergy "egg"
//!
//! # Machine-readable output
//! babybites --ingredients "tofu, zucchini" --json | jq .recipe.dish_name
//! ```
//!
//! Press Ctrl-C while waiting to abandon the request.

use std::process;
use std::sync::Arc;
use std::time::Duration;

use babybites::config::{ClientConfig, DEFAULT_TIMEOUT, KitchenConfig};
use babybites::events::{CompositeEventHandler, EventHandler, KitchenEvent, LoggingHandler, Stage};
use babybites::kitchen::{CookedRecipe, Kitchen};
use babybites::recipe::{DEFAULT_AGE_MONTHS, FoodStyle, ImageStyle, RecipeOrder, split_ingredients};
use babybites::{DEFAULT_IMAGE_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TEXT_MODEL, OpenAiClient, logging};
use clap::Parser;

/// Turn leftover fridge ingredients into a baby-food recipe and dish photo.
///
/// Reads the API key from the OPENAI_API_KEY environment variable.
#[derive(Parser)]
#[command(name = "babybites", version)]
struct Cli {
    // ── Order ──────────────────────────────────────────────────
    /// Ingredients in the fridge, separated by commas or newlines
    #[arg(long, short)]
    ingredients: String,

    /// Baby age in months (4 – 36)
    #[arg(long, default_value_t = DEFAULT_AGE_MONTHS)]
    age: u32,

    /// Food style: rice-bowl, finger-food, side-dish, soup, snack-bread
    #[arg(long, default_value = "rice-bowl")]
    style: FoodStyle,

    /// Allergies or ingredients to exclude
    #[arg(long, default_value = "")]
    allergy: String,

    // ── Models ─────────────────────────────────────────────────
    /// Chat model for the recipe text
    #[arg(long, default_value = DEFAULT_TEXT_MODEL)]
    text_model: String,

    /// Image model for the dish photo
    #[arg(long, default_value = DEFAULT_IMAGE_MODEL)]
    image_model: String,

    /// Sampling temperature for the recipe text
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Photo aesthetic: documentary or studio
    #[arg(long, default_value = "documentary")]
    image_style: ImageStyle,

    /// API base URL (overrides OPENAI_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Give up on a single API call after this many seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    // ── Output mode ────────────────────────────────────────────
    /// Print the cooked recipe as JSON
    #[arg(long)]
    json: bool,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short)]
    verbose: bool,
}

/// Prints one progress line per upstream wait, like a spinner would.
struct ProgressLine;

impl EventHandler for ProgressLine {
    fn on_event(&self, event: &KitchenEvent<'_>) {
        match event {
            KitchenEvent::StageEntered(Stage::AwaitingTextGeneration) => {
                eprintln!("Writing the recipe...");
            }
            KitchenEvent::StageEntered(Stage::AwaitingImageGeneration) => {
                eprintln!("Plating and taking a photo...");
            }
            _ => {}
        }
    }
}

/// Apply the transport flags on top of the environment settings.
fn client_config(cli: &Cli, from_env: ClientConfig) -> Result<ClientConfig, String> {
    let mut config = from_env.with_timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(base_url) = &cli.base_url {
        config = config
            .with_base_url(base_url.as_str())
            .map_err(|e| e.to_string())?;
    }
    Ok(config)
}

async fn cook(cli: &Cli) -> Result<String, String> {
    let client_config = client_config(cli, ClientConfig::from_env().map_err(|e| e.to_string())?)?;
    let client = OpenAiClient::new(&client_config)
        .map_err(|e| format!("failed to create API client: {e}"))?;

    let config = KitchenConfig::default()
        .with_text_model(&cli.text_model)
        .with_image_model(&cli.image_model)
        .with_temperature(cli.temperature)
        .with_image_style(cli.image_style);
    let kitchen = Kitchen::new(Arc::new(client), config);

    let order = RecipeOrder {
        baby_age_months: cli.age,
        food_style: cli.style,
        allergy: cli.allergy.clone(),
        ingredients: split_ingredients(&cli.ingredients),
    };

    let handler = CompositeEventHandler::new()
        .with(LoggingHandler)
        .with_if(!cli.json, ProgressLine);

    let interrupted = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler available; never cancel.
            std::future::pending::<()>().await;
        }
    };

    let cooked = kitchen
        .cook_until(order, &handler, interrupted)
        .await
        .map_err(|e| {
            if e.is_user_error() {
                e.to_string()
            } else {
                format!("recipe generation failed: {e}")
            }
        })?;

    if cli.json {
        serde_json::to_string_pretty(&cooked)
            .map(|s| s + "\n")
            .map_err(|e| format!("failed to serialize result: {e}"))
    } else {
        Ok(render_text(&cooked))
    }
}

fn render_text(cooked: &CookedRecipe) -> String {
    let recipe = &cooked.recipe;
    let mut out = String::new();

    if recipe.has_dish_name() {
        out.push_str(&format!("{}\n\n", recipe.dish_name));
    } else {
        out.push_str("(The model did not name the dish; the photo may not match.)\n\n");
    }
    if !recipe.recipe_body.is_empty() {
        out.push_str(&format!("{}\n\n", recipe.recipe_body));
    }
    out.push_str(&format!("Shopping suggestion\n{}\n\n", recipe.shopping_tip));
    out.push_str(&format!("Photo: {}\n", cooked.image.url));
    out.push_str(&format!("({})\n", cooked.estimated_cost.summary()));
    out
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    logging::init(if cli.verbose {
        "babybites=debug"
    } else {
        "babybites=error"
    });

    match cook(&cli).await {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
