//! Serve the babybites order form in the browser.
//!
//! # Usage
//!
//! ```bash
//! OPENAI_API_KEY=sk-... cargo run -p babybites-web
//! OPENAI_API_KEY=sk-... cargo run -p babybites-web -- --port 8080 --deadline-secs 90
//! OPENAI_API_KEY=sk-... cargo run -p babybites-web -- --image-style studio
//! ```
//!
//! Then open the printed URL in a browser, or post JSON directly:
//!
//! ```bash
//! curl -s localhost:8501/api/recipe -H 'content-type: application/json' \
//!   -d '{"baby_age_months": 15, "food_style": "soup", "ingredients": ["potato", "carrot"]}'
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use babybites::prelude::*;
use babybites::config::DEFAULT_TIMEOUT;
use babybites::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, logging};
use babybites_web::{WebConfig, spawn_web};
use clap::Parser;

/// Baby-food recipe generator with a browser-based form.
#[derive(Parser)]
#[command(about = "Baby-food recipe generator with a browser-based form")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    host: IpAddr,

    /// Port for the web server.
    #[arg(long, default_value_t = 8501)]
    port: u16,

    /// Cancel a recipe run that takes longer than this many seconds.
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Give up on a single API call after this many seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Chat model for the recipe text.
    #[arg(long, default_value = DEFAULT_TEXT_MODEL)]
    text_model: String,

    /// Image model for the dish photo.
    #[arg(long, default_value = DEFAULT_IMAGE_MODEL)]
    image_model: String,

    /// Photo aesthetic: documentary or studio.
    #[arg(long, default_value = "documentary")]
    image_style: ImageStyle,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    logging::init("babybites=info,babybites_web=info,tower_http=info");

    // 1. Create the OpenAI client once; every request shares it.
    let client_config = ClientConfig::from_env()
        .map_err(|e| e.to_string())?
        .with_timeout(Duration::from_secs(args.timeout_secs));
    let client = OpenAiClient::new(&client_config)
        .map_err(|e| format!("failed to create API client: {e}"))?;

    // 2. Build the kitchen.
    let config = KitchenConfig::default()
        .with_text_model(args.text_model)
        .with_image_model(args.image_model)
        .with_image_style(args.image_style);
    let kitchen = Arc::new(Kitchen::new(Arc::new(client), config));

    // 3. Serve.
    let web_config = WebConfig {
        bind_addr: SocketAddr::new(args.host, args.port),
        deadline: args.deadline_secs.map(Duration::from_secs),
    };
    let addr = spawn_web(kitchen, web_config)
        .await
        .map_err(|e| format!("failed to start web server: {e}"))?;
    println!("Web UI: http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for Ctrl-C: {e}"))?;
    println!("Shutting down.");
    Ok(())
}
