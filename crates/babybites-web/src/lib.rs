//! Browser form and JSON API for the `babybites` recipe generator.
//!
//! `babybites-web` serves a single HTML page: the order form on top and,
//! after a submission, either the cooked recipe with its photo, a warning
//! (nothing to cook with) or an error. The same [`Kitchen`] is also exposed
//! as a JSON endpoint.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use babybites::prelude::*;
//! use babybites_web::{WebConfig, spawn_web};
//!
//! let client = OpenAiClient::new(&ClientConfig::from_env()?)?;
//! let kitchen = Arc::new(Kitchen::new(Arc::new(client), KitchenConfig::default()));
//!
//! let addr = spawn_web(kitchen, WebConfig::default()).await?;
//! println!("Open http://{addr}");
//! ```
//!
//! # Routes
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Empty order form |
//! | `POST /recipe` | Form submission; re-renders the page with the outcome |
//! | `POST /api/recipe` | JSON order in, cooked recipe or `{error, kind}` out |
//! | `GET /api/catalog` | Food styles, ingredient categories and age bounds |
//!
//! Each request cooks independently. A run is abandoned when the optional
//! [`WebConfig::deadline`] passes or when the client disconnects, since axum
//! drops the handler future and the in-flight upstream call with it.

mod api;
pub mod form;
mod render;
mod server;

pub use form::RecipeForm;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use babybites::kitchen::Kitchen;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:8501`.
    pub bind_addr: SocketAddr,
    /// Longest a single recipe run may take before it is cancelled.
    /// Default: none.
    pub deadline: Option<Duration>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            deadline: None,
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down. Fails before binding
/// when the page templates do not compile.
pub async fn spawn_web(kitchen: Arc<Kitchen>, config: WebConfig) -> std::io::Result<SocketAddr> {
    let router = server::build_router(kitchen, config.deadline)
        .map_err(|e| std::io::Error::other(format!("failed to compile page templates: {e}")))?;
    server::start_server(router, config.bind_addr).await
}
