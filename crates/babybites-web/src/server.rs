//! Axum server setup and router construction.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use babybites::kitchen::Kitchen;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::render::Pages;

/// Build the full axum router.
///
/// The router serves:
/// - the HTML form at `/` and its submission at `/recipe`
/// - the JSON API at `/api/*`
///
/// Fails when the page templates do not compile.
pub fn build_router(
    kitchen: Arc<Kitchen>,
    deadline: Option<Duration>,
) -> Result<Router, minijinja::Error> {
    let app_state = AppState {
        kitchen,
        pages: Arc::new(Pages::new()?),
        deadline,
    };

    // The JSON API may be called from pages served elsewhere.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let page_routes = Router::new()
        .route("/", get(api::get_index))
        .route("/recipe", post(api::post_recipe_form));

    let api_routes = Router::new()
        .route("/api/recipe", post(api::post_recipe_json))
        .route("/api/catalog", get(api::get_catalog))
        .layer(cors);

    Ok(Router::new()
        .merge(page_routes)
        .merge(api_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http()))
}

/// Bind `bind_addr`, serve `router` on a background task and return the
/// bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Web server stopped: {e}");
        }
    });

    Ok(addr)
}
