//! Page and REST endpoint handlers.
//!
//! The HTML routes always answer with the full page; the JSON routes answer
//! with the cooked recipe or an `{error, kind}` body. Both map failures to
//! the same status codes.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::Form;
use babybites::error::KitchenError;
use babybites::events::{EventHandler, KitchenEvent, LoggingHandler, Stage};
use babybites::kitchen::{CookedRecipe, Kitchen};
use babybites::recipe::catalog::{CATEGORIES, IngredientCategory};
use babybites::recipe::{DEFAULT_AGE_MONTHS, FoodStyle, MAX_AGE_MONTHS, MIN_AGE_MONTHS, RecipeOrder};
use serde::Serialize;
use tracing::error;

use crate::form::RecipeForm;
use crate::render::{Outcome, Pages};

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub kitchen: Arc<Kitchen>,
    pub pages: Arc<Pages>,
    pub deadline: Option<Duration>,
}

impl AppState {
    /// Cook `order`, giving up when the configured deadline passes.
    async fn cook(
        &self,
        order: RecipeOrder,
        handler: &dyn EventHandler,
    ) -> Result<CookedRecipe, KitchenError> {
        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        self.kitchen.cook_until(order, handler, expired).await
    }
}

/// HTTP status for a failed run.
fn status_for(err: &KitchenError) -> StatusCode {
    match err {
        KitchenError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        KitchenError::Upstream(_) => StatusCode::BAD_GATEWAY,
        KitchenError::Cancelled => StatusCode::GATEWAY_TIMEOUT,
    }
}

fn render_page(pages: &Pages, status: StatusCode, form: &RecipeForm, outcome: Option<&Outcome>) -> Response {
    match pages.index(form, outcome) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Failed to render page: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render page").into_response()
        }
    }
}

/// GET /: Empty order form.
pub async fn get_index(State(app): State<AppState>) -> Response {
    render_page(&app.pages, StatusCode::OK, &RecipeForm::default(), None)
}

/// POST /recipe: Form submission.
///
/// Re-renders the page with the submitted values and the outcome: the
/// recipe (200), a warning (422) or an error (502, or 504 on deadline).
pub async fn post_recipe_form(State(app): State<AppState>, Form(form): Form<RecipeForm>) -> Response {
    let handler = LoggingHandler;
    let result = match form.to_order() {
        Ok(order) => app.cook(order, &handler).await,
        Err(invalid) => Err(app.kitchen.reject(invalid, &handler)),
    };

    handler.on_event(&KitchenEvent::StageEntered(Stage::Rendering));
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(err) => status_for(err),
    };
    let response = render_page(&app.pages, status, &form, Some(&Outcome::from_result(&result)));
    handler.on_event(&KitchenEvent::StageEntered(Stage::Idle));
    response
}

/// Error body for the JSON API.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

/// POST /api/recipe: Cook a JSON order.
///
/// Returns 200 with the cooked recipe, or `{error, kind}` with 422
/// (validation), 502 (upstream) or 504 (deadline).
pub async fn post_recipe_json(State(app): State<AppState>, Json(order): Json<RecipeOrder>) -> Response {
    let handler = LoggingHandler;
    let result = app.cook(order, &handler).await;

    handler.on_event(&KitchenEvent::StageEntered(Stage::Rendering));
    let response = match result {
        Ok(cooked) => Json(cooked).into_response(),
        Err(err) => (
            status_for(&err),
            Json(ErrorBody {
                error: err.to_string(),
                kind: err.kind(),
            }),
        )
            .into_response(),
    };
    handler.on_event(&KitchenEvent::StageEntered(Stage::Idle));
    response
}

#[derive(Serialize)]
pub struct StyleEntry {
    pub slug: &'static str,
    pub label: &'static str,
}

#[derive(Serialize)]
pub struct AgeBounds {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

/// Response body for GET /api/catalog.
#[derive(Serialize)]
pub struct Catalog {
    pub food_styles: Vec<StyleEntry>,
    pub categories: &'static [IngredientCategory],
    pub age_months: AgeBounds,
}

/// GET /api/catalog: Form choices for custom frontends.
pub async fn get_catalog() -> Json<Catalog> {
    Json(Catalog {
        food_styles: FoodStyle::ALL
            .into_iter()
            .map(|style| StyleEntry {
                slug: style.slug(),
                label: style.label(),
            })
            .collect(),
        categories: &CATEGORIES,
        age_months: AgeBounds {
            min: MIN_AGE_MONTHS,
            max: MAX_AGE_MONTHS,
            default: DEFAULT_AGE_MONTHS,
        },
    })
}
