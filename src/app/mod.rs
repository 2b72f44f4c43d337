//! HTTP surface. Every JSON response uses the `{success, ...}` envelope.

pub mod auth;
pub mod catalog;
pub mod extract;
pub mod meal_plans;
pub mod recipes;
pub mod response;
pub mod state;
pub mod uploads;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use response::{ApiError, ApiResult};
pub use state::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let images = ServeDir::new(&state.images_dir);

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/verify", get(auth::verify))
        .route("/profile", get(auth::profile))
        .route("/logout", post(auth::logout));

    let recipe_routes = Router::new()
        .route("/", get(recipes::list))
        .route("/smart", post(recipes::smart))
        .route("/saved", get(recipes::saved))
        .route("/toggle-save", post(recipes::toggle_save))
        .route("/toggle-like", post(recipes::toggle_like))
        .route("/delete/:id", delete(recipes::delete));

    let meal_plan_routes = Router::new()
        .route("/generate", post(meal_plans::generate))
        .route("/saved", get(meal_plans::saved))
        .route("/save", post(meal_plans::toggle_save))
        .route("/like", post(meal_plans::toggle_like))
        .route("/delete/:id", delete(meal_plans::delete));

    let catalog_routes = Router::new()
        .route("/all", get(catalog::list))
        .route("/static-full/:id", get(catalog::static_full))
        .route("/:id/toggle-like", patch(catalog::toggle_like));

    let image_routes = Router::new()
        .route("/upload", post(uploads::upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    Router::new()
        .route("/", get(|| async { "API is running\n" }))
        .nest("/auth", auth_routes)
        .nest("/api/recipes", recipe_routes)
        .nest("/api/mealplanner", meal_plan_routes)
        .nest("/api/generated", catalog_routes)
        .nest("/api/images", image_routes)
        .nest_service("/images", images)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
