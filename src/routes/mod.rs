pub mod thoughts;

use crate::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(archive_routes())
        .nest("/api/thoughts", thought_api_routes())
        .with_state(state)
}

pub fn archive_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(thoughts::index))
        .route("/{year}", get(thoughts::by_year))
        .route("/{year}/{month}", get(thoughts::by_month))
        .route("/{year}/{month}/{day}", get(thoughts::by_day))
        .route("/{year}/{month}/{day}/{slug}", get(thoughts::detail))
}

pub fn thought_api_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(thoughts::create_thought))
        .route(
            "/{id}",
            put(thoughts::update_thought).delete(thoughts::delete_thought),
        )
}
