use axum::{routing::get, routing::post, Router};

use crate::posts::handlers as posts;
use crate::state::AppState;
use crate::users::handlers as users;

/// Build the full axum Router with all routes.
pub fn build_router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/users", post(users::create_user))
        .route("/users/{id}", get(users::get_user));

    let post_routes = Router::new()
        .route("/posts", post(posts::create_post))
        .route("/posts/{id}", get(posts::get_post))
        .route("/posts/users/{uid}", get(posts::list_user_posts_first_page))
        .route("/posts/users/{uid}/{page}", get(posts::list_user_posts));

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(user_routes)
        .merge(post_routes)
        .merge(health)
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
