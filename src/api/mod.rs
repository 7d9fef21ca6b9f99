pub mod auth;
mod dashboard;
mod error;
mod products;

pub use error::{ApiError, ErrorBody, ErrorResponse};

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Login is the only public API route
    let public_routes = Router::new().route("/auth/login", post(auth::login));

    // Everything else requires a valid session cookie
    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/dashboard", get(dashboard::summary))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", public_routes.merge(protected_routes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
