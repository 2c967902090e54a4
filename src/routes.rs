// src/routes.rs

use std::sync::Arc;

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{delete, get, post},
};
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, comments, posts},
    state::AppState,
    utils::jwt::{auth_middleware, optional_auth_middleware},
};

/// Assembles the main application router.
///
/// * Auth routes are rate-limited.
/// * Public post routes run behind optional auth, so private-post filtering
///   can see who is asking without requiring a login.
/// * Applies global middleware (Trace, CORS) and injects global state.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:5173".parse().unwrap(),
        "http://127.0.0.1:5173".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(5)
            .finish()
            .unwrap(),
    );

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(GovernorLayer::new(governor_conf));

    let public_post_routes = Router::new()
        .route("/", get(posts::list_posts))
        .route("/{id}", get(posts::get_post))
        .route("/{id}/comments", get(comments::list_comments))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let protected_post_routes = Router::new()
        .route("/", post(posts::create_post))
        .route("/mine", get(posts::list_my_posts))
        .route("/{id}", delete(posts::delete_post))
        .route("/{id}/comments", post(comments::create_comment))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/posts", public_post_routes.merge(protected_post_routes))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
