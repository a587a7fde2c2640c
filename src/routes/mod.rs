use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

mod auth;
mod health;
mod middleware_auth;
mod pages;
mod tasks;

pub use health::health;

use crate::session::session_gate;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    let task_router = Router::new()
        .route(
            "/tasks",
            get(tasks::list).post(tasks::create).delete(tasks::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middleware_auth::require_auth,
        ));

    let auth_router = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let page_router = Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::login))
        .route("/signup", get(pages::signup))
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), session_gate));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .nest("/api", task_router.merge(auth_router))
        .merge(page_router)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
