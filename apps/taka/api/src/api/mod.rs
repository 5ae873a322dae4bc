use axum::Router;

pub mod accounts;
pub mod health;
pub mod locations;

/// API routes without the `/api` prefix, which `create_router` adds.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new()
        .nest("/accounts", accounts::router(state))
        .nest("/locations", locations::router(state))
}

/// `/ready` with a real database ping; merged beside the stateless app router.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
