use axum::Router;
use domain_locations::{handlers, LocationService, PgLocationRepository};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PgLocationRepository::new(state.db.clone());
    handlers::router(LocationService::new(repository))
}
