//! Shared application state handed to the route builders.

use database::postgres::DatabaseConnection;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: DatabaseConnection,
}
