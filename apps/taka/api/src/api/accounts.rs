use axum::Router;
use domain_accounts::{handlers, PgUserRepository, StaticOtpVerifier, UserService};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PgUserRepository::new(state.db.clone());
    let service = UserService::new(repository)
        .with_otp_verifier(StaticOtpVerifier::new(state.config.otp_placeholder_code.clone()));
    handlers::router(service)
}
