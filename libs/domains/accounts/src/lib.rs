//! Accounts Domain
//!
//! Admin and field accounts for the collection service: households, money
//! collectors, drivers, ward officers and administrators. Users log in with
//! their phone number, may be scoped to a ward, and are soft-deleted by
//! default.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, forms, audit events
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌────────────────┐
//! │   Service   │ ──► │ PasswordHasher │
//! └──────┬──────┘     │ OtpVerifier    │
//!        │            └────────────────┘
//! ┌──────▼──────┐
//! │ Repository  │  ← Scoped reads, soft/hard delete
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← User, Role, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_accounts::{handlers, InMemoryUserRepository, StaticOtpVerifier, UserService};
//!
//! let service = UserService::new(InMemoryUserRepository::new())
//!     .with_otp_verifier(StaticOtpVerifier::new("9876"));
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod otp;
pub mod password;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{UserError, UserResult};
pub use forms::{LoginForm, OtpForm, PasswordChangeForm, ProfileForm, RegisterForm};
pub use handlers::ApiDoc;
pub use models::{CreateUser, MAX_PAGE_SIZE, Role, UpdateUser, User, UserFilter, UserResponse};
pub use otp::{OtpVerifier, StaticOtpVerifier};
pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
