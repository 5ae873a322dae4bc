//! Persistence plumbing shared by the Taka domain crates
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL support with SeaORM
//! - `config` - `core_config::FromEnv` for [`postgres::PostgresConfig`]
//!
//! # Example
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let db = postgres::connect_with_retry(PostgresConfig::from_env()?, Default::default()).await?;
//! postgres::run_migrations::<Migrator>(&db).await?;
//! ```
//!
//! The [`soft_delete`] module holds the logical-deletion capability that
//! entities embed instead of inheriting behaviour from a base model.

pub mod common;
pub mod soft_delete;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub mod repository;

pub use common::{DatabaseError, DatabaseResult, RetryPolicy};
pub use soft_delete::{DeleteMode, InconsistentSoftDelete, ReadScope, SoftDeletable, SoftDelete};

#[cfg(feature = "postgres")]
pub use repository::BaseRepository;
