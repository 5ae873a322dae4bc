//! Locations Domain
//!
//! Reference data for the administrative hierarchy that scopes every account:
//! Region → District → Ward → Street. Each level belongs to exactly one parent
//! and deleting a parent removes all of its descendants.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, parent checks
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_locations::{handlers, InMemoryLocationRepository, LocationService};
//!
//! let service = LocationService::new(InMemoryLocationRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{LocationError, LocationKind, LocationResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateDistrict, CreateRegion, CreateStreet, CreateWard, District, Region, Street, Ward,
};
pub use postgres::PgLocationRepository;
pub use repository::{InMemoryLocationRepository, LocationRepository};
pub use service::LocationService;
