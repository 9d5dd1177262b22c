//! Core domain logic for the parcel store.
//! This crate owns the `parcel` table and its registered-only edit rule.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogConfig};
pub use model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
pub use repo::parcel_repo::{
    ParcelAction, ParcelRepository, RepoError, RepoResult, SqliteParcelRepository,
};
pub use service::parcel_service::{ParcelService, ServiceError, ServiceResult};
