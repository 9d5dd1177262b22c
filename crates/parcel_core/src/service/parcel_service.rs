//! Parcel use-case service.
//!
//! # Responsibility
//! - Provide registration and delivery-progress entry points for callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass the repository's registered-only rule.
//! - Service layer remains storage-agnostic.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelRepository, RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from parcel use-case operations.
#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    /// Parcel is already delivered; there is no further status.
    FinalStatus(ParcelNumber),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::FinalStatus(number) => {
                write!(f, "parcel {number} is already delivered")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::FinalStatus(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service wrapper for parcel operations.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel and returns it as stored.
    pub fn register(&self, client: ClientId, address: impl Into<String>) -> RepoResult<Parcel> {
        let number = self.repo.add(&Parcel::new(client, address))?;
        info!("event=parcel_register module=service status=ok number={number} client={client}");
        self.repo.get(number)
    }

    /// Loads one parcel by number.
    pub fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        self.repo.get(number)
    }

    /// Lists all parcels owned by `client`.
    pub fn client_parcels(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        self.repo.get_by_client(client)
    }

    /// Moves a parcel one step along `registered -> sent -> delivered`.
    ///
    /// Returns the new status.
    pub fn advance_status(&self, number: ParcelNumber) -> ServiceResult<ParcelStatus> {
        let parcel = self.repo.get(number)?;
        let Some(next) = parcel.status.next() else {
            warn!(
                "event=parcel_advance module=service status=error number={number} error_code=final_status"
            );
            return Err(ServiceError::FinalStatus(number));
        };

        self.repo.set_status(number, next)?;
        info!(
            "event=parcel_advance module=service status=ok number={} from={} to={}",
            number, parcel.status, next
        );
        Ok(next)
    }

    /// Changes the address of a registered parcel.
    ///
    /// Returns repository-level `NotRegistered` errors unchanged.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        self.repo.set_address(number, address).inspect_err(|err| {
            warn!("event=parcel_change_address module=service status=error number={number} error={err}");
        })
    }

    /// Deletes a registered parcel.
    pub fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        self.repo.delete(number).inspect_err(|err| {
            warn!("event=parcel_delete module=service status=error number={number} error={err}");
        })?;
        info!("event=parcel_delete module=service status=ok number={number}");
        Ok(())
    }
}
