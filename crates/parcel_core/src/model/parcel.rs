//! Parcel domain model.
//!
//! # Responsibility
//! - Define the canonical shipment record stored in the `parcel` table.
//! - Own the status vocabulary and its delivery progression.
//!
//! # Invariants
//! - `number` is assigned by storage and never reused.
//! - `address` may change only while `status == Registered`.
//! - `created_at` is second-precision UTC.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Storage-generated parcel identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelNumber(pub i64);

impl Display for ParcelNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of the parcel owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub i64);

impl Display for ClientId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parcel lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    /// Accepted but not yet handed to a carrier. Only state that allows edits.
    Registered,
    /// In transit.
    Sent,
    /// Handed to the recipient.
    Delivered,
}

impl ParcelStatus {
    /// Stable string stored in `parcel.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
        }
    }

    /// Parses a stored status value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "registered" => Some(Self::Registered),
            "sent" => Some(Self::Sent),
            "delivered" => Some(Self::Delivered),
            _ => None,
        }
    }

    /// Next step of `registered -> sent -> delivered`.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Registered => Some(Self::Sent),
            Self::Sent => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }
}

impl Display for ParcelStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shipment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Zero until the parcel has been stored.
    pub number: ParcelNumber,
    pub client: ClientId,
    pub status: ParcelStatus,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl Parcel {
    /// Creates an unsaved parcel in `registered` status.
    pub fn new(client: ClientId, address: impl Into<String>) -> Self {
        Self {
            number: ParcelNumber(0),
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: Utc::now().trunc_subsecs(0),
        }
    }

    /// Returns whether this parcel has been assigned a storage number.
    pub fn is_stored(&self) -> bool {
        self.number.0 > 0
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientId, Parcel, ParcelStatus};

    #[test]
    fn status_string_mapping_is_stable() {
        for status in [
            ParcelStatus::Registered,
            ParcelStatus::Sent,
            ParcelStatus::Delivered,
        ] {
            assert_eq!(ParcelStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ParcelStatus::parse("lost"), None);
        assert_eq!(ParcelStatus::parse("Registered"), None);
    }

    #[test]
    fn status_progression_ends_at_delivered() {
        assert_eq!(ParcelStatus::Registered.next(), Some(ParcelStatus::Sent));
        assert_eq!(ParcelStatus::Sent.next(), Some(ParcelStatus::Delivered));
        assert_eq!(ParcelStatus::Delivered.next(), None);
    }

    #[test]
    fn new_parcel_is_registered_and_unsaved() {
        let parcel = Parcel::new(ClientId(7), "Main st. 1");
        assert_eq!(parcel.status, ParcelStatus::Registered);
        assert!(!parcel.is_stored());
        assert_eq!(parcel.created_at.timestamp_subsec_nanos(), 0);
    }
}
