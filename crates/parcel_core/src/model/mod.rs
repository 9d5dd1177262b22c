//! Domain model for parcel records.
//!
//! # Responsibility
//! - Define the data structures shared by repository and service layers.
//!
//! # Invariants
//! - Parcel identity is owned by storage; callers never choose a number.

pub mod parcel;
