// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for arscan.
//!
//! This crate provides the error type, the marker domain model with its
//! validating decode step, the QR payload parser, and the traits the fetch
//! pipeline is wired through.

pub mod error;
pub mod qr;
pub mod traits;
pub mod types;
pub mod validation;

// Re-export key items at crate root for ergonomic imports.
pub use error::ArscanError;
pub use qr::parse_marker_id_from_scan;
pub use types::{
    CacheInfo, LoginResponse, MarkerId, MarkerRecord, ProfileUpdate, SignupResponse, User,
};
pub use validation::{MarkerDecodeError, is_valid_marker_data};

pub use traits::connectivity::AlwaysOnline;
pub use traits::{CacheStore, ConnectivityProbe, MarkerSource};
