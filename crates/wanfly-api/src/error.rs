use thiserror::Error;

use crate::wire::{ParcelId, ProfileId};

/// Top-level error type for the `wanfly-api` crate.
///
/// Covers the failure modes an endpoint implementation can surface:
/// controller rejections, unknown parcel routes, and malformed payloads.
/// `wanfly-core` maps these into domain-appropriate diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The controller rejected the request.
    #[error("Controller rejected the request: {message}")]
    Rejected {
        message: String,
        /// Controller-specific error code (e.g. "validation.parcel.invalid").
        code: Option<String>,
    },

    /// No endpoint route exists for the requested parcel type.
    #[error("Unknown parcel type: {0}")]
    UnknownParcelType(String),

    /// The requested parcel does not exist in the profile.
    #[error("Parcel {parcel} not found in profile {profile}")]
    ParcelNotFound { profile: ProfileId, parcel: ParcelId },

    /// A response payload did not match the documented shape.
    #[error("Unexpected response shape: {message}")]
    UnexpectedShape { message: String },
}
