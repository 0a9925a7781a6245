// Feature-profile parcel CRUD contract
//
// The transport itself (HTTP session, auth, retry around the controller's
// asynchronous task engine) lives outside this workspace. This trait pins
// down the seam: parcel CRUD addressed by profile id, parcel type path
// segment, and parcel id. Tests implement it in memory.

use async_trait::async_trait;

use crate::error::Error;
use crate::wire::{ParcelId, ProfileId, WireDocument};

/// Parcel CRUD operations on one controller's configuration API.
///
/// `parcel_type` is the schema's stable type tag, used verbatim as the
/// endpoint path segment (e.g. `omp`, `policer`, `lan/vpn`).
#[async_trait]
pub trait FeatureProfileEndpoint: Send + Sync {
    /// Create a parcel in `profile`; returns the controller-assigned id.
    async fn create_parcel(
        &self,
        profile: ProfileId,
        parcel_type: &str,
        document: &WireDocument,
    ) -> Result<ParcelId, Error>;

    /// Fetch one parcel by id.
    async fn get_parcel(
        &self,
        profile: ProfileId,
        parcel_type: &str,
        parcel: ParcelId,
    ) -> Result<WireDocument, Error>;

    /// Replace an existing parcel's payload.
    async fn update_parcel(
        &self,
        profile: ProfileId,
        parcel_type: &str,
        parcel: ParcelId,
        document: &WireDocument,
    ) -> Result<(), Error>;

    /// Delete one parcel by id.
    async fn delete_parcel(
        &self,
        profile: ProfileId,
        parcel_type: &str,
        parcel: ParcelId,
    ) -> Result<(), Error>;
}
