#![allow(clippy::unwrap_used)]
// Exercises the parcel CRUD seam with an in-memory endpoint: documents
// produced by `to_wire` survive storage and parse back identically.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use indexmap::IndexMap;
use pretty_assertions::assert_eq;

use wanfly_api::{Error, FeatureProfileEndpoint, ParcelId, ProfileId, WireDocument};
use wanfly_core::catalog::policy_lists::{POLICER, POLICER_ENTRY};
use wanfly_core::{FieldSlot, Parcel, Record, ScalarValue, as_global};

type ParcelKey = (ProfileId, String, ParcelId);

#[derive(Default)]
struct InMemoryEndpoint {
    parcels: Mutex<HashMap<ParcelKey, WireDocument>>,
}

#[async_trait]
impl FeatureProfileEndpoint for InMemoryEndpoint {
    async fn create_parcel(
        &self,
        profile: ProfileId,
        parcel_type: &str,
        document: &WireDocument,
    ) -> Result<ParcelId, Error> {
        let id = ParcelId::random();
        self.parcels
            .lock()
            .unwrap()
            .insert((profile, parcel_type.to_owned(), id), document.clone());
        Ok(id)
    }

    async fn get_parcel(
        &self,
        profile: ProfileId,
        parcel_type: &str,
        parcel: ParcelId,
    ) -> Result<WireDocument, Error> {
        self.parcels
            .lock()
            .unwrap()
            .get(&(profile, parcel_type.to_owned(), parcel))
            .cloned()
            .ok_or(Error::ParcelNotFound { profile, parcel })
    }

    async fn update_parcel(
        &self,
        profile: ProfileId,
        parcel_type: &str,
        parcel: ParcelId,
        document: &WireDocument,
    ) -> Result<(), Error> {
        let mut parcels = self.parcels.lock().unwrap();
        let key = (profile, parcel_type.to_owned(), parcel);
        if !parcels.contains_key(&key) {
            return Err(Error::ParcelNotFound { profile, parcel });
        }
        parcels.insert(key, document.clone());
        Ok(())
    }

    async fn delete_parcel(
        &self,
        profile: ProfileId,
        parcel_type: &str,
        parcel: ParcelId,
    ) -> Result<(), Error> {
        self.parcels
            .lock()
            .unwrap()
            .remove(&(profile, parcel_type.to_owned(), parcel))
            .map(|_| ())
            .ok_or(Error::ParcelNotFound { profile, parcel })
    }
}

fn policer_entry(burst: i64, rate: i64) -> Record {
    Record::build(
        &POLICER_ENTRY,
        IndexMap::from([
            (
                "burst",
                FieldSlot::Value(as_global(ScalarValue::Integer(burst))),
            ),
            (
                "rate",
                FieldSlot::Value(as_global(ScalarValue::Integer(rate))),
            ),
        ]),
    )
    .unwrap()
}

#[tokio::test]
async fn parcel_crud_round_trip() {
    let endpoint = InMemoryEndpoint::default();
    let profile = ProfileId::random();

    let parcel = Parcel::build(
        &POLICER,
        "branch-policer",
        Some("rate limits".into()),
        IndexMap::from([(
            "entries",
            FieldSlot::Records(vec![policer_entry(70_000, 1_000_000)]),
        )]),
    )
    .unwrap();

    // Create, fetch, and parse back.
    let id = endpoint
        .create_parcel(profile, parcel.parcel_type(), &parcel.to_wire())
        .await
        .unwrap();
    let fetched = endpoint
        .get_parcel(profile, parcel.parcel_type(), id)
        .await
        .unwrap();
    let restored = Parcel::from_wire(&POLICER, &fetched).unwrap();
    assert_eq!(restored, parcel);

    // Mutate through the helper and push the update.
    let mut updated = restored.clone();
    updated
        .push_record("entries", policer_entry(20_000, 64_000))
        .unwrap();
    endpoint
        .update_parcel(profile, updated.parcel_type(), id, &updated.to_wire())
        .await
        .unwrap();

    let fetched = endpoint
        .get_parcel(profile, updated.parcel_type(), id)
        .await
        .unwrap();
    let Some(FieldSlot::Records(entries)) =
        Parcel::from_wire(&POLICER, &fetched).unwrap().get("entries").cloned()
    else {
        panic!("entries should exist");
    };
    assert_eq!(entries.len(), 2);

    // Delete, then verify the id is gone.
    endpoint
        .delete_parcel(profile, updated.parcel_type(), id)
        .await
        .unwrap();
    assert!(matches!(
        endpoint.get_parcel(profile, updated.parcel_type(), id).await,
        Err(Error::ParcelNotFound { .. })
    ));
}
