// Parcel wire envelope and endpoint identifiers
//
// The controller addresses configuration through feature profiles (UUID)
// containing parcels (UUID). A parcel travels as the `{ name,
// description?, data }` envelope; `data` stays an opaque JSON object here
// -- `wanfly-core` gives it schema-checked structure.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Identifiers ─────────────────────────────────────────────────────

/// Identifier of a feature profile on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(Uuid);

/// Identifier of a parcel within a feature profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelId(Uuid);

impl ProfileId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl ParcelId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ParcelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Wire envelope ───────────────────────────────────────────────────

/// The serialized form of one parcel.
///
/// `data` holds the schema-shaped field object where every leaf is an
/// `{ "optionType": ..., "value": ... }` tagged value. Unknown envelope
/// keys are rejected outright; unknown keys *inside* `data` are the core
/// crate's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WireDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub data: serde_json::Value,
}

/// Response body of a parcel create call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParcelInfo {
    #[serde(rename = "parcelId")]
    pub parcel_id: ParcelId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn wire_document_round_trips() {
        let doc = WireDocument {
            name: "edge-omp".into(),
            description: Some("OMP settings".into()),
            data: json!({ "holdtime": { "optionType": "global", "value": 60 } }),
        };
        let encoded = serde_json::to_value(&doc).unwrap();
        let decoded: WireDocument = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn wire_document_omits_empty_description() {
        let doc = WireDocument {
            name: "edge-omp".into(),
            description: None,
            data: json!({}),
        };
        let encoded = serde_json::to_value(&doc).unwrap();
        assert_eq!(encoded, json!({ "name": "edge-omp", "data": {} }));
    }

    #[test]
    fn wire_document_rejects_unknown_envelope_keys() {
        let raw = json!({ "name": "x", "data": {}, "payloadVersion": 2 });
        assert!(serde_json::from_value::<WireDocument>(raw).is_err());
    }

    #[test]
    fn parcel_info_uses_controller_field_name() {
        let raw = json!({ "parcelId": "550e8400-e29b-41d4-a716-446655440000" });
        let info: ParcelInfo = serde_json::from_value(raw).unwrap();
        assert_eq!(
            info.parcel_id.to_string(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
    }
}
