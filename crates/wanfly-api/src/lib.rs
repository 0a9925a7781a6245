//! Raw API boundary for an SD-WAN controller's configuration surface.
//!
//! This crate owns the types that cross the wire, and nothing else:
//!
//! - **[`TemplateValues`]** — the heterogeneous value map returned by the
//!   controller's legacy feature-template endpoints. Keys are dash- or
//!   underscore-separated identifiers; values range from bare primitives to
//!   nested maps, record lists, and pre-wrapped option values.
//!
//! - **[`WireDocument`]** — the `{ name, description?, data }` envelope a
//!   feature-profile parcel is created from and returned as.
//!
//! - **[`FeatureProfileEndpoint`]** — the parcel CRUD contract. Transport,
//!   sessions, and authentication are deliberately out of scope; callers
//!   bring their own implementation (tests use an in-memory one).
//!
//! `wanfly-core` consumes these types and owns all validation and
//! conversion logic -- nothing in this crate rejects a payload beyond
//! structural deserialization.

pub mod endpoint;
pub mod error;
pub mod template;
pub mod wire;

pub use endpoint::FeatureProfileEndpoint;
pub use error::Error;
pub use template::{TemplateValue, TemplateValues, WrappedValue};
pub use wire::{ParcelId, ParcelInfo, ProfileId, WireDocument};
