//! Configuration domain layer between `wanfly-api` and SDK consumers.
//!
//! This crate owns the strongly-typed configuration model for an SD-WAN
//! controller and the engine that migrates legacy templates into it:
//!
//! - **Option values** ([`model::value`]) — the `global` / `variable` /
//!   `default` tagged union every parcel leaf is wrapped in, carrying
//!   provenance alongside the payload and round-tripping its discriminant
//!   losslessly.
//!
//! - **Validators** ([`validate`]) — pure constraint rules (numeric
//!   ranges, patterns, mutual exclusivity, criteria-priority consistency)
//!   re-run on every construction and mutation. Range checks report an
//!   explicit [`RangeOutcome::NotApplicable`] for non-literals instead of
//!   folding them into a boolean.
//!
//! - **Parcels** ([`model::parcel`], [`model::schema`]) — schema-driven
//!   aggregates built from static field-descriptor tables; generic
//!   `build` / `to_wire` / `from_wire` routines handle aliasing, data-path
//!   nesting, strict unknown-key rejection, and validate-or-rollback
//!   mutation helpers.
//!
//! - **Catalogue** ([`model::catalog`]) — representative parcel schemas
//!   (OMP, policer, SLA class, zone, app-probe, preferred color group)
//!   declared as data, not code.
//!
//! - **Conversion** ([`convert`]) — the legacy feature-template →
//!   parcel engine: per-field source resolution, type coercion, derived
//!   field synthesis, and all-or-nothing failure semantics.

pub mod convert;
pub mod error;
pub mod model;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use convert::TemplateConverter;
pub use error::{ModelError, SchemaViolation};
pub use model::catalog;
pub use model::parcel::{FieldSlot, Parcel, Record};
pub use model::schema::{
    ConstScalar, DefaultPolicy, FieldDescriptor, FieldRule, RecordSchema, Schema, SchemaRule,
    ValueKind,
};
pub use model::value::{
    OptionType, OptionValue, ScalarValue, as_default, as_default_marker, as_global, as_variable,
};
pub use validate::RangeOutcome;
