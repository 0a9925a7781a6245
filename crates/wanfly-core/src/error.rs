// ── Core error types ──
//
// Every failure in the value system, validators, parcel machinery, and
// template converter lands here. All variants are synchronous and
// non-retryable; each carries enough context (field, bound, actual) for
// the caller to act without re-parsing a message string.

use std::fmt;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A value's shape or pattern is wrong (bad variable reference,
    /// regex mismatch, non-numeric payload under a numeric constraint).
    #[error("Invalid format for {field}: {reason}")]
    Format { field: String, reason: String },

    /// A numeric literal fell outside its declared bounds.
    #[error("{field} out of range [{min}, {max}]: {actual}")]
    Range {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    /// A mutually-exclusive field set was violated.
    #[error("mutually-exclusive fields {fields:?}: {} populated", populated.len())]
    Exclusivity {
        fields: Vec<String>,
        populated: Vec<String>,
        /// Whether exactly one (rather than at most one) must be set.
        required: bool,
    },

    /// The parcel diverged from its declared schema.
    #[error("Schema violation in {parcel_type}: {violation}")]
    Schema {
        parcel_type: String,
        violation: SchemaViolation,
    },

    /// Converting a legacy template failed. Wraps the first field-level
    /// failure encountered; no partially-converted parcel escapes.
    #[error("Cannot convert template {template_type} (field {field}): {source}")]
    Conversion {
        template_type: String,
        field: String,
        source: Box<ModelError>,
    },
}

impl ModelError {
    /// The field the error is anchored to, when one exists.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Format { field, .. } | Self::Range { field, .. } => Some(field),
            Self::Exclusivity { fields, .. } => fields.first().map(String::as_str),
            Self::Schema { violation, .. } => violation.field(),
            Self::Conversion { field, .. } => Some(field),
        }
    }
}

/// What exactly diverged between a parcel and its schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaViolation {
    /// A field name the schema does not declare.
    UnknownField { name: String },
    /// A wire key with no corresponding field at its nesting path.
    UnknownWireKey { path: String },
    /// A required field is absent.
    MissingRequired { field: String },
    /// A payload whose kind does not match the field's declared kind.
    KindMismatch {
        field: String,
        expected: String,
        found: String,
    },
    /// An `optionType` discriminant the schema cannot accept here.
    VariantMismatch { field: String, option_type: String },
}

impl SchemaViolation {
    fn field(&self) -> Option<&str> {
        match self {
            Self::UnknownField { name } => Some(name),
            Self::UnknownWireKey { path } => Some(path),
            Self::MissingRequired { field }
            | Self::KindMismatch { field, .. }
            | Self::VariantMismatch { field, .. } => Some(field),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField { name } => write!(f, "unknown field `{name}`"),
            Self::UnknownWireKey { path } => write!(f, "unknown wire key `{path}`"),
            Self::MissingRequired { field } => write!(f, "missing required field `{field}`"),
            Self::KindMismatch {
                field,
                expected,
                found,
            } => write!(f, "field `{field}` expects {expected}, got {found}"),
            Self::VariantMismatch { field, option_type } => {
                write!(f, "field `{field}` cannot hold optionType `{option_type}`")
            }
        }
    }
}
