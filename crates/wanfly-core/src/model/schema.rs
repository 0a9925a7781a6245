// ── Schema descriptor tables ──
//
// Parcel schemas are static declarative data: one `FieldDescriptor` per
// field (wire name, nesting path, kind, default policy, rules) plus
// schema-level cross-field rules. The generic machinery in `parcel.rs`
// consumes these tables for build, wire projection, and conversion --
// there is no per-schema code beyond the table itself.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::value::ScalarValue;

// ── Field kinds ─────────────────────────────────────────────────────

/// Declared payload kind of one field.
#[derive(Debug, Clone, Copy)]
pub enum ValueKind {
    Bool,
    Integer,
    Number,
    Text,
    /// String constrained to a fixed wire-string set.
    Enumerated(&'static [&'static str]),
    /// Mapping from an allowed key set to boolean option values. Keys not
    /// present are implicitly false -- absence is meaningful and no
    /// `false` entry is ever synthesized.
    BoolMap(&'static [&'static str]),
    /// A single nested record.
    Record(&'static RecordSchema),
    /// An ordered sequence of records.
    RecordList(&'static RecordSchema),
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Text => "string",
            Self::Enumerated(_) => "enum",
            Self::BoolMap(_) => "bool-map",
            Self::Record(_) => "record",
            Self::RecordList(_) => "record-list",
        }
    }

    /// `true` for kinds whose slot is a single option value.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Integer | Self::Number | Self::Text | Self::Enumerated(_)
        )
    }

    /// Strict membership check for an already-normalized payload.
    pub fn check(&self, value: &ScalarValue) -> Result<(), String> {
        match (self, value) {
            (Self::Bool, ScalarValue::Bool(_))
            | (Self::Integer, ScalarValue::Integer(_))
            | (Self::Number, ScalarValue::Number(_))
            | (Self::Text, ScalarValue::Text(_)) => Ok(()),
            (Self::Enumerated(allowed), ScalarValue::Text(s)) => {
                if allowed.contains(&s.as_str()) {
                    Ok(())
                } else {
                    Err(format!("`{s}` is not one of {allowed:?}"))
                }
            }
            (kind, found) => Err(format!("expected {}, got {}", kind.name(), found.kind_name())),
        }
    }

    /// Normalize a payload into this kind, or explain why it cannot be.
    ///
    /// Only numeric cross-wrapping is performed: integers widen into
    /// `Number` fields, and whole-valued floats narrow into `Integer`
    /// fields. Everything else must already be the declared kind.
    pub fn coerce(&self, value: ScalarValue) -> Result<ScalarValue, String> {
        match (self, value) {
            #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
            (Self::Number, ScalarValue::Integer(i)) => Ok(ScalarValue::Number(i as f64)),
            #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
            (Self::Integer, ScalarValue::Number(n))
                if n.fract().abs() < f64::EPSILON && n.abs() <= 9_007_199_254_740_992.0 =>
            {
                Ok(ScalarValue::Integer(n as i64))
            }
            (kind, value) => {
                kind.check(&value)?;
                Ok(value)
            }
        }
    }
}

// ── Default policy ──────────────────────────────────────────────────

/// Const-constructible scalar used in schema tables.
#[derive(Debug, Clone, Copy)]
pub enum ConstScalar {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(&'static str),
}

impl ConstScalar {
    pub fn to_scalar(self) -> ScalarValue {
        match self {
            Self::Bool(b) => ScalarValue::Bool(b),
            Self::Integer(i) => ScalarValue::Integer(i),
            Self::Number(n) => ScalarValue::Number(n),
            Self::Text(s) => ScalarValue::Text(s.to_owned()),
        }
    }
}

/// What happens when a field is absent at construction or conversion.
#[derive(Debug, Clone, Copy)]
pub enum DefaultPolicy {
    /// Absence is an error.
    Required,
    /// Absence is fine; nothing is emitted.
    Optional,
    /// Absence produces a valued `default` option value.
    Literal(ConstScalar),
    /// Absence produces the valueless `default` marker; this is also the
    /// only policy under which a marker is a legal explicit value.
    Marker,
}

// ── Rules ───────────────────────────────────────────────────────────

/// Validation rule attached to one field.
#[derive(Debug, Clone, Copy)]
pub enum FieldRule {
    /// Inclusive numeric bounds; not applicable to non-literals.
    Range { min: f64, max: f64 },
    /// Regex the string literal must match.
    Pattern(&'static LazyLock<Regex>),
}

/// Cross-field rule attached to a schema.
#[derive(Debug, Clone, Copy)]
pub enum SchemaRule {
    /// At most one of `fields` populated; exactly one when `required`.
    ExactlyOneOf {
        fields: &'static [&'static str],
        required: bool,
    },
    /// At least one of `fields` populated.
    RequireAny { fields: &'static [&'static str] },
    /// `field` populated only when `requires` is.
    Prerequisite {
        field: &'static str,
        requires: &'static str,
    },
    /// The hyphen-joined token list in `order_field` must exactly match
    /// the populated magnitude fields. `magnitudes` maps field name to
    /// its token in the order list.
    CriteriaPriority {
        order_field: &'static str,
        magnitudes: &'static [(&'static str, &'static str)],
    },
}

// ── Tables ──────────────────────────────────────────────────────────

/// Declaration of one field: identity, wire shape, kind, and rules.
///
/// `name` is the in-memory field name and doubles as the legacy template
/// lookup key (the converter also tries its dash-separated form).
/// `data_path` is the chain of intermediate wire objects the field is
/// grouped under; an empty path means top level.
#[derive(Debug)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub wire_name: &'static str,
    pub data_path: &'static [&'static str],
    pub kind: ValueKind,
    pub policy: DefaultPolicy,
    pub rules: &'static [FieldRule],
}

/// Schema of a nested record (one entry of a record list, or a single
/// structured sub-object).
#[derive(Debug)]
pub struct RecordSchema {
    pub tag: &'static str,
    pub fields: &'static [FieldDescriptor],
    pub rules: &'static [SchemaRule],
}

impl RecordSchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Schema of a top-level parcel: a stable type tag plus its field table.
#[derive(Debug)]
pub struct Schema {
    pub parcel_type: &'static str,
    pub fields: &'static [FieldDescriptor],
    pub rules: &'static [SchemaRule],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}
