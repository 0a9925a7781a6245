// ── Option values ──
//
// Every leaf of a parcel is wrapped in a three-way tagged union carrying
// provenance: a literal (`global`), a deployment-time device variable
// reference (`variable`), or the schema default (`default`). The
// discriminant travels on the wire as `optionType` and round-trips
// losslessly.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Pattern a device-variable reference must match: `{{path/like_name}}`.
static VARIABLE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{\{[./\[\]a-zA-Z0-9_-]+\}\}$").expect("hard-coded pattern compiles")
});

/// Maximum length of a variable reference, braces included.
const VARIABLE_NAME_MAX: usize = 64;

// ── Discriminant ────────────────────────────────────────────────────

/// The provenance tag of an [`OptionValue`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Global,
    Variable,
    Default,
}

// ── Tagged value union ──────────────────────────────────────────────

/// A configuration value with provenance.
///
/// Exactly one variant is active; matching is exhaustive at every
/// consumption site. Serialized form:
///
/// ```json
/// { "optionType": "global",   "value": 60 }
/// { "optionType": "variable", "value": "{{omp/holdtime}}" }
/// { "optionType": "default",  "value": 4 }
/// { "optionType": "default" }
/// ```
///
/// The valueless `default` form is a marker: the field intentionally has
/// no literal, and the schema decides whether that is legal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "optionType", rename_all = "lowercase")]
pub enum OptionValue<T> {
    Global {
        value: T,
    },
    Variable {
        #[serde(rename = "value")]
        name: String,
    },
    Default {
        #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
        value: Option<T>,
    },
}

impl<T> OptionValue<T> {
    pub fn option_type(&self) -> OptionType {
        match self {
            Self::Global { .. } => OptionType::Global,
            Self::Variable { .. } => OptionType::Variable,
            Self::Default { .. } => OptionType::Default,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global { .. })
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable { .. })
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default { .. })
    }

    /// `true` for the valueless `default` marker form.
    pub fn is_marker(&self) -> bool {
        matches!(self, Self::Default { value: None })
    }

    /// The concrete literal, if one exists.
    ///
    /// `Global` and valued `Default` carry a literal; `Variable` and the
    /// marker form do not -- constraints that need a literal must treat
    /// those as explicitly not-applicable, never as silently passing.
    pub fn literal(&self) -> Option<&T> {
        match self {
            Self::Global { value } => Some(value),
            Self::Default { value } => value.as_ref(),
            Self::Variable { .. } => None,
        }
    }

    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Self::Variable { name } => Some(name),
            _ => None,
        }
    }
}

/// Wrap a literal known at authoring time.
pub fn as_global<T>(value: T) -> OptionValue<T> {
    OptionValue::Global { value }
}

/// Wrap a device-variable reference; the name must match the
/// `{{path/like_name}}` pattern and be at most 64 characters.
pub fn as_variable<T>(name: &str) -> Result<OptionValue<T>, ModelError> {
    check_variable_name(name)?;
    Ok(OptionValue::Variable {
        name: name.to_owned(),
    })
}

/// Wrap a schema default that carries a literal.
pub fn as_default<T>(value: T) -> OptionValue<T> {
    OptionValue::Default { value: Some(value) }
}

/// Wrap a valueless schema default (marker form).
pub fn as_default_marker<T>() -> OptionValue<T> {
    OptionValue::Default { value: None }
}

/// Validate a variable reference name against the pattern and length cap.
pub(crate) fn check_variable_name(name: &str) -> Result<(), ModelError> {
    if name.is_empty() || name.len() > VARIABLE_NAME_MAX || !VARIABLE_NAME.is_match(name) {
        return Err(ModelError::Format {
            field: "variable".into(),
            reason: format!("`{name}` is not a valid device variable reference"),
        });
    }
    Ok(())
}

// ── Scalar payloads ─────────────────────────────────────────────────

/// Dynamic scalar payload used by the table-driven parcel machinery.
///
/// Typed schemas pin the kind per field; this enum is the runtime
/// representation a legacy value or wire payload lands in before the
/// field's declared kind is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl ScalarValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::Text(_) => "string",
        }
    }

    /// Numeric view; `Integer` widens to `f64` for bound checks.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
            Self::Integer(i) => Some(*i as f64),
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Lift a JSON scalar into a typed payload. Objects, arrays, and
    /// nulls have no scalar form.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Number)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Integer(i) => serde_json::Value::Number((*i).into()),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for ScalarValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn global_serializes_with_discriminant() {
        let value: OptionValue<ScalarValue> = as_global(ScalarValue::Integer(60));
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({ "optionType": "global", "value": 60 })
        );
    }

    #[test]
    fn variable_round_trips_without_reinterpretation() {
        let value: OptionValue<ScalarValue> = as_variable("{{omp/holdtime}}").unwrap();
        let encoded = serde_json::to_value(&value).unwrap();
        assert_eq!(
            encoded,
            json!({ "optionType": "variable", "value": "{{omp/holdtime}}" })
        );

        let decoded: OptionValue<ScalarValue> = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded.variable_name(), Some("{{omp/holdtime}}"));
        assert_eq!(decoded, value);
    }

    #[test]
    fn marker_default_omits_value_key() {
        let value: OptionValue<ScalarValue> = as_default_marker();
        let encoded = serde_json::to_value(&value).unwrap();
        assert_eq!(encoded, json!({ "optionType": "default" }));

        let decoded: OptionValue<ScalarValue> = serde_json::from_value(encoded).unwrap();
        assert!(decoded.is_marker());
    }

    #[test]
    fn valued_default_carries_literal() {
        let value: OptionValue<ScalarValue> = as_default(ScalarValue::Number(4.0));
        assert_eq!(value.literal(), Some(&ScalarValue::Number(4.0)));
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({ "optionType": "default", "value": 4.0 })
        );
    }

    #[test]
    fn variable_literal_is_none() {
        let value: OptionValue<ScalarValue> = as_variable("{{x}}").unwrap();
        assert_eq!(value.literal(), None);
    }

    #[test]
    fn malformed_variable_names_are_rejected() {
        for bad in ["holdtime", "{{}}", "{{spaced name}}", "{{", "{{a}}}"] {
            assert!(
                as_variable::<ScalarValue>(bad).is_err(),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn variable_name_length_cap() {
        // 60 inner chars + 4 braces = 64 total: accepted.
        let longest = format!("{{{{{}}}}}", "a".repeat(60));
        assert!(as_variable::<ScalarValue>(&longest).is_ok());

        let too_long = format!("{{{{{}}}}}", "a".repeat(61));
        assert!(as_variable::<ScalarValue>(&too_long).is_err());
    }

    #[test]
    fn deserialization_dispatches_on_option_type() {
        let decoded: OptionValue<ScalarValue> =
            serde_json::from_value(json!({ "optionType": "default", "value": 4 })).unwrap();
        assert_eq!(decoded.option_type(), OptionType::Default);
        assert_eq!(decoded.literal(), Some(&ScalarValue::Integer(4)));

        assert!(
            serde_json::from_value::<OptionValue<ScalarValue>>(
                json!({ "optionType": "computed", "value": 4 })
            )
            .is_err()
        );
    }

    #[test]
    fn scalar_json_round_trip() {
        for scalar in [
            ScalarValue::Bool(true),
            ScalarValue::Integer(-3),
            ScalarValue::Number(1.5),
            ScalarValue::Text("mpls".into()),
        ] {
            assert_eq!(ScalarValue::from_json(&scalar.to_json()), Some(scalar));
        }
    }
}
