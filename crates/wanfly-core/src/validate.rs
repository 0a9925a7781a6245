// ── Constraint validators ──
//
// Pure, deterministic rule functions shared by parcel construction,
// wire deserialization, and the mutation helpers. Every function is safe
// to re-run after any change; none mutates its input or "fixes" a value.

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::ModelError;
use crate::model::value::{OptionValue, ScalarValue};

/// Result of a range check.
///
/// Bounds are only checkable against a literal. A `variable` value or a
/// valueless default is reported as [`NotApplicable`](Self::NotApplicable)
/// rather than folded into a pass/fail boolean, so every caller decides
/// the non-literal case explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// A literal was present and lies within the bounds.
    Checked,
    /// No literal exists to check (variable reference or marker default).
    NotApplicable,
}

/// Check a numeric literal against `[min, max]`.
pub fn range(
    field: &str,
    value: &OptionValue<ScalarValue>,
    min: f64,
    max: f64,
) -> Result<RangeOutcome, ModelError> {
    let Some(literal) = value.literal() else {
        return Ok(RangeOutcome::NotApplicable);
    };
    let Some(actual) = literal.as_f64() else {
        return Err(ModelError::Format {
            field: field.to_owned(),
            reason: format!(
                "range constraint applies to numeric values, got {}",
                literal.kind_name()
            ),
        });
    };
    if !actual.is_finite() || actual < min || actual > max {
        return Err(ModelError::Range {
            field: field.to_owned(),
            min,
            max,
            actual,
        });
    }
    Ok(RangeOutcome::Checked)
}

/// Check a string literal against a pattern. Variables and marker
/// defaults carry no literal and pass; a non-string literal fails.
pub fn pattern(
    field: &str,
    value: &OptionValue<ScalarValue>,
    re: &Regex,
) -> Result<(), ModelError> {
    let Some(literal) = value.literal() else {
        return Ok(());
    };
    match literal {
        ScalarValue::Text(s) if re.is_match(s) => Ok(()),
        ScalarValue::Text(s) => Err(ModelError::Format {
            field: field.to_owned(),
            reason: format!("`{s}` does not match `{}`", re.as_str()),
        }),
        other => Err(ModelError::Format {
            field: field.to_owned(),
            reason: format!(
                "pattern constraint applies to strings, got {}",
                other.kind_name()
            ),
        }),
    }
}

/// At most one of `fields` may be populated; when `required`, exactly one.
pub fn exactly_one_of(
    fields: &[&str],
    populated: &[&str],
    required: bool,
) -> Result<(), ModelError> {
    let hits: Vec<String> = fields
        .iter()
        .filter(|f| populated.contains(*f))
        .map(|f| (*f).to_owned())
        .collect();
    if hits.len() > 1 || (required && hits.is_empty()) {
        return Err(ModelError::Exclusivity {
            fields: fields.iter().map(|f| (*f).to_owned()).collect(),
            populated: hits,
            required,
        });
    }
    Ok(())
}

/// At least one of `fields` must be populated.
pub fn require_any(owner: &str, fields: &[&str], populated: &[&str]) -> Result<(), ModelError> {
    if fields.iter().any(|f| populated.contains(f)) {
        return Ok(());
    }
    Err(ModelError::Format {
        field: owner.to_owned(),
        reason: format!("at least one of {fields:?} must be set"),
    })
}

/// `field` may only be populated when `requires` also is.
pub fn prerequisite(field: &str, requires: &str, populated: &[&str]) -> Result<(), ModelError> {
    if populated.contains(&field) && !populated.contains(&requires) {
        return Err(ModelError::Format {
            field: field.to_owned(),
            reason: format!("cannot be set without {requires}"),
        });
    }
    Ok(())
}

/// The declared priority order must exactly match the populated
/// magnitude fields, and at least one magnitude must be present.
pub fn criteria_consistency(
    field: &str,
    declared: &[&str],
    populated: &[&str],
) -> Result<(), ModelError> {
    let declared_set: BTreeSet<&str> = declared.iter().copied().collect();
    let populated_set: BTreeSet<&str> = populated.iter().copied().collect();
    if populated_set.is_empty() {
        return Err(ModelError::Format {
            field: field.to_owned(),
            reason: "at least one variance must be set".into(),
        });
    }
    if declared_set != populated_set {
        return Err(ModelError::Format {
            field: field.to_owned(),
            reason: format!(
                "criteria priority {declared_set:?} must exactly match populated variances {populated_set:?}"
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::value::{as_default, as_default_marker, as_global, as_variable};

    #[test]
    fn range_accepts_literal_within_bounds() {
        let value = as_global(ScalarValue::Integer(8));
        assert_eq!(
            range("rate", &value, 8.0, 100_000_000_000.0).unwrap(),
            RangeOutcome::Checked
        );
    }

    #[test]
    fn range_rejects_literal_outside_bounds() {
        let value = as_global(ScalarValue::Integer(7));
        let err = range("rate", &value, 8.0, 100_000_000_000.0).unwrap_err();
        assert_eq!(
            err,
            ModelError::Range {
                field: "rate".into(),
                min: 8.0,
                max: 100_000_000_000.0,
                actual: 7.0,
            }
        );
    }

    #[test]
    fn range_checks_valued_defaults() {
        let value = as_default(ScalarValue::Integer(70_000));
        assert!(range("burst", &value, 15_000.0, 10_000_000.0).is_ok());
        let value = as_default(ScalarValue::Integer(10));
        assert!(range("burst", &value, 15_000.0, 10_000_000.0).is_err());
    }

    #[test]
    fn range_is_not_applicable_to_variables_and_markers() {
        let variable = as_variable::<ScalarValue>("{{rate}}").unwrap();
        assert_eq!(
            range("rate", &variable, 8.0, 100.0).unwrap(),
            RangeOutcome::NotApplicable
        );

        let marker = as_default_marker::<ScalarValue>();
        assert_eq!(
            range("rate", &marker, 8.0, 100.0).unwrap(),
            RangeOutcome::NotApplicable
        );
    }

    #[test]
    fn range_rejects_non_numeric_literal() {
        let value = as_global(ScalarValue::Text("fast".into()));
        assert!(matches!(
            range("rate", &value, 0.0, 10.0),
            Err(ModelError::Format { .. })
        ));
    }

    #[test]
    fn pattern_matches_and_rejects() {
        let re = Regex::new(r"^[a-z]{2,}[0-9/.]*$").unwrap();
        assert!(pattern("interface", &as_global(ScalarValue::Text("ge0/0".into())), &re).is_ok());
        assert!(pattern("interface", &as_global(ScalarValue::Text("0bad".into())), &re).is_err());
        // Nothing to check on a variable reference.
        let variable = as_variable::<ScalarValue>("{{ifname}}").unwrap();
        assert!(pattern("interface", &variable, &re).is_ok());
    }

    #[test]
    fn exactly_one_of_enforces_cardinality() {
        let fields = ["vpn", "interface"];
        assert!(exactly_one_of(&fields, &["vpn"], true).is_ok());
        assert!(exactly_one_of(&fields, &["vpn", "interface"], true).is_err());
        assert!(exactly_one_of(&fields, &[], true).is_err());
        // At-most-one mode tolerates the empty case.
        assert!(exactly_one_of(&fields, &[], false).is_ok());
    }

    #[test]
    fn require_any_needs_one_populated() {
        let fields = ["latency", "loss", "jitter"];
        assert!(require_any("sla-class-entry", &fields, &["loss"]).is_ok());
        assert!(require_any("sla-class-entry", &fields, &[]).is_err());
    }

    #[test]
    fn prerequisite_orders_optional_fields() {
        assert!(prerequisite("tertiary", "secondary", &["secondary", "tertiary"]).is_ok());
        assert!(prerequisite("tertiary", "secondary", &["tertiary"]).is_err());
        assert!(prerequisite("tertiary", "secondary", &[]).is_ok());
    }

    #[test]
    fn criteria_must_match_populated_exactly() {
        assert!(criteria_consistency("criteria", &["jitter"], &["jitter"]).is_ok());
        assert!(
            criteria_consistency("criteria", &["jitter", "loss"], &["loss", "jitter"]).is_ok()
        );
        assert!(criteria_consistency("criteria", &["jitter"], &["loss"]).is_err());
        assert!(criteria_consistency("criteria", &["jitter", "loss"], &["jitter"]).is_err());
        assert!(criteria_consistency("criteria", &[], &[]).is_err());
    }
}
