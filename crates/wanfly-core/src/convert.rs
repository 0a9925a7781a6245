// ── Legacy template to parcel conversion ──
//
// Bridges legacy feature-template value maps into schema-checked parcels.
// Conversion is a single pass over the target schema's field table: each
// field resolves its legacy source (direct key, dash-separated variant,
// or nested data path), then the raw value is parsed, coerced, and
// wrapped. Converters never invent values -- a missing required field is
// an error, and nothing partial ever escapes.

use std::str::FromStr;

use indexmap::IndexMap;
use tracing::{debug, warn};

use wanfly_api::{TemplateValue, TemplateValues, WrappedValue};

use crate::error::{ModelError, SchemaViolation};
use crate::model::catalog::{RoutingProtocol, omp};
use crate::model::parcel::{FieldSlot, Parcel};
use crate::model::schema::{DefaultPolicy, FieldDescriptor, Schema, ValueKind};
use crate::model::value::{OptionValue, ScalarValue, as_default_marker, as_global, as_variable};

type ConvertFn = fn(&str, &str, Option<&str>, &TemplateValues) -> Result<Parcel, ModelError>;

/// Registry of converters, keyed by the legacy template types each one
/// accepts.
const CONVERTERS: &[(&[&str], ConvertFn)] =
    &[(&["cisco_omp", "omp-vedge", "omp-vsmart"], convert_omp)];

/// Converts legacy feature templates into parcels.
pub struct TemplateConverter;

impl TemplateConverter {
    /// Whether a converter exists for this legacy template type.
    pub fn supports(template_type: &str) -> bool {
        CONVERTERS
            .iter()
            .any(|(types, _)| types.contains(&template_type))
    }

    /// Convert one legacy template value map into a parcel.
    ///
    /// Either a fully valid parcel is returned, or a single
    /// [`ModelError::Conversion`] naming the first offending field.
    pub fn convert(
        template_type: &str,
        name: &str,
        description: Option<&str>,
        values: &TemplateValues,
    ) -> Result<Parcel, ModelError> {
        let Some((_, convert)) = CONVERTERS
            .iter()
            .find(|(types, _)| types.contains(&template_type))
        else {
            return Err(conversion_error(
                template_type,
                "templateType",
                ModelError::Format {
                    field: "templateType".into(),
                    reason: format!("no converter for template type `{template_type}`"),
                },
            ));
        };
        convert(template_type, name, description, values)
    }
}

fn conversion_error(template_type: &str, field: &str, source: ModelError) -> ModelError {
    ModelError::Conversion {
        template_type: template_type.to_owned(),
        field: field.to_owned(),
        source: Box::new(source),
    }
}

// ── Generic field machinery ─────────────────────────────────────────

/// Resolve a field's legacy source value. Tries the field name, its
/// dash-separated form, then the declared data path; a missing
/// intermediate map means absent.
fn resolve<'a>(values: &'a TemplateValues, d: &FieldDescriptor) -> Option<&'a TemplateValue> {
    if let Some(value) = values.get(d.name) {
        return Some(value);
    }
    let dashed = d.name.replace('_', "-");
    if dashed != d.name {
        if let Some(value) = values.get(&dashed) {
            return Some(value);
        }
    }
    if d.data_path.is_empty() {
        return None;
    }
    values
        .get_path(d.data_path, d.name)
        .or_else(|| values.get_path(d.data_path, &dashed))
}

/// Convert every scalar field of `schema` from the legacy map.
///
/// Composite fields (records, bool-maps) are left to the per-template
/// transform; declared defaults are filled later by `Parcel::build`.
fn convert_scalar_fields(
    template_type: &str,
    schema: &'static Schema,
    values: &TemplateValues,
) -> Result<IndexMap<&'static str, FieldSlot>, ModelError> {
    let mut fields = IndexMap::new();
    for d in schema.fields {
        if !d.kind.is_scalar() {
            continue;
        }
        match resolve(values, d) {
            Some(raw) => {
                fields.insert(d.name, FieldSlot::Value(wrap_raw(template_type, d, raw)?));
            }
            None => {
                if matches!(d.policy, DefaultPolicy::Required) {
                    return Err(conversion_error(
                        template_type,
                        d.name,
                        ModelError::Schema {
                            parcel_type: schema.parcel_type.to_owned(),
                            violation: SchemaViolation::MissingRequired {
                                field: d.name.to_owned(),
                            },
                        },
                    ));
                }
            }
        }
    }
    Ok(fields)
}

/// Wrap one raw legacy value as an option value of the declared kind.
fn wrap_raw(
    template_type: &str,
    d: &FieldDescriptor,
    raw: &TemplateValue,
) -> Result<OptionValue<ScalarValue>, ModelError> {
    let scalar = match raw {
        TemplateValue::Wrapped(wrapped) => return rewrap(template_type, d, wrapped),
        TemplateValue::Bool(b) => ScalarValue::Bool(*b),
        TemplateValue::Integer(i) => ScalarValue::Integer(*i),
        TemplateValue::Number(n) => ScalarValue::Number(*n),
        TemplateValue::Text(s) => parse_text(template_type, d, s)?,
        TemplateValue::Records(_) | TemplateValue::Nested(_) => {
            return Err(conversion_error(
                template_type,
                d.name,
                ModelError::Format {
                    field: d.name.to_owned(),
                    reason: "expected a scalar legacy value".into(),
                },
            ));
        }
    };
    coerce_field(template_type, d, scalar).map(as_global)
}

/// Legacy maps carry most scalars as strings ("60", "true"); parse them
/// into the declared kind.
fn parse_text(
    template_type: &str,
    d: &FieldDescriptor,
    s: &str,
) -> Result<ScalarValue, ModelError> {
    let parsed = match d.kind {
        ValueKind::Integer => s.trim().parse::<i64>().ok().map(ScalarValue::Integer),
        ValueKind::Number => s.trim().parse::<f64>().ok().map(ScalarValue::Number),
        ValueKind::Bool => match s.trim() {
            "true" => Some(ScalarValue::Bool(true)),
            "false" => Some(ScalarValue::Bool(false)),
            _ => None,
        },
        _ => Some(ScalarValue::Text(s.to_owned())),
    };
    parsed.ok_or_else(|| {
        conversion_error(
            template_type,
            d.name,
            ModelError::Format {
                field: d.name.to_owned(),
                reason: format!("cannot parse `{s}` as {}", d.kind.name()),
            },
        )
    })
}

fn coerce_field(
    template_type: &str,
    d: &FieldDescriptor,
    scalar: ScalarValue,
) -> Result<ScalarValue, ModelError> {
    let before = scalar.kind_name();
    let coerced = d.kind.coerce(scalar).map_err(|reason| {
        conversion_error(
            template_type,
            d.name,
            ModelError::Format {
                field: d.name.to_owned(),
                reason,
            },
        )
    })?;
    if coerced.kind_name() != before {
        warn!(
            field = d.name,
            legacy_kind = before,
            declared_kind = coerced.kind_name(),
            "coerced legacy payload across numeric kinds"
        );
    }
    Ok(coerced)
}

/// Re-wrap a value the legacy map already carries in `optionType` form,
/// preserving its variant and coercing the payload to the declared kind.
fn rewrap(
    template_type: &str,
    d: &FieldDescriptor,
    wrapped: &WrappedValue,
) -> Result<OptionValue<ScalarValue>, ModelError> {
    let payload = |value: &serde_json::Value| -> Result<ScalarValue, ModelError> {
        let Some(scalar) = ScalarValue::from_json(value) else {
            return Err(conversion_error(
                template_type,
                d.name,
                ModelError::Format {
                    field: d.name.to_owned(),
                    reason: "pre-wrapped payload is not a scalar".into(),
                },
            ));
        };
        coerce_field(template_type, d, scalar)
    };

    match wrapped.option_type.as_str() {
        "global" => match &wrapped.value {
            Some(value) => Ok(as_global(payload(value)?)),
            None => Err(conversion_error(
                template_type,
                d.name,
                ModelError::Format {
                    field: d.name.to_owned(),
                    reason: "pre-wrapped global value has no payload".into(),
                },
            )),
        },
        "default" => match &wrapped.value {
            None | Some(serde_json::Value::Null) => Ok(as_default_marker()),
            Some(value) => Ok(OptionValue::Default {
                value: Some(payload(value)?),
            }),
        },
        "variable" => match &wrapped.value {
            Some(serde_json::Value::String(name)) => {
                as_variable(name).map_err(|_| {
                    conversion_error(
                        template_type,
                        d.name,
                        ModelError::Format {
                            field: d.name.to_owned(),
                            reason: format!("`{name}` is not a valid device variable reference"),
                        },
                    )
                })
            }
            _ => Err(conversion_error(
                template_type,
                d.name,
                ModelError::Format {
                    field: d.name.to_owned(),
                    reason: "variable reference must be a string".into(),
                },
            )),
        },
        other => Err(conversion_error(
            template_type,
            d.name,
            ModelError::Format {
                field: d.name.to_owned(),
                reason: format!("unknown optionType `{other}` in legacy value"),
            },
        )),
    }
}

// ── OMP ─────────────────────────────────────────────────────────────

fn convert_omp(
    template_type: &str,
    name: &str,
    description: Option<&str>,
    values: &TemplateValues,
) -> Result<Parcel, ModelError> {
    let mut fields = convert_scalar_fields(template_type, &omp::OMP, values)?;

    // Derived advertise maps: one `global true` per protocol named in the
    // legacy list. Protocols not present get no entry at all -- absence is
    // the off state, never an explicit `false`.
    if let Some(flags) = advertise_flags(template_type, "advertise", values)? {
        fields.insert("advertise_ipv4", FieldSlot::BoolMap(flags));
    }
    if let Some(flags) = advertise_flags(template_type, "ipv6_advertise", values)? {
        fields.insert("advertise_ipv6", FieldSlot::BoolMap(flags));
    }

    let parcel = Parcel::build(&omp::OMP, name, description.map(ToOwned::to_owned), fields)
        .map_err(|err| {
            let field = err.field().unwrap_or(omp::OMP.parcel_type).to_owned();
            conversion_error(template_type, &field, err)
        })?;
    debug!(
        template_type,
        parcel_type = parcel.parcel_type(),
        "converted feature template"
    );
    Ok(parcel)
}

fn advertise_flags(
    template_type: &str,
    key: &str,
    values: &TemplateValues,
) -> Result<Option<IndexMap<String, OptionValue<ScalarValue>>>, ModelError> {
    let dashed = key.replace('_', "-");
    let Some(raw) = values.get(key).or_else(|| values.get(&dashed)) else {
        return Ok(None);
    };
    let TemplateValue::Records(records) = raw else {
        return Err(conversion_error(
            template_type,
            key,
            ModelError::Format {
                field: key.to_owned(),
                reason: "expected a list of advertise records".into(),
            },
        ));
    };
    let mut flags = IndexMap::new();
    for record in records {
        let Some(TemplateValue::Text(protocol)) = record.get("protocol") else {
            return Err(conversion_error(
                template_type,
                key,
                ModelError::Format {
                    field: key.to_owned(),
                    reason: "advertise record missing `protocol`".into(),
                },
            ));
        };
        if RoutingProtocol::from_str(protocol).is_err() {
            return Err(conversion_error(
                template_type,
                key,
                ModelError::Format {
                    field: key.to_owned(),
                    reason: format!("unknown routing protocol `{protocol}`"),
                },
            ));
        }
        flags.insert(protocol.clone(), as_global(ScalarValue::Bool(true)));
    }
    Ok(Some(flags))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn template(values: serde_json::Value) -> TemplateValues {
        serde_json::from_value(values).unwrap()
    }

    /// Minimal schema with a genuinely required field, for exercising the
    /// generic machinery without a catalogue counterpart.
    static LOOPBACK: Schema = Schema {
        parcel_type: "loopback-interface",
        fields: &[
            FieldDescriptor {
                name: "interface_name",
                wire_name: "interfaceName",
                data_path: &[],
                kind: ValueKind::Text,
                policy: DefaultPolicy::Required,
                rules: &[],
            },
            FieldDescriptor {
                name: "shutdown",
                wire_name: "shutdown",
                data_path: &[],
                kind: ValueKind::Bool,
                policy: DefaultPolicy::Marker,
                rules: &[],
            },
        ],
        rules: &[],
    };

    #[test]
    fn unsupported_template_type_is_a_conversion_error() {
        let err =
            TemplateConverter::convert("cisco_banner", "b", None, &TemplateValues::new()).unwrap_err();
        assert!(matches!(err, ModelError::Conversion { .. }));
        assert!(!TemplateConverter::supports("cisco_banner"));
        assert!(TemplateConverter::supports("omp-vsmart"));
    }

    #[test]
    fn missing_required_field_names_the_field() {
        let err = convert_scalar_fields("cisco_loopback", &LOOPBACK, &TemplateValues::new())
            .unwrap_err();
        let ModelError::Conversion { field, source, .. } = err else {
            panic!("expected a conversion error");
        };
        assert_eq!(field, "interface_name");
        assert!(matches!(
            *source,
            ModelError::Schema {
                violation: SchemaViolation::MissingRequired { .. },
                ..
            }
        ));
    }

    #[test]
    fn string_literals_parse_into_declared_kinds() {
        let values = template(json!({
            "holdtime": "60",
            "graceful-restart": "true"
        }));
        let parcel = TemplateConverter::convert("cisco_omp", "edge-omp", None, &values).unwrap();

        let Some(FieldSlot::Value(holdtime)) = parcel.get("holdtime") else {
            panic!("holdtime should be set");
        };
        assert_eq!(holdtime.literal(), Some(&ScalarValue::Integer(60)));
        assert!(holdtime.is_global());

        let Some(FieldSlot::Value(gr)) = parcel.get("graceful_restart") else {
            panic!("graceful_restart should be set");
        };
        assert_eq!(gr.literal(), Some(&ScalarValue::Bool(true)));
    }

    #[test]
    fn nested_data_path_lookup() {
        // Some legacy exports group the timer fields already.
        let values = template(json!({
            "timers": { "holdtime": "90" }
        }));
        let parcel = TemplateConverter::convert("omp-vedge", "edge-omp", None, &values).unwrap();
        let Some(FieldSlot::Value(holdtime)) = parcel.get("holdtime") else {
            panic!("holdtime should be set");
        };
        assert_eq!(holdtime.literal(), Some(&ScalarValue::Integer(90)));
    }

    #[test]
    fn prewrapped_default_keeps_variant_and_coerces_payload() {
        // Integer payload fed into a number field: coerced, still a default.
        let values = template(json!({
            "ecmp_limit": { "optionType": "default", "value": 4 }
        }));
        let parcel = TemplateConverter::convert("cisco_omp", "edge-omp", None, &values).unwrap();
        let Some(FieldSlot::Value(ecmp)) = parcel.get("ecmp_limit") else {
            panic!("ecmp_limit should be set");
        };
        assert!(ecmp.is_default());
        assert_eq!(ecmp.literal(), Some(&ScalarValue::Number(4.0)));
    }

    #[test]
    fn prewrapped_variable_survives_conversion() {
        let values = template(json!({
            "holdtime": { "optionType": "variable", "value": "{{omp/holdtime}}" }
        }));
        let parcel = TemplateConverter::convert("cisco_omp", "edge-omp", None, &values).unwrap();
        let Some(FieldSlot::Value(holdtime)) = parcel.get("holdtime") else {
            panic!("holdtime should be set");
        };
        assert_eq!(holdtime.variable_name(), Some("{{omp/holdtime}}"));
    }

    #[test]
    fn advertise_synthesis_is_implicitly_false() {
        let values = template(json!({
            "advertise": [ { "protocol": "bgp" } ]
        }));
        let parcel = TemplateConverter::convert("cisco_omp", "edge-omp", None, &values).unwrap();

        let Some(FieldSlot::BoolMap(flags)) = parcel.get("advertise_ipv4") else {
            panic!("advertise_ipv4 should be synthesized");
        };
        assert_eq!(flags.len(), 1);
        assert_eq!(
            flags.get("bgp").and_then(OptionValue::literal),
            Some(&ScalarValue::Bool(true))
        );
        // Absent protocols have no entry -- not a `false` one.
        assert!(!flags.contains_key("connected"));
        assert!(!flags.contains_key("static"));
        assert!(!flags.contains_key("ospf"));

        // No IPv6 list in the template, no IPv6 map on the parcel.
        assert!(parcel.get("advertise_ipv6").is_none());
    }

    #[test]
    fn unknown_advertise_protocol_fails_conversion() {
        let values = template(json!({
            "advertise": [ { "protocol": "rip" } ]
        }));
        assert!(TemplateConverter::convert("cisco_omp", "edge-omp", None, &values).is_err());
    }

    #[test]
    fn unparseable_scalar_fails_conversion() {
        let values = template(json!({ "holdtime": "soon" }));
        let err =
            TemplateConverter::convert("cisco_omp", "edge-omp", None, &values).unwrap_err();
        let ModelError::Conversion { field, .. } = err else {
            panic!("expected a conversion error");
        };
        assert_eq!(field, "holdtime");
    }

    #[test]
    fn out_of_range_legacy_value_fails_through_build() {
        let values = template(json!({ "send-path-limit": "17" }));
        let err =
            TemplateConverter::convert("cisco_omp", "edge-omp", None, &values).unwrap_err();
        let ModelError::Conversion { field, source, .. } = err else {
            panic!("expected a conversion error");
        };
        assert_eq!(field, "send_path_limit");
        assert!(matches!(*source, ModelError::Range { .. }));
    }
}
