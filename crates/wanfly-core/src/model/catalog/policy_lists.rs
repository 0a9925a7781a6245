// ── Policy-object list schemas ──
//
// Centralized policy building blocks: policers, SLA classes, zone
// membership, app-probe forwarding classes, and preferred color groups.
// Each parcel is a record list under a single `entries` field, matching
// the controller's policy-object wire shape.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use strum::VariantNames;

use super::{ExceedAction, PathPreference, TlocColor};
use crate::error::ModelError;
use crate::model::parcel::{FieldSlot, Record};
use crate::model::schema::{
    ConstScalar, DefaultPolicy, FieldDescriptor, FieldRule, RecordSchema, Schema, SchemaRule,
    ValueKind,
};
use crate::model::value::{ScalarValue, as_global};

/// Interface names as devices report them: `ge0/0`, `eth1`, `Vlan100.10`.
static INTERFACE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]+[0-9]+(/[0-9]+)*(\.[0-9]+)?$").expect("hard-coded pattern compiles")
});

// ── Policer ─────────────────────────────────────────────────────────

pub static POLICER_ENTRY: RecordSchema = RecordSchema {
    tag: "policer-entry",
    fields: &[
        FieldDescriptor {
            name: "burst",
            wire_name: "burst",
            data_path: &[],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Required,
            rules: &[FieldRule::Range {
                min: 15_000.0,
                max: 10_000_000.0,
            }],
        },
        FieldDescriptor {
            name: "exceed",
            wire_name: "exceed",
            data_path: &[],
            kind: ValueKind::Enumerated(ExceedAction::VARIANTS),
            policy: DefaultPolicy::Literal(ConstScalar::Text("drop")),
            rules: &[],
        },
        FieldDescriptor {
            name: "rate",
            wire_name: "rate",
            data_path: &[],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Required,
            rules: &[FieldRule::Range {
                min: 8.0,
                max: 100_000_000_000.0,
            }],
        },
    ],
    rules: &[],
};

pub static POLICER: Schema = Schema {
    parcel_type: "policer",
    fields: &[FieldDescriptor {
        name: "entries",
        wire_name: "entries",
        data_path: &[],
        kind: ValueKind::RecordList(&POLICER_ENTRY),
        policy: DefaultPolicy::Required,
        rules: &[],
    }],
    rules: &[],
};

// ── SLA class ───────────────────────────────────────────────────────

pub static FALLBACK_BEST_TUNNEL: RecordSchema = RecordSchema {
    tag: "fallback-best-tunnel",
    fields: &[
        FieldDescriptor {
            name: "criteria",
            wire_name: "criteria",
            data_path: &[],
            kind: ValueKind::Text,
            policy: DefaultPolicy::Required,
            rules: &[],
        },
        FieldDescriptor {
            name: "jitter_variance",
            wire_name: "jitterVariance",
            data_path: &[],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Optional,
            rules: &[FieldRule::Range {
                min: 1.0,
                max: 1000.0,
            }],
        },
        FieldDescriptor {
            name: "latency_variance",
            wire_name: "latencyVariance",
            data_path: &[],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Optional,
            rules: &[FieldRule::Range {
                min: 1.0,
                max: 1000.0,
            }],
        },
        FieldDescriptor {
            name: "loss_variance",
            wire_name: "lossVariance",
            data_path: &[],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Optional,
            rules: &[FieldRule::Range {
                min: 0.0,
                max: 100.0,
            }],
        },
    ],
    rules: &[SchemaRule::CriteriaPriority {
        order_field: "criteria",
        magnitudes: &[
            ("jitter_variance", "jitter"),
            ("latency_variance", "latency"),
            ("loss_variance", "loss"),
        ],
    }],
};

pub static SLA_CLASS_ENTRY: RecordSchema = RecordSchema {
    tag: "sla-class-entry",
    fields: &[
        FieldDescriptor {
            name: "latency",
            wire_name: "latency",
            data_path: &[],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Optional,
            rules: &[FieldRule::Range {
                min: 1.0,
                max: 1000.0,
            }],
        },
        FieldDescriptor {
            name: "loss",
            wire_name: "loss",
            data_path: &[],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Optional,
            rules: &[FieldRule::Range {
                min: 0.0,
                max: 100.0,
            }],
        },
        FieldDescriptor {
            name: "jitter",
            wire_name: "jitter",
            data_path: &[],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Optional,
            rules: &[FieldRule::Range {
                min: 1.0,
                max: 1000.0,
            }],
        },
        FieldDescriptor {
            name: "app_probe_class",
            wire_name: "appProbeClass",
            data_path: &[],
            kind: ValueKind::Text,
            policy: DefaultPolicy::Optional,
            rules: &[],
        },
        FieldDescriptor {
            name: "fallback_best_tunnel",
            wire_name: "fallbackBestTunnel",
            data_path: &[],
            kind: ValueKind::Record(&FALLBACK_BEST_TUNNEL),
            policy: DefaultPolicy::Optional,
            rules: &[],
        },
    ],
    rules: &[SchemaRule::RequireAny {
        fields: &["latency", "loss", "jitter"],
    }],
};

pub static SLA_CLASS: Schema = Schema {
    parcel_type: "sla-class",
    fields: &[FieldDescriptor {
        name: "entries",
        wire_name: "entries",
        data_path: &[],
        kind: ValueKind::RecordList(&SLA_CLASS_ENTRY),
        policy: DefaultPolicy::Required,
        rules: &[],
    }],
    rules: &[],
};

// ── Zone ────────────────────────────────────────────────────────────

pub static ZONE_ENTRY: RecordSchema = RecordSchema {
    tag: "zone-entry",
    fields: &[
        FieldDescriptor {
            name: "vpn",
            wire_name: "vpn",
            data_path: &[],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Optional,
            rules: &[FieldRule::Range {
                min: 0.0,
                max: 65530.0,
            }],
        },
        FieldDescriptor {
            name: "interface",
            wire_name: "interface",
            data_path: &[],
            kind: ValueKind::Text,
            policy: DefaultPolicy::Optional,
            rules: &[FieldRule::Pattern(&INTERFACE_NAME)],
        },
    ],
    rules: &[SchemaRule::ExactlyOneOf {
        fields: &["vpn", "interface"],
        required: true,
    }],
};

pub static ZONE: Schema = Schema {
    parcel_type: "zone",
    fields: &[FieldDescriptor {
        name: "entries",
        wire_name: "entries",
        data_path: &[],
        kind: ValueKind::RecordList(&ZONE_ENTRY),
        policy: DefaultPolicy::Required,
        rules: &[],
    }],
    rules: &[],
};

// ── App-probe class ─────────────────────────────────────────────────

pub static COLOR_DSCP_ENTRY: RecordSchema = RecordSchema {
    tag: "color-dscp-entry",
    fields: &[
        FieldDescriptor {
            name: "color",
            wire_name: "color",
            data_path: &[],
            kind: ValueKind::Enumerated(TlocColor::VARIANTS),
            policy: DefaultPolicy::Required,
            rules: &[],
        },
        FieldDescriptor {
            name: "dscp",
            wire_name: "dscp",
            data_path: &[],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Required,
            rules: &[FieldRule::Range {
                min: 0.0,
                max: 63.0,
            }],
        },
    ],
    rules: &[],
};

pub static APP_PROBE_ENTRY: RecordSchema = RecordSchema {
    tag: "app-probe-entry",
    fields: &[
        FieldDescriptor {
            name: "forwarding_class",
            wire_name: "forwardingClass",
            data_path: &[],
            kind: ValueKind::Text,
            policy: DefaultPolicy::Required,
            rules: &[],
        },
        FieldDescriptor {
            name: "map",
            wire_name: "map",
            data_path: &[],
            kind: ValueKind::RecordList(&COLOR_DSCP_ENTRY),
            policy: DefaultPolicy::Optional,
            rules: &[],
        },
    ],
    rules: &[],
};

pub static APP_PROBE: Schema = Schema {
    parcel_type: "app-probe",
    fields: &[FieldDescriptor {
        name: "entries",
        wire_name: "entries",
        data_path: &[],
        kind: ValueKind::RecordList(&APP_PROBE_ENTRY),
        policy: DefaultPolicy::Required,
        rules: &[],
    }],
    rules: &[],
};

// ── Preferred color group ───────────────────────────────────────────

pub static COLOR_PREFERENCE: RecordSchema = RecordSchema {
    tag: "color-preference",
    fields: &[
        FieldDescriptor {
            name: "color_preference",
            wire_name: "colorPreference",
            data_path: &[],
            kind: ValueKind::Text,
            policy: DefaultPolicy::Required,
            rules: &[],
        },
        FieldDescriptor {
            name: "path_preference",
            wire_name: "pathPreference",
            data_path: &[],
            kind: ValueKind::Enumerated(PathPreference::VARIANTS),
            policy: DefaultPolicy::Required,
            rules: &[],
        },
    ],
    rules: &[],
};

pub static PREFERRED_COLOR_GROUP_ENTRY: RecordSchema = RecordSchema {
    tag: "preferred-color-group-entry",
    fields: &[
        FieldDescriptor {
            name: "primary_preference",
            wire_name: "primaryPreference",
            data_path: &[],
            kind: ValueKind::Record(&COLOR_PREFERENCE),
            policy: DefaultPolicy::Required,
            rules: &[],
        },
        FieldDescriptor {
            name: "secondary_preference",
            wire_name: "secondaryPreference",
            data_path: &[],
            kind: ValueKind::Record(&COLOR_PREFERENCE),
            policy: DefaultPolicy::Optional,
            rules: &[],
        },
        FieldDescriptor {
            name: "tertiary_preference",
            wire_name: "tertiaryPreference",
            data_path: &[],
            kind: ValueKind::Record(&COLOR_PREFERENCE),
            policy: DefaultPolicy::Optional,
            rules: &[],
        },
    ],
    rules: &[SchemaRule::Prerequisite {
        field: "tertiary_preference",
        requires: "secondary_preference",
    }],
};

pub static PREFERRED_COLOR_GROUP: Schema = Schema {
    parcel_type: "preferred-color-group",
    fields: &[FieldDescriptor {
        name: "entries",
        wire_name: "entries",
        data_path: &[],
        kind: ValueKind::RecordList(&PREFERRED_COLOR_GROUP_ENTRY),
        policy: DefaultPolicy::Required,
        rules: &[],
    }],
    rules: &[],
};

// ── Mutation helpers ────────────────────────────────────────────────

/// Append a color → DSCP mapping to an app-probe entry. Validation
/// re-runs; an out-of-range DSCP leaves the entry untouched.
pub fn add_color_mapping(
    entry: &mut Record,
    color: TlocColor,
    dscp: i64,
) -> Result<(), ModelError> {
    let mapping = Record::build(
        &COLOR_DSCP_ENTRY,
        IndexMap::from([
            (
                "color",
                FieldSlot::Value(as_global(ScalarValue::Text(color.to_string()))),
            ),
            (
                "dscp",
                FieldSlot::Value(as_global(ScalarValue::Integer(dscp))),
            ),
        ]),
    )?;
    entry.push_record("map", mapping)
}

/// Add a jitter criterion to an SLA entry's fallback-best-tunnel,
/// creating the fallback record if none exists yet.
pub fn add_fallback_jitter_criteria(entry: &mut Record, variance: i64) -> Result<(), ModelError> {
    add_fallback_criteria(entry, "jitter", "jitter_variance", variance)
}

/// Add a latency criterion to an SLA entry's fallback-best-tunnel.
pub fn add_fallback_latency_criteria(entry: &mut Record, variance: i64) -> Result<(), ModelError> {
    add_fallback_criteria(entry, "latency", "latency_variance", variance)
}

/// Add a loss criterion to an SLA entry's fallback-best-tunnel.
pub fn add_fallback_loss_criteria(entry: &mut Record, variance: i64) -> Result<(), ModelError> {
    add_fallback_criteria(entry, "loss", "loss_variance", variance)
}

fn add_fallback_criteria(
    entry: &mut Record,
    token: &str,
    magnitude: &'static str,
    variance: i64,
) -> Result<(), ModelError> {
    let updated = match entry.get("fallback_best_tunnel") {
        Some(FieldSlot::Record(existing)) => {
            let mut fields = existing.fields().clone();
            let extend_order = !fields.contains_key(magnitude);
            fields.insert(
                magnitude,
                FieldSlot::Value(as_global(ScalarValue::Integer(variance))),
            );
            if extend_order {
                let current = match existing.get("criteria") {
                    Some(FieldSlot::Value(ov)) => ov
                        .literal()
                        .and_then(ScalarValue::as_str)
                        .unwrap_or_default()
                        .to_owned(),
                    _ => String::new(),
                };
                let joined = if current.is_empty() {
                    token.to_owned()
                } else {
                    format!("{current}-{token}")
                };
                fields.insert(
                    "criteria",
                    FieldSlot::Value(as_global(ScalarValue::Text(joined))),
                );
            }
            Record::build(&FALLBACK_BEST_TUNNEL, fields)?
        }
        None => Record::build(
            &FALLBACK_BEST_TUNNEL,
            IndexMap::from([
                (
                    "criteria",
                    FieldSlot::Value(as_global(ScalarValue::Text(token.to_owned()))),
                ),
                (
                    magnitude,
                    FieldSlot::Value(as_global(ScalarValue::Integer(variance))),
                ),
            ]),
        )?,
        Some(_) => {
            return Err(ModelError::Format {
                field: "fallback_best_tunnel".into(),
                reason: "existing value is not a fallback record".into(),
            });
        }
    };
    entry.set("fallback_best_tunnel", FieldSlot::Record(updated))
}
