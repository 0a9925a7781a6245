// ── OMP parcel schema ──
//
// System-level Overlay Management Protocol settings. Timer fields group
// under a `timers` object on the wire. The advertise maps only ever name
// protocols that are enabled -- a protocol absent from the map is off,
// and no `false` entry exists for it.

use strum::VariantNames;

use super::RoutingProtocol;
use crate::model::schema::{
    ConstScalar, DefaultPolicy, FieldDescriptor, FieldRule, Schema, ValueKind,
};

pub static OMP: Schema = Schema {
    parcel_type: "omp",
    fields: &[
        FieldDescriptor {
            name: "graceful_restart",
            wire_name: "gracefulRestart",
            data_path: &[],
            kind: ValueKind::Bool,
            policy: DefaultPolicy::Literal(ConstScalar::Bool(true)),
            rules: &[],
        },
        FieldDescriptor {
            name: "send_path_limit",
            wire_name: "sendPathLimit",
            data_path: &[],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Literal(ConstScalar::Integer(4)),
            rules: &[FieldRule::Range {
                min: 1.0,
                max: 16.0,
            }],
        },
        FieldDescriptor {
            name: "ecmp_limit",
            wire_name: "ecmpLimit",
            data_path: &[],
            kind: ValueKind::Number,
            policy: DefaultPolicy::Literal(ConstScalar::Number(4.0)),
            rules: &[FieldRule::Range {
                min: 1.0,
                max: 16.0,
            }],
        },
        FieldDescriptor {
            name: "shutdown",
            wire_name: "shutdown",
            data_path: &[],
            kind: ValueKind::Bool,
            policy: DefaultPolicy::Marker,
            rules: &[],
        },
        FieldDescriptor {
            name: "advertisement_interval",
            wire_name: "advertisementInterval",
            data_path: &["timers"],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Literal(ConstScalar::Integer(1)),
            rules: &[FieldRule::Range {
                min: 0.0,
                max: 65535.0,
            }],
        },
        FieldDescriptor {
            name: "graceful_restart_timer",
            wire_name: "gracefulRestartTimer",
            data_path: &["timers"],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Literal(ConstScalar::Integer(43200)),
            rules: &[FieldRule::Range {
                min: 1.0,
                max: 604_800.0,
            }],
        },
        FieldDescriptor {
            name: "eor_timer",
            wire_name: "eorTimer",
            data_path: &["timers"],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Literal(ConstScalar::Integer(300)),
            rules: &[FieldRule::Range {
                min: 1.0,
                max: 3600.0,
            }],
        },
        FieldDescriptor {
            name: "holdtime",
            wire_name: "holdtime",
            data_path: &["timers"],
            kind: ValueKind::Integer,
            policy: DefaultPolicy::Literal(ConstScalar::Integer(60)),
            rules: &[FieldRule::Range {
                min: 0.0,
                max: 65535.0,
            }],
        },
        FieldDescriptor {
            name: "advertise_ipv4",
            wire_name: "advertiseIpv4",
            data_path: &[],
            kind: ValueKind::BoolMap(RoutingProtocol::VARIANTS),
            policy: DefaultPolicy::Optional,
            rules: &[],
        },
        FieldDescriptor {
            name: "advertise_ipv6",
            wire_name: "advertiseIpv6",
            data_path: &[],
            kind: ValueKind::BoolMap(RoutingProtocol::VARIANTS),
            policy: DefaultPolicy::Optional,
            rules: &[],
        },
    ],
    rules: &[],
};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::parcel::{FieldSlot, Parcel};
    use crate::model::value::{ScalarValue, as_global};

    #[test]
    fn defaults_fill_every_declared_field() {
        let parcel = Parcel::build(&OMP, "edge-omp", None, IndexMap::new()).unwrap();
        let doc = parcel.to_wire();
        assert_eq!(
            doc.data,
            json!({
                "gracefulRestart": { "optionType": "default", "value": true },
                "sendPathLimit": { "optionType": "default", "value": 4 },
                "ecmpLimit": { "optionType": "default", "value": 4.0 },
                "shutdown": { "optionType": "default" },
                "timers": {
                    "advertisementInterval": { "optionType": "default", "value": 1 },
                    "gracefulRestartTimer": { "optionType": "default", "value": 43200 },
                    "eorTimer": { "optionType": "default", "value": 300 },
                    "holdtime": { "optionType": "default", "value": 60 },
                },
            })
        );
    }

    #[test]
    fn holdtime_nests_under_timers() {
        let fields = IndexMap::from([(
            "holdtime",
            FieldSlot::Value(as_global(ScalarValue::Integer(90))),
        )]);
        let parcel = Parcel::build(&OMP, "edge-omp", None, fields).unwrap();
        let doc = parcel.to_wire();
        assert_eq!(
            doc.data.pointer("/timers/holdtime"),
            Some(&json!({ "optionType": "global", "value": 90 }))
        );
    }

    #[test]
    fn advertise_map_rejects_unknown_protocol() {
        let mut map = IndexMap::new();
        map.insert("rip".to_owned(), as_global(ScalarValue::Bool(true)));
        let fields = IndexMap::from([("advertise_ipv4", FieldSlot::BoolMap(map))]);
        assert!(Parcel::build(&OMP, "edge-omp", None, fields).is_err());
    }

    #[test]
    fn send_path_limit_bounds() {
        let fields = IndexMap::from([(
            "send_path_limit",
            FieldSlot::Value(as_global(ScalarValue::Integer(17))),
        )]);
        assert!(Parcel::build(&OMP, "edge-omp", None, fields).is_err());
    }
}
