// ── Parcel machinery ──
//
// Generic build / wire-projection / wire-parsing routines driven entirely
// by the static schema tables in `schema.rs`. A parcel either exists in a
// fully valid state or not at all: construction, deserialization, and the
// mutation helpers all run the complete rule set, and a failed mutation
// rolls back before surfacing its error.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;

use wanfly_api::WireDocument;

use crate::error::{ModelError, SchemaViolation};
use crate::model::schema::{
    DefaultPolicy, FieldDescriptor, FieldRule, RecordSchema, Schema, SchemaRule, ValueKind,
};
use crate::model::value::{self, OptionValue, ScalarValue, as_default, as_default_marker};
use crate::validate;

// ── Slots ───────────────────────────────────────────────────────────

/// The runtime value of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSlot {
    /// A single tagged option value.
    Value(OptionValue<ScalarValue>),
    /// One nested record.
    Record(Record),
    /// An ordered sequence of records.
    Records(Vec<Record>),
    /// Key → boolean option value; absent keys are implicitly false.
    BoolMap(IndexMap<String, OptionValue<ScalarValue>>),
}

impl FieldSlot {
    fn shape_name(&self) -> &'static str {
        match self {
            Self::Value(_) => "option value",
            Self::Record(_) => "record",
            Self::Records(_) => "record-list",
            Self::BoolMap(_) => "bool-map",
        }
    }
}

// ── Record ──────────────────────────────────────────────────────────

/// A nested structured sub-object (one record-list entry, or a single
/// structured field). Validated on construction against its schema.
#[derive(Debug, Clone)]
pub struct Record {
    schema: &'static RecordSchema,
    fields: IndexMap<&'static str, FieldSlot>,
}

impl Record {
    pub fn build(
        schema: &'static RecordSchema,
        mut fields: IndexMap<&'static str, FieldSlot>,
    ) -> Result<Self, ModelError> {
        fill_defaults(schema.fields, &mut fields);
        validate_fields(schema.tag, schema.fields, schema.rules, &fields)?;
        Ok(Self { schema, fields })
    }

    pub fn schema(&self) -> &'static RecordSchema {
        self.schema
    }

    pub fn get(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &IndexMap<&'static str, FieldSlot> {
        &self.fields
    }

    /// Replace one field, re-validating the whole record; on failure the
    /// previous state is restored and the error returned.
    pub fn set(&mut self, name: &str, slot: FieldSlot) -> Result<(), ModelError> {
        set_slot(
            self.schema.tag,
            self.schema.fields,
            self.schema.rules,
            &mut self.fields,
            name,
            slot,
        )
    }

    /// Append to a record-list field, re-validating; rolls back on failure.
    pub fn push_record(&mut self, name: &str, record: Record) -> Result<(), ModelError> {
        push_slot_record(
            self.schema.tag,
            self.schema.fields,
            self.schema.rules,
            &mut self.fields,
            name,
            record,
        )
    }

    fn validate(&self) -> Result<(), ModelError> {
        validate_fields(self.schema.tag, self.schema.fields, self.schema.rules, &self.fields)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema) && self.fields == other.fields
    }
}

// ── Parcel ──────────────────────────────────────────────────────────

/// A named, schema-checked unit of device configuration.
#[derive(Debug, Clone)]
pub struct Parcel {
    schema: &'static Schema,
    name: String,
    description: Option<String>,
    fields: IndexMap<&'static str, FieldSlot>,
}

impl Parcel {
    /// Build a parcel from explicit field values.
    ///
    /// Fields the schema declares a default policy for are filled in;
    /// everything is then validated as a whole. Unknown field names,
    /// missing required fields, and any rule violation abort the build.
    pub fn build(
        schema: &'static Schema,
        name: impl Into<String>,
        description: Option<String>,
        mut fields: IndexMap<&'static str, FieldSlot>,
    ) -> Result<Self, ModelError> {
        fill_defaults(schema.fields, &mut fields);
        validate_fields(schema.parcel_type, schema.fields, schema.rules, &fields)?;
        let parcel = Self {
            schema,
            name: name.into(),
            description,
            fields,
        };
        trace!(parcel_type = schema.parcel_type, name = %parcel.name, "built parcel");
        Ok(parcel)
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn parcel_type(&self) -> &'static str {
        self.schema.parcel_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.get(name)
    }

    /// Replace one field, re-validating the whole parcel; on failure the
    /// previous state is restored and the error returned.
    pub fn set_field(&mut self, name: &str, slot: FieldSlot) -> Result<(), ModelError> {
        set_slot(
            self.schema.parcel_type,
            self.schema.fields,
            self.schema.rules,
            &mut self.fields,
            name,
            slot,
        )
    }

    /// Append to a record-list field, re-validating; rolls back on failure.
    pub fn push_record(&mut self, name: &str, record: Record) -> Result<(), ModelError> {
        push_slot_record(
            self.schema.parcel_type,
            self.schema.fields,
            self.schema.rules,
            &mut self.fields,
            name,
            record,
        )
    }

    /// Project this parcel into its wire envelope.
    ///
    /// Deterministic: fields are emitted in schema declaration order under
    /// their wire names, grouped under synthesized intermediate objects
    /// per data path.
    pub fn to_wire(&self) -> WireDocument {
        WireDocument {
            name: self.name.clone(),
            description: self.description.clone(),
            data: Value::Object(emit_fields(self.schema.fields, &self.fields)),
        }
    }

    /// Parse a wire envelope back into a parcel.
    ///
    /// Strict inverse of [`to_wire`](Self::to_wire): unknown wire keys at
    /// any nesting level, unknown `optionType` discriminants, and payload
    /// kind mismatches are all rejected, and the full rule set re-runs.
    pub fn from_wire(schema: &'static Schema, document: &WireDocument) -> Result<Self, ModelError> {
        let Value::Object(data) = &document.data else {
            return Err(schema_violation(
                schema.parcel_type,
                SchemaViolation::KindMismatch {
                    field: "data".into(),
                    expected: "object".into(),
                    found: json_shape_name(&document.data).into(),
                },
            ));
        };
        let fields = parse_level(schema.parcel_type, schema.fields, data, &[])?;
        Self::build(
            schema,
            document.name.clone(),
            document.description.clone(),
            fields,
        )
    }
}

impl PartialEq for Parcel {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema)
            && self.name == other.name
            && self.description == other.description
            && self.fields == other.fields
    }
}

// ── Defaulting ──────────────────────────────────────────────────────

fn fill_defaults(
    descriptors: &'static [FieldDescriptor],
    slots: &mut IndexMap<&'static str, FieldSlot>,
) {
    for d in descriptors {
        if slots.contains_key(d.name) {
            continue;
        }
        match d.policy {
            DefaultPolicy::Literal(c) => {
                slots.insert(d.name, FieldSlot::Value(as_default(c.to_scalar())));
            }
            DefaultPolicy::Marker => {
                slots.insert(d.name, FieldSlot::Value(as_default_marker()));
            }
            DefaultPolicy::Required | DefaultPolicy::Optional => {}
        }
    }
}

// ── Validation ──────────────────────────────────────────────────────

fn schema_violation(owner: &str, violation: SchemaViolation) -> ModelError {
    ModelError::Schema {
        parcel_type: owner.to_owned(),
        violation,
    }
}

fn kind_mismatch(owner: &str, d: &FieldDescriptor, found: &str) -> ModelError {
    schema_violation(
        owner,
        SchemaViolation::KindMismatch {
            field: d.name.to_owned(),
            expected: d.kind.name().to_owned(),
            found: found.to_owned(),
        },
    )
}

/// Names of fields that count as populated for cross-field rules: present
/// in the map and not a valueless default marker.
fn populated_fields(slots: &IndexMap<&'static str, FieldSlot>) -> Vec<&'static str> {
    slots
        .iter()
        .filter(|(_, slot)| !matches!(slot, FieldSlot::Value(v) if v.is_marker()))
        .map(|(name, _)| *name)
        .collect()
}

pub(crate) fn validate_fields(
    owner: &str,
    descriptors: &'static [FieldDescriptor],
    rules: &'static [SchemaRule],
    slots: &IndexMap<&'static str, FieldSlot>,
) -> Result<(), ModelError> {
    // Unknown fields are a hard error, never silently ignored.
    for name in slots.keys() {
        if !descriptors.iter().any(|d| d.name == *name) {
            return Err(schema_violation(
                owner,
                SchemaViolation::UnknownField {
                    name: (*name).to_owned(),
                },
            ));
        }
    }

    for d in descriptors {
        match slots.get(d.name) {
            Some(slot) => validate_slot(owner, d, slot)?,
            None => {
                if matches!(d.policy, DefaultPolicy::Required) {
                    return Err(schema_violation(
                        owner,
                        SchemaViolation::MissingRequired {
                            field: d.name.to_owned(),
                        },
                    ));
                }
            }
        }
    }

    let populated = populated_fields(slots);
    for rule in rules {
        validate_schema_rule(owner, rule, slots, &populated)?;
    }
    Ok(())
}

fn validate_slot(owner: &str, d: &FieldDescriptor, slot: &FieldSlot) -> Result<(), ModelError> {
    match slot {
        FieldSlot::Value(ov) => {
            if !d.kind.is_scalar() {
                return Err(kind_mismatch(owner, d, slot.shape_name()));
            }
            validate_option_value(owner, d, ov)
        }
        FieldSlot::BoolMap(map) => {
            let ValueKind::BoolMap(allowed) = d.kind else {
                return Err(kind_mismatch(owner, d, slot.shape_name()));
            };
            for (key, ov) in map {
                let dotted = format!("{}.{key}", d.name);
                if !allowed.contains(&key.as_str()) {
                    return Err(schema_violation(
                        owner,
                        SchemaViolation::UnknownField { name: dotted },
                    ));
                }
                if let Some(name) = ov.variable_name() {
                    check_variable(&dotted, name)?;
                    continue;
                }
                match ov.literal() {
                    Some(ScalarValue::Bool(_)) => {}
                    Some(other) => {
                        return Err(schema_violation(
                            owner,
                            SchemaViolation::KindMismatch {
                                field: dotted,
                                expected: "bool".into(),
                                found: other.kind_name().into(),
                            },
                        ));
                    }
                    None => {
                        return Err(schema_violation(
                            owner,
                            SchemaViolation::VariantMismatch {
                                field: dotted,
                                option_type: "default".into(),
                            },
                        ));
                    }
                }
            }
            Ok(())
        }
        FieldSlot::Record(record) => {
            let ValueKind::Record(expected) = d.kind else {
                return Err(kind_mismatch(owner, d, slot.shape_name()));
            };
            if !std::ptr::eq(record.schema(), expected) {
                return Err(kind_mismatch(owner, d, record.schema().tag));
            }
            record.validate()
        }
        FieldSlot::Records(records) => {
            let ValueKind::RecordList(expected) = d.kind else {
                return Err(kind_mismatch(owner, d, slot.shape_name()));
            };
            for record in records {
                if !std::ptr::eq(record.schema(), expected) {
                    return Err(kind_mismatch(owner, d, record.schema().tag));
                }
                record.validate()?;
            }
            Ok(())
        }
    }
}

fn check_variable(field: &str, name: &str) -> Result<(), ModelError> {
    value::check_variable_name(name).map_err(|_| ModelError::Format {
        field: field.to_owned(),
        reason: format!("`{name}` is not a valid device variable reference"),
    })
}

fn validate_option_value(
    owner: &str,
    d: &FieldDescriptor,
    ov: &OptionValue<ScalarValue>,
) -> Result<(), ModelError> {
    match ov {
        OptionValue::Variable { name } => check_variable(d.name, name),
        OptionValue::Default { value: None } => {
            if matches!(d.policy, DefaultPolicy::Marker) {
                Ok(())
            } else {
                Err(schema_violation(
                    owner,
                    SchemaViolation::VariantMismatch {
                        field: d.name.to_owned(),
                        option_type: "default".into(),
                    },
                ))
            }
        }
        OptionValue::Global { value } | OptionValue::Default { value: Some(value) } => {
            if let ValueKind::Enumerated(allowed) = d.kind {
                match value {
                    ScalarValue::Text(s) if allowed.contains(&s.as_str()) => {}
                    ScalarValue::Text(s) => {
                        return Err(ModelError::Format {
                            field: d.name.to_owned(),
                            reason: format!("`{s}` is not one of {allowed:?}"),
                        });
                    }
                    other => return Err(kind_mismatch(owner, d, other.kind_name())),
                }
            } else if d.kind.check(value).is_err() {
                return Err(kind_mismatch(owner, d, value.kind_name()));
            }
            for rule in d.rules {
                match rule {
                    FieldRule::Range { min, max } => {
                        let _ = validate::range(d.name, ov, *min, *max)?;
                    }
                    FieldRule::Pattern(re) => {
                        validate::pattern(d.name, ov, re)?;
                    }
                }
            }
            Ok(())
        }
    }
}

fn validate_schema_rule(
    owner: &str,
    rule: &SchemaRule,
    slots: &IndexMap<&'static str, FieldSlot>,
    populated: &[&str],
) -> Result<(), ModelError> {
    match rule {
        SchemaRule::ExactlyOneOf { fields, required } => {
            validate::exactly_one_of(fields, populated, *required)
        }
        SchemaRule::RequireAny { fields } => validate::require_any(owner, fields, populated),
        SchemaRule::Prerequisite { field, requires } => {
            validate::prerequisite(field, requires, populated)
        }
        SchemaRule::CriteriaPriority {
            order_field,
            magnitudes,
        } => {
            let Some(FieldSlot::Value(order)) = slots.get(order_field) else {
                // Absent or non-scalar order field: its own descriptor
                // governs; nothing to cross-check here.
                return Ok(());
            };
            let Some(literal) = order.literal() else {
                // Variable reference: not checkable, like a range bound.
                return Ok(());
            };
            let Some(text) = literal.as_str() else {
                return Err(ModelError::Format {
                    field: (*order_field).to_owned(),
                    reason: format!(
                        "criteria priority must be a string, got {}",
                        literal.kind_name()
                    ),
                });
            };
            let declared: Vec<&str> = text.split('-').collect();
            for token in &declared {
                if !magnitudes.iter().any(|(_, t)| t == token) {
                    return Err(ModelError::Format {
                        field: (*order_field).to_owned(),
                        reason: format!("unknown criteria token `{token}`"),
                    });
                }
            }
            let populated_tokens: Vec<&str> = magnitudes
                .iter()
                .filter(|(field, _)| populated.contains(field))
                .map(|(_, token)| *token)
                .collect();
            validate::criteria_consistency(order_field, &declared, &populated_tokens)
        }
    }
}

// ── Mutation with rollback ──────────────────────────────────────────

fn set_slot(
    owner: &str,
    descriptors: &'static [FieldDescriptor],
    rules: &'static [SchemaRule],
    slots: &mut IndexMap<&'static str, FieldSlot>,
    name: &str,
    slot: FieldSlot,
) -> Result<(), ModelError> {
    let Some(d) = descriptors.iter().find(|d| d.name == name) else {
        return Err(schema_violation(
            owner,
            SchemaViolation::UnknownField {
                name: name.to_owned(),
            },
        ));
    };
    let previous = slots.insert(d.name, slot);
    if let Err(err) = validate_fields(owner, descriptors, rules, slots) {
        match previous {
            Some(p) => {
                slots.insert(d.name, p);
            }
            None => {
                slots.shift_remove(d.name);
            }
        }
        return Err(err);
    }
    Ok(())
}

fn push_slot_record(
    owner: &str,
    descriptors: &'static [FieldDescriptor],
    rules: &'static [SchemaRule],
    slots: &mut IndexMap<&'static str, FieldSlot>,
    name: &str,
    record: Record,
) -> Result<(), ModelError> {
    let Some(d) = descriptors.iter().find(|d| d.name == name) else {
        return Err(schema_violation(
            owner,
            SchemaViolation::UnknownField {
                name: name.to_owned(),
            },
        ));
    };
    let was_absent = !slots.contains_key(d.name);
    match slots.get_mut(d.name) {
        Some(FieldSlot::Records(records)) => records.push(record),
        None => {
            slots.insert(d.name, FieldSlot::Records(vec![record]));
        }
        Some(other) => {
            let found = other.shape_name();
            return Err(kind_mismatch(owner, d, found));
        }
    }
    if let Err(err) = validate_fields(owner, descriptors, rules, slots) {
        if was_absent {
            slots.shift_remove(d.name);
        } else if let Some(FieldSlot::Records(records)) = slots.get_mut(d.name) {
            records.pop();
        }
        return Err(err);
    }
    Ok(())
}

// ── Wire projection ─────────────────────────────────────────────────

fn emit_fields(
    descriptors: &[FieldDescriptor],
    slots: &IndexMap<&'static str, FieldSlot>,
) -> Map<String, Value> {
    let mut out = Map::new();
    for d in descriptors {
        let Some(slot) = slots.get(d.name) else {
            continue;
        };
        let target = descend_mut(&mut out, d.data_path);
        target.insert(d.wire_name.to_owned(), emit_slot(slot));
    }
    out
}

fn descend_mut<'a>(root: &'a mut Map<String, Value>, path: &[&str]) -> &'a mut Map<String, Value> {
    let mut current = root;
    for segment in path {
        current = current
            .entry((*segment).to_owned())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .expect("data-path intermediates are always objects");
    }
    current
}

fn emit_slot(slot: &FieldSlot) -> Value {
    match slot {
        FieldSlot::Value(ov) => emit_option_value(ov),
        FieldSlot::BoolMap(map) => Value::Object(
            map.iter()
                .map(|(key, ov)| (key.clone(), emit_option_value(ov)))
                .collect(),
        ),
        FieldSlot::Record(record) => {
            Value::Object(emit_fields(record.schema().fields, record.fields()))
        }
        FieldSlot::Records(records) => Value::Array(
            records
                .iter()
                .map(|r| Value::Object(emit_fields(r.schema().fields, r.fields())))
                .collect(),
        ),
    }
}

fn emit_option_value(ov: &OptionValue<ScalarValue>) -> Value {
    let mut obj = Map::new();
    obj.insert(
        "optionType".to_owned(),
        Value::String(ov.option_type().to_string()),
    );
    match ov {
        OptionValue::Global { value } | OptionValue::Default { value: Some(value) } => {
            obj.insert("value".to_owned(), value.to_json());
        }
        OptionValue::Variable { name } => {
            obj.insert("value".to_owned(), Value::String(name.clone()));
        }
        OptionValue::Default { value: None } => {}
    }
    Value::Object(obj)
}

// ── Wire parsing ────────────────────────────────────────────────────

fn json_shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn dotted(prefix: &[&str], key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{}.{key}", prefix.join("."))
    }
}

/// Parse one nesting level of a wire `data` object. Every key must either
/// name a field declared at exactly this path or be an intermediate
/// segment some deeper field passes through.
fn parse_level(
    owner: &str,
    descriptors: &'static [FieldDescriptor],
    object: &Map<String, Value>,
    prefix: &[&str],
) -> Result<IndexMap<&'static str, FieldSlot>, ModelError> {
    let mut slots = IndexMap::new();
    for (key, value) in object {
        if let Some(d) = descriptors
            .iter()
            .find(|d| d.data_path == prefix && d.wire_name == key)
        {
            slots.insert(d.name, parse_slot(owner, d, value)?);
            continue;
        }

        let mut deeper: Vec<&str> = prefix.to_vec();
        deeper.push(key.as_str());
        let is_intermediate = descriptors
            .iter()
            .any(|d| d.data_path.len() >= deeper.len() && d.data_path[..deeper.len()] == deeper[..]);
        if !is_intermediate {
            return Err(schema_violation(
                owner,
                SchemaViolation::UnknownWireKey {
                    path: dotted(prefix, key),
                },
            ));
        }

        let Some(inner) = value.as_object() else {
            return Err(schema_violation(
                owner,
                SchemaViolation::KindMismatch {
                    field: dotted(prefix, key),
                    expected: "object".into(),
                    found: json_shape_name(value).into(),
                },
            ));
        };
        for (name, slot) in parse_level(owner, descriptors, inner, &deeper)? {
            slots.insert(name, slot);
        }
    }
    Ok(slots)
}

fn parse_slot(owner: &str, d: &FieldDescriptor, value: &Value) -> Result<FieldSlot, ModelError> {
    match d.kind {
        ValueKind::Bool
        | ValueKind::Integer
        | ValueKind::Number
        | ValueKind::Text
        | ValueKind::Enumerated(_) => Ok(FieldSlot::Value(parse_option_value(
            owner, d.name, d.kind, value,
        )?)),
        ValueKind::BoolMap(_) => {
            let Some(obj) = value.as_object() else {
                return Err(kind_mismatch(owner, d, json_shape_name(value)));
            };
            let mut map = IndexMap::new();
            for (key, entry) in obj {
                let field = format!("{}.{key}", d.name);
                map.insert(
                    key.clone(),
                    parse_option_value(owner, &field, ValueKind::Bool, entry)?,
                );
            }
            Ok(FieldSlot::BoolMap(map))
        }
        ValueKind::Record(rs) => {
            let Some(obj) = value.as_object() else {
                return Err(kind_mismatch(owner, d, json_shape_name(value)));
            };
            let fields = parse_level(rs.tag, rs.fields, obj, &[])?;
            Record::build(rs, fields).map(FieldSlot::Record)
        }
        ValueKind::RecordList(rs) => {
            let Some(items) = value.as_array() else {
                return Err(kind_mismatch(owner, d, json_shape_name(value)));
            };
            let mut records = Vec::with_capacity(items.len());
            for item in items {
                let Some(obj) = item.as_object() else {
                    return Err(kind_mismatch(owner, d, json_shape_name(item)));
                };
                let fields = parse_level(rs.tag, rs.fields, obj, &[])?;
                records.push(Record::build(rs, fields)?);
            }
            Ok(FieldSlot::Records(records))
        }
    }
}

fn parse_option_value(
    owner: &str,
    field: &str,
    kind: ValueKind,
    value: &Value,
) -> Result<OptionValue<ScalarValue>, ModelError> {
    let Some(obj) = value.as_object() else {
        return Err(schema_violation(
            owner,
            SchemaViolation::KindMismatch {
                field: field.to_owned(),
                expected: "tagged option value".into(),
                found: json_shape_name(value).into(),
            },
        ));
    };
    for key in obj.keys() {
        if key != "optionType" && key != "value" {
            return Err(schema_violation(
                owner,
                SchemaViolation::UnknownWireKey {
                    path: format!("{field}.{key}"),
                },
            ));
        }
    }
    let Some(option_type) = obj.get("optionType").and_then(Value::as_str) else {
        return Err(schema_violation(
            owner,
            SchemaViolation::VariantMismatch {
                field: field.to_owned(),
                option_type: "<missing>".into(),
            },
        ));
    };
    match option_type {
        "global" => Ok(OptionValue::Global {
            value: scalar_payload(owner, field, kind, obj.get("value"))?,
        }),
        "variable" => {
            let Some(name) = obj.get("value").and_then(Value::as_str) else {
                return Err(ModelError::Format {
                    field: field.to_owned(),
                    reason: "variable reference must be a string".into(),
                });
            };
            check_variable(field, name)?;
            Ok(OptionValue::Variable {
                name: name.to_owned(),
            })
        }
        "default" => match obj.get("value") {
            None | Some(Value::Null) => Ok(as_default_marker()),
            Some(_) => Ok(OptionValue::Default {
                value: Some(scalar_payload(owner, field, kind, obj.get("value"))?),
            }),
        },
        other => Err(schema_violation(
            owner,
            SchemaViolation::VariantMismatch {
                field: field.to_owned(),
                option_type: other.to_owned(),
            },
        )),
    }
}

fn scalar_payload(
    owner: &str,
    field: &str,
    kind: ValueKind,
    value: Option<&Value>,
) -> Result<ScalarValue, ModelError> {
    let Some(raw) = value else {
        return Err(schema_violation(
            owner,
            SchemaViolation::KindMismatch {
                field: field.to_owned(),
                expected: kind.name().to_owned(),
                found: "nothing".into(),
            },
        ));
    };
    let Some(scalar) = ScalarValue::from_json(raw) else {
        return Err(schema_violation(
            owner,
            SchemaViolation::KindMismatch {
                field: field.to_owned(),
                expected: kind.name().to_owned(),
                found: json_shape_name(raw).to_owned(),
            },
        ));
    };
    let found = scalar.kind_name();
    match kind.coerce(scalar) {
        Ok(value) => Ok(value),
        // A string payload under an enumerated kind is the right shape
        // with the wrong value; everything else is a shape mismatch.
        Err(reason) if matches!(kind, ValueKind::Enumerated(_)) && found == "string" => {
            Err(ModelError::Format {
                field: field.to_owned(),
                reason,
            })
        }
        Err(_) => Err(schema_violation(
            owner,
            SchemaViolation::KindMismatch {
                field: field.to_owned(),
                expected: kind.name().to_owned(),
                found: found.to_owned(),
            },
        )),
    }
}
