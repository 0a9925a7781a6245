// Legacy feature-template value maps
//
// Models the value dictionaries returned by the controller's legacy
// template endpoints. The shapes are loose by design -- the same endpoint
// mixes bare primitives, nested maps, record lists, and values already
// wrapped in an `optionType` envelope, depending on template age and
// firmware. `wanfly-core` owns all interpretation; this module only gives
// the payload a lossless typed form.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A value already carrying an `optionType` discriminant in the legacy map.
///
/// Older controllers pre-wrap schema defaults this way. `option_type` is
/// kept as a plain string: the legacy API is not strict about casing or
/// future variants, and rejecting unknown discriminants is the core
/// crate's call to make.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedValue {
    #[serde(rename = "optionType")]
    pub option_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// One value in a legacy template map.
///
/// Deserialization is untagged; `Wrapped` must win over `Nested` so that
/// an `optionType` envelope is not mistaken for an ordinary sub-map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    Wrapped(WrappedValue),
    Records(Vec<TemplateValues>),
    Nested(TemplateValues),
}

/// A legacy template value map.
///
/// Preserves the controller's key order. Keys are dash- or
/// underscore-separated field identifiers; some logical fields live under
/// nested sub-maps rather than at the top level (see [`Self::get_path`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateValues(IndexMap<String, TemplateValue>);

impl TemplateValues {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: TemplateValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        self.0.get(key)
    }

    /// Look up `key` under a nested path of intermediate sub-maps.
    ///
    /// Descends through `path` one segment at a time; a missing or
    /// non-map intermediate means the field is absent -- no intermediate
    /// structure is ever created.
    pub fn get_path(&self, path: &[&str], key: &str) -> Option<&TemplateValue> {
        let mut current = self;
        for segment in path {
            match current.get(segment)? {
                TemplateValue::Nested(inner) => current = inner,
                _ => return None,
            }
        }
        current.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, TemplateValue> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a TemplateValues {
    type Item = (&'a String, &'a TemplateValue);
    type IntoIter = indexmap::map::Iter<'a, String, TemplateValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<IndexMap<String, TemplateValue>> for TemplateValues {
    fn from(map: IndexMap<String, TemplateValue>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, TemplateValue)> for TemplateValues {
    fn from_iter<I: IntoIterator<Item = (String, TemplateValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
