//! Uniform record model shared by all source adapters.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Synthetic identifier field assigned by some datastores. It is part of the
/// discovered catalog but hidden from field selection.
pub const SYNTHETIC_ID_FIELD: &str = "_id";

/// One row of a dataset: an ordered mapping from field id to scalar value.
///
/// Records are immutable once produced by a source adapter. Missing fields
/// degrade to an empty string when read through [`Record::text`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    #[serde(flatten)]
    values: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value, keeping insertion order.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.values.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Renders a field as display text. Missing fields and nulls render as
    /// the empty string rather than failing.
    pub fn text(&self, field: &str) -> String {
        self.values.get(field).map(value_text).unwrap_or_default()
    }

    /// Field ids in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// An ordered sequence of records keyed by a record identifier.
///
/// The identifier carries no meaning beyond uniqueness; order drives the
/// default X-axis and table-row order downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordSet {
    records: IndexMap<String, Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, record: Record) {
        self.records.insert(id.into(), record);
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.values().next()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Record) -> bool) {
        self.records.retain(|id, record| keep(id, record));
    }
}

impl FromIterator<(String, Record)> for RecordSet {
    fn from_iter<T: IntoIterator<Item = (String, Record)>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Discovered field-id to human-label mapping for one dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldCatalog {
    fields: IndexMap<String, String>,
}

impl FieldCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, label: impl Into<String>) {
        self.fields.insert(id.into(), label.into());
    }

    pub fn label(&self, id: &str) -> Option<&str> {
        self.fields.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fields.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.values().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Catalog labels with the synthetic identifier field stripped. This is
    /// the default key space for per-column override configuration.
    pub fn without_synthetic(&self) -> Vec<String> {
        self.fields
            .keys()
            .filter(|id| *id != SYNTHETIC_ID_FIELD)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, String)> for FieldCatalog {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Renders a scalar JSON value as display text. Null becomes the empty
/// string; numbers keep their JSON formatting.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Whether a scalar value reads as numeric: JSON numbers, or strings that
/// parse as a float.
pub fn value_is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => !s.trim().is_empty() && s.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}
