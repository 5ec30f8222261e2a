//! Normalizes a raw JSON payload into flat, tabular records.
//!
//! Nested object keys are joined with `.` (`address.city`). An array-valued
//! field is serialized to its compact JSON text and stored as a string
//! scalar; callers that need element-wise handling of nested arrays must
//! reshape the payload upstream.

use serde_json::{Map, Value};
use thiserror::Error;


/// Error raised when the payload cannot be flattened at all
#[derive(Error, Debug)]
pub enum FlattenError {
    #[error("Payload must be a JSON object or array, got {0}")]
    UnsupportedPayload(&'static str),
}

/// One flattened logical entity: an ordered mapping from dotted field path
/// to a scalar JSON value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatRecord {
    fields: Map<String, Value>,
}

impl FlatRecord {
    pub fn new() -> Self {
        FlatRecord::default()
    }

    pub fn insert(&mut self, path: String, value: Value) {
        self.fields.insert(path, value);
    }

    /// Look up a field by its dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Flatten a raw payload into a lazy sequence of records.
///
/// An array payload yields one record per element in input order; an object
/// payload yields exactly one record. The returned iterator is `Clone`, so
/// the sequence can be restarted from the original payload at no cost.
pub fn flatten(payload: &Value) -> Result<FlatRecords<'_>, FlattenError> {
    match payload {
        Value::Array(items) => Ok(FlatRecords {
            inner: Entities::Many(items.iter()),
        }),
        Value::Object(_) => Ok(FlatRecords {
            inner: Entities::One(Some(payload)),
        }),
        other => Err(FlattenError::UnsupportedPayload(json_type_name(other))),
    }
}

/// Lazy iterator over the flattened entities of one payload
#[derive(Clone)]
pub struct FlatRecords<'a> {
    inner: Entities<'a>,
}

#[derive(Clone)]
enum Entities<'a> {
    Many(std::slice::Iter<'a, Value>),
    One(Option<&'a Value>),
}

impl<'a> Iterator for FlatRecords<'a> {
    type Item = FlatRecord;

    fn next(&mut self) -> Option<FlatRecord> {
        let entity = match &mut self.inner {
            Entities::Many(iter) => iter.next(),
            Entities::One(slot) => slot.take(),
        }?;
        Some(flatten_entity(entity))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Entities::Many(iter) => iter.size_hint(),
            Entities::One(slot) => {
                let n = usize::from(slot.is_some());
                (n, Some(n))
            }
        }
    }
}

/// Flatten one logical entity. A non-object entity (e.g. a bare scalar
/// inside an array payload) becomes a single field named `value`.
fn flatten_entity(entity: &Value) -> FlatRecord {
    let mut record = FlatRecord::new();
    match entity {
        Value::Object(map) => {
            for (key, value) in map {
                flatten_into(&mut record, key, value);
            }
        }
        other => flatten_into(&mut record, "value", other),
    }
    record
}

fn flatten_into(record: &mut FlatRecord, path: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(record, &format!("{}.{}", path, key), nested);
            }
        }
        // Nested arrays are kept as their JSON text; see the module docs
        Value::Array(_) => record.insert(path.to_string(), Value::String(value.to_string())),
        scalar => record.insert(path.to_string(), scalar.clone()),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
