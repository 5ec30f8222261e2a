use crate::flatten::FlatRecord;
use crate::load::error::LoadError;
use crate::load::schema::{Column, FieldMapping, SqlType, TableSchema};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// A scalar converted into the concrete type its target column binds as.
/// `None` inside a variant is a SQL NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Integer(Option<i32>),
    Bigint(Option<i64>),
    Double(Option<f64>),
    Text(Option<String>),
    Boolean(Option<bool>),
    Timestamptz(Option<DateTime<Utc>>),
}

/// Convert one flattened field value for one column.
///
/// Text columns accept any scalar (non-strings keep their JSON rendering,
/// matching how array-valued fields are carried); other types require a
/// compatible JSON value. JSON null binds as SQL NULL for every type.
pub fn bind_value(column: &Column, value: &Value) -> Result<BoundValue, String> {
    if value.is_null() {
        return Ok(match column.sql_type {
            SqlType::Integer => BoundValue::Integer(None),
            SqlType::Bigint => BoundValue::Bigint(None),
            SqlType::Double => BoundValue::Double(None),
            SqlType::Text => BoundValue::Text(None),
            SqlType::Boolean => BoundValue::Boolean(None),
            SqlType::Timestamptz => BoundValue::Timestamptz(None),
        });
    }

    match column.sql_type {
        SqlType::Integer => {
            let n = value
                .as_i64()
                .ok_or_else(|| format!("expected integer, got {}", value))?;
            let n = i32::try_from(n).map_err(|_| format!("{} overflows INTEGER", n))?;
            Ok(BoundValue::Integer(Some(n)))
        }
        SqlType::Bigint => {
            let n = value
                .as_i64()
                .ok_or_else(|| format!("expected integer, got {}", value))?;
            Ok(BoundValue::Bigint(Some(n)))
        }
        SqlType::Double => {
            let n = value
                .as_f64()
                .ok_or_else(|| format!("expected number, got {}", value))?;
            Ok(BoundValue::Double(Some(n)))
        }
        SqlType::Text => {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Ok(BoundValue::Text(Some(text)))
        }
        SqlType::Boolean => {
            let b = value
                .as_bool()
                .ok_or_else(|| format!("expected boolean, got {}", value))?;
            Ok(BoundValue::Boolean(Some(b)))
        }
        SqlType::Timestamptz => {
            let s = value
                .as_str()
                .ok_or_else(|| format!("expected RFC3339 string, got {}", value))?;
            let ts = DateTime::parse_from_rfc3339(s)
                .map_err(|e| format!("invalid timestamp '{}': {}", s, e))?
                .with_timezone(&Utc);
            Ok(BoundValue::Timestamptz(Some(ts)))
        }
    }
}

/// Build the ordered bound values for one record, in mapping order.
/// A missing field or an unconvertible value is a FieldMapping error
/// carrying the record's position.
pub fn build_row(
    record: &FlatRecord,
    schema: &TableSchema,
    mapping: &FieldMapping,
    position: usize,
) -> Result<Vec<BoundValue>, LoadError> {
    let mut row = Vec::with_capacity(mapping.entries().len());

    for entry in mapping.entries() {
        // Validation at construction guarantees the column exists
        let column = schema.column(&entry.column).ok_or_else(|| {
            LoadError::FieldMapping {
                position,
                column: entry.column.clone(),
                reason: "column not declared in schema".to_string(),
            }
        })?;

        let value = record
            .get(&entry.path)
            .ok_or_else(|| LoadError::FieldMapping {
                position,
                column: entry.column.clone(),
                reason: format!("record has no field '{}'", entry.path),
            })?;

        let bound = bind_value(column, value).map_err(|reason| LoadError::FieldMapping {
            position,
            column: entry.column.clone(),
            reason,
        })?;
        row.push(bound);
    }

    Ok(row)
}
