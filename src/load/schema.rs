use crate::config::ConfigError;
use serde::Deserialize;

/// Statically configured shape of the destination table. Never inferred
/// from the payload at runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<Column>,
    /// When set, the named column is created UNIQUE and inserts become
    /// upserts keyed on it, making same-day re-runs idempotent at row
    /// level. When unset, every re-run re-inserts all rows.
    #[serde(default)]
    pub upsert_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: SqlType,
    /// Optional DDL DEFAULT expression (e.g. `now()`); defaulted columns
    /// are typically left out of the field mapping.
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlType {
    Integer,
    Bigint,
    Double,
    Text,
    Boolean,
    Timestamptz,
}

impl SqlType {
    pub fn ddl(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Bigint => "BIGINT",
            SqlType::Double => "DOUBLE PRECISION",
            SqlType::Text => "TEXT",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Timestamptz => "TIMESTAMPTZ",
        }
    }
}

/// Identifiers end up verbatim in DDL and INSERT statements (they cannot be
/// bound as parameters), so they are restricted to a safe character set.
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl TableSchema {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_identifier(&self.table) {
            return Err(ConfigError::InvalidSchema(format!(
                "'{}' is not a valid table name",
                self.table
            )));
        }
        if self.columns.is_empty() {
            return Err(ConfigError::InvalidSchema(
                "at least one column is required".to_string(),
            ));
        }
        for column in &self.columns {
            if !is_valid_identifier(&column.name) {
                return Err(ConfigError::InvalidSchema(format!(
                    "'{}' is not a valid column name",
                    column.name
                )));
            }
        }
        if let Some(key) = &self.upsert_key {
            if self.column(key).is_none() {
                return Err(ConfigError::InvalidSchema(format!(
                    "upsert_key '{}' is not a declared column",
                    key
                )));
            }
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Conditional DDL for the destination table. Running it against an
    /// existing table is a no-op; it never alters the table's shape.
    pub fn create_table_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                let mut definition = format!("{} {}", column.name, column.sql_type.ddl());
                if let Some(default) = &column.default {
                    definition.push_str(&format!(" DEFAULT {}", default));
                }
                if self.upsert_key.as_deref() == Some(column.name.as_str()) {
                    definition.push_str(" UNIQUE");
                }
                definition
            })
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.table,
            columns.join(", ")
        )
    }
}

/// One target column paired with the flattened field path it reads from
#[derive(Debug, Clone, Deserialize)]
pub struct FieldEntry {
    pub column: String,
    pub path: String,
}

/// Ordered column-to-path mapping driving the insert statement. Validated
/// once at pipeline construction so the loader never meets an unknown
/// column at runtime.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: Vec<FieldEntry>,
}

impl FieldMapping {
    pub fn new(entries: Vec<FieldEntry>) -> Self {
        FieldMapping { entries }
    }

    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    pub fn validate(&self, schema: &TableSchema) -> Result<(), ConfigError> {
        if self.entries.is_empty() {
            return Err(ConfigError::InvalidMapping(
                "at least one column mapping is required".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for entry in &self.entries {
            if schema.column(&entry.column).is_none() {
                return Err(ConfigError::InvalidMapping(format!(
                    "mapped column '{}' is not declared in the table schema",
                    entry.column
                )));
            }
            if !seen.insert(entry.column.as_str()) {
                return Err(ConfigError::InvalidMapping(format!(
                    "column '{}' is mapped more than once",
                    entry.column
                )));
            }
        }

        if let Some(key) = &schema.upsert_key {
            if !self.entries.iter().any(|e| &e.column == key) {
                return Err(ConfigError::InvalidMapping(format!(
                    "upsert_key '{}' must be a mapped column",
                    key
                )));
            }
        }

        Ok(())
    }

    /// Parameterized INSERT for this mapping, with an ON CONFLICT upsert
    /// clause when the schema declares an upsert key. Values are always
    /// bound, never interpolated.
    pub fn insert_sql(&self, schema: &TableSchema) -> String {
        let columns: Vec<&str> = self.entries.iter().map(|e| e.column.as_str()).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            schema.table,
            columns.join(", "),
            placeholders.join(", ")
        );

        if let Some(key) = &schema.upsert_key {
            let updates: Vec<String> = columns
                .iter()
                .filter(|c| *c != key)
                .map(|c| format!("{} = EXCLUDED.{}", c, c))
                .collect();
            if updates.is_empty() {
                sql.push_str(&format!(" ON CONFLICT ({}) DO NOTHING", key));
            } else {
                sql.push_str(&format!(
                    " ON CONFLICT ({}) DO UPDATE SET {}",
                    key,
                    updates.join(", ")
                ));
            }
        }

        sql
    }
}
