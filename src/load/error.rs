use thiserror::Error;

/// Errors that can occur while loading rows into the destination table
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to connect to database: {0}")]
    Connection(String),

    /// DDL or other non-insert statement failed
    #[error("Query execution failed: {0}")]
    Query(String),

    /// A record is missing a mapped field or holds a value the target
    /// column cannot accept. `position` is the zero-based record index.
    #[error("Record {position} cannot be mapped to column {column}: {reason}")]
    FieldMapping {
        position: usize,
        column: String,
        reason: String,
    },

    /// A single row insert failed; the surrounding transaction is rolled
    /// back as a whole.
    #[error("Insert failed at record {position}: {reason}")]
    Insert { position: usize, reason: String },
}
