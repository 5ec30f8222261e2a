use crate::flatten::FlatRecord;
use crate::load::error::LoadError;
use crate::load::schema::{FieldMapping, TableSchema};
use async_trait::async_trait;
use std::sync::Arc;

/// Loader trait defining the interface for the destination table
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    /// Create the destination table if it does not exist. Idempotent and
    /// safe to call every invocation; must never alter an existing table.
    async fn ensure_schema(&self, schema: &TableSchema) -> Result<(), LoadError>;

    /// Insert one row per record, in sequence order, inside a single
    /// transaction. All rows commit together or none do. Returns the
    /// number of rows inserted.
    async fn load_rows(
        &self,
        schema: &TableSchema,
        mapping: &FieldMapping,
        records: &[FlatRecord],
    ) -> Result<u64, LoadError>;
}

/// Implementation of Loader trait for Arc<T> where T implements Loader
#[async_trait]
impl<T: Loader + ?Sized> Loader for Arc<T> {
    async fn ensure_schema(&self, schema: &TableSchema) -> Result<(), LoadError> {
        (**self).ensure_schema(schema).await
    }

    async fn load_rows(
        &self,
        schema: &TableSchema,
        mapping: &FieldMapping,
        records: &[FlatRecord],
    ) -> Result<u64, LoadError> {
        (**self).load_rows(schema, mapping, records).await
    }
}
