use crate::flatten::FlatRecord;
use crate::load::error::LoadError;
use crate::load::loader::Loader;
use crate::load::row::{build_row, BoundValue};
use crate::load::schema::{FieldMapping, TableSchema};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// `FakeLoader` is an in-memory implementation of the `Loader` trait for
/// testing. It mirrors the all-or-nothing transaction contract: a failing
/// record leaves previously converted rows uncommitted.
#[derive(Clone, Default)]
pub struct FakeLoader {
    rows: Arc<Mutex<Vec<Vec<BoundValue>>>>,
    ensure_schema_calls: Arc<AtomicUsize>,
    load_calls: Arc<AtomicUsize>,
    fail_inserts_at: Arc<Mutex<Option<usize>>>,
}

#[allow(dead_code)]
impl FakeLoader {
    pub fn new() -> Self {
        FakeLoader::default()
    }

    /// Simulate a database-level insert failure at the given record index
    pub async fn fake_fail_insert_at(&self, position: usize) {
        *self.fail_inserts_at.lock().await = Some(position);
    }

    pub fn ensure_schema_calls(&self) -> usize {
        self.ensure_schema_calls.load(Ordering::SeqCst)
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    /// Rows committed so far, across all load_rows calls
    pub async fn committed_rows(&self) -> Vec<Vec<BoundValue>> {
        self.rows.lock().await.clone()
    }

    pub async fn committed_row_count(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl Loader for FakeLoader {
    async fn ensure_schema(&self, _schema: &TableSchema) -> Result<(), LoadError> {
        // CREATE TABLE IF NOT EXISTS semantics: always succeeds, never
        // mutates anything the fake tracks
        self.ensure_schema_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_rows(
        &self,
        schema: &TableSchema,
        mapping: &FieldMapping,
        records: &[FlatRecord],
    ) -> Result<u64, LoadError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);

        let fail_at = *self.fail_inserts_at.lock().await;

        // Stage everything first; commit only if every record converts
        // and no injected failure fires
        let mut staged = Vec::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if fail_at == Some(position) {
                return Err(LoadError::Insert {
                    position,
                    reason: "simulated insert failure".to_string(),
                });
            }
            staged.push(build_row(record, schema, mapping, position)?);
        }

        let count = staged.len() as u64;
        self.rows.lock().await.extend(staged);
        Ok(count)
    }
}
