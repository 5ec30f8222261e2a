use crate::flatten::FlatRecord;
use crate::load::error::LoadError;
use crate::load::loader::Loader;
use crate::load::row::{build_row, BoundValue};
use crate::load::schema::{FieldMapping, TableSchema};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, error, info};

/// A PostgreSQL implementation of the Loader trait
pub struct PostgresLoader {
    pool: PgPool,
}

impl PostgresLoader {
    /// Create a new PostgresLoader for the given connection URL.
    /// Connectivity is verified up front so a bad URL fails at startup,
    /// not in the middle of a run.
    pub async fn new(database_url: &str) -> Result<Self, LoadError> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(60))
            .connect_lazy(database_url)
            .map_err(|e| {
                error!("Failed to create connection pool: {}", e);
                LoadError::Connection(e.to_string())
            })?;

        if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
            error!("Database connectivity test failed: {}", e);
            return Err(LoadError::Connection(format!(
                "Database is not accessible: {}",
                e
            )));
        }

        info!("PostgreSQL connection established");
        Ok(PostgresLoader { pool })
    }
}

fn bind_row<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    row: &'q [BoundValue],
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    for value in row {
        query = match value {
            BoundValue::Integer(v) => query.bind(*v),
            BoundValue::Bigint(v) => query.bind(*v),
            BoundValue::Double(v) => query.bind(*v),
            BoundValue::Text(v) => query.bind(v.clone()),
            BoundValue::Boolean(v) => query.bind(*v),
            BoundValue::Timestamptz(v) => query.bind(*v),
        };
    }
    query
}

#[async_trait]
impl Loader for PostgresLoader {
    async fn ensure_schema(&self, schema: &TableSchema) -> Result<(), LoadError> {
        let ddl = schema.create_table_sql();
        debug!("Ensuring table exists: {}", ddl);

        sqlx::query(&ddl).execute(&self.pool).await.map_err(|e| {
            error!("Failed to ensure table '{}': {}", schema.table, e);
            LoadError::Query(format!("Failed to create table: {}", e))
        })?;

        debug!("Table '{}' is present", schema.table);
        Ok(())
    }

    async fn load_rows(
        &self,
        schema: &TableSchema,
        mapping: &FieldMapping,
        records: &[FlatRecord],
    ) -> Result<u64, LoadError> {
        let insert_sql = mapping.insert_sql(schema);
        debug!("Insert statement: {}", insert_sql);

        // Convert every record before touching the database, so a mapping
        // error at record N never opens a transaction at all.
        let mut rows = Vec::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            rows.push(build_row(record, schema, mapping, position)?);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| LoadError::Connection(e.to_string()))?;

        let mut inserted: u64 = 0;
        for (position, row) in rows.iter().enumerate() {
            let query = bind_row(sqlx::query(&insert_sql), row);
            match query.execute(&mut *tx).await {
                Ok(result) => inserted += result.rows_affected(),
                Err(e) => {
                    error!("Insert failed at record {}: {}", position, e);
                    // Dropping tx rolls the whole batch back
                    return Err(LoadError::Insert {
                        position,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| LoadError::Query(format!("Failed to commit transaction: {}", e)))?;

        info!(
            "Inserted {} rows into '{}' ({} records)",
            inserted,
            schema.table,
            records.len()
        );
        Ok(inserted)
    }
}
