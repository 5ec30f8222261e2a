use crate::load::schema::{Column, FieldEntry, FieldMapping, SqlType, TableSchema};
use serde_json::{json, Value};

/// Check if a test is enabled via environment variable
fn is_test_enabled(env_var: &str) -> bool {
    std::env::var(env_var)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Check if database tests are enabled via environment variable
pub fn is_db_enabled() -> bool {
    is_test_enabled("ENABLE_DB_TESTS")
}

/// Check if S3 tests are enabled via environment variable
pub fn is_s3_enabled() -> bool {
    is_test_enabled("ENABLE_S3_TESTS")
}

/// The users table used across tests, mirroring the sample configuration
pub fn users_schema() -> TableSchema {
    TableSchema {
        table: "test_users".to_string(),
        columns: vec![
            Column {
                name: "user_id".to_string(),
                sql_type: SqlType::Integer,
                default: None,
            },
            Column {
                name: "full_name".to_string(),
                sql_type: SqlType::Text,
                default: None,
            },
            Column {
                name: "email".to_string(),
                sql_type: SqlType::Text,
                default: None,
            },
            Column {
                name: "city".to_string(),
                sql_type: SqlType::Text,
                default: None,
            },
        ],
        upsert_key: None,
    }
}

/// users_schema with user_id declared as the upsert key
pub fn users_schema_with_upsert() -> TableSchema {
    let mut schema = users_schema();
    schema.upsert_key = Some("user_id".to_string());
    schema
}

/// Mapping from the flattened users payload onto users_schema
pub fn users_mapping() -> FieldMapping {
    FieldMapping::new(vec![
        FieldEntry {
            column: "user_id".to_string(),
            path: "id".to_string(),
        },
        FieldEntry {
            column: "full_name".to_string(),
            path: "name".to_string(),
        },
        FieldEntry {
            column: "email".to_string(),
            path: "email".to_string(),
        },
        FieldEntry {
            column: "city".to_string(),
            path: "address.city".to_string(),
        },
    ])
}

/// One-user payload from the end-to-end scenario
pub fn single_user_payload() -> Value {
    json!([
        {"id": 1, "name": "Ann", "email": "a@x.com", "address": {"city": "Oslo"}}
    ])
}

/// Payload with `count` users; user `skip_email_at` (zero-based) has no
/// email field, which breaks the users mapping at that record
pub fn users_payload(count: usize, skip_email_at: Option<usize>) -> Value {
    let users: Vec<Value> = (0..count)
        .map(|i| {
            let mut user = json!({
                "id": i as i64 + 1,
                "name": format!("User {}", i + 1),
                "email": format!("user{}@x.com", i + 1),
                "address": {"city": "Oslo"}
            });
            if skip_email_at == Some(i) {
                if let Some(map) = user.as_object_mut() {
                    map.remove("email");
                }
            }
            user
        })
        .collect();
    Value::Array(users)
}
