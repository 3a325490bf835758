//! In-process store with the same query semantics as the REST store.
//!
//! Used by tests and local runs without a remote project. Rows are plain
//! JSON objects, so anything the REST store accepts works here too.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::client::Store;
use crate::error::{Result, StoreError};
use crate::query::{Direction, Query};
use crate::table::Table;

/// Which calls an injected fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Every call against the table fails.
    All,
    /// Only insert/update/delete fail; reads succeed.
    Writes,
}

/// [`Store`] kept entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<Table, Vec<Value>>>>,
    faults: Arc<Mutex<HashMap<Table, Fault>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make calls against `table` fail with [`StoreError::Unavailable`].
    pub fn inject_fault(&self, table: Table, fault: Fault) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.insert(table, fault);
        }
    }

    /// Remove a previously injected fault.
    pub fn clear_fault(&self, table: Table) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.remove(&table);
        }
    }

    /// Snapshot of every row in `table`, in insertion order.
    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.tables
            .read()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self, table: Table, write: bool) -> Result<()> {
        let fault = self
            .faults
            .lock()
            .ok()
            .and_then(|faults| faults.get(&table).copied());

        match fault {
            Some(Fault::All) => Err(StoreError::Unavailable { table }),
            Some(Fault::Writes) if write => Err(StoreError::Unavailable { table }),
            _ => Ok(()),
        }
    }
}

/// Column sets that must be unique per table, besides the key column.
fn unique_columns(table: Table) -> &'static [&'static [&'static str]] {
    match table {
        Table::User => &[&["user_email"]],
        Table::Connection => &[&["user1_id", "user2_id"]],
        _ => &[],
    }
}

fn violates_unique(table: Table, existing: &[Value], candidate: &Value) -> Option<String> {
    let key = table.key_column();
    let mut sets: Vec<&[&str]> = vec![std::slice::from_ref(&key)];
    sets.extend(unique_columns(table).iter().copied());

    for columns in sets {
        let clash = existing.iter().any(|row| {
            columns.iter().all(|column| {
                let a = row.get(*column).unwrap_or(&Value::Null);
                let b = candidate.get(*column).unwrap_or(&Value::Null);
                !a.is_null() && a == b
            })
        });
        if clash {
            return Some(format!(
                "duplicate key value violates unique constraint on ({})",
                columns.join(", ")
            ));
        }
    }

    None
}

fn compare_scalars(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (
                DateTime::<FixedOffset>::parse_from_rfc3339(x),
                DateTime::<FixedOffset>::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn select_rows(rows: &[Value], query: &Query) -> Vec<Value> {
    let mut matched: Vec<Value> = rows.iter().filter(|row| query.matches(row)).cloned().collect();

    if let Some((column, direction)) = query.order() {
        matched.sort_by(|a, b| {
            let ord = compare_scalars(a.get(column), b.get(column));
            match direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        });
    }

    if let Some(limit) = query.max_rows() {
        matched.truncate(limit);
    }

    matched
}

#[async_trait]
impl Store for MemoryStore {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>> {
        self.check(table, false)?;
        let tables = self.tables.read().await;
        let rows = tables.get(&table).map(Vec::as_slice).unwrap_or_default();
        Ok(select_rows(rows, query))
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Vec<Value>> {
        self.check(table, true)?;

        let Value::Object(mut fields) = row else {
            return Err(StoreError::Status {
                table,
                status: 400,
                body: "row must be a JSON object".to_string(),
            });
        };

        let key = table.key_column();
        if fields.get(key).map_or(true, Value::is_null) {
            fields.insert(key.to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        let row = Value::Object(fields);

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        if let Some(message) = violates_unique(table, rows, &row) {
            return Err(StoreError::Conflict { table, message });
        }
        rows.push(row.clone());

        Ok(vec![row])
    }

    async fn update(&self, table: Table, query: &Query, patch: Value) -> Result<Vec<Value>> {
        self.check(table, true)?;

        let patch: Map<String, Value> = match patch {
            Value::Object(fields) => fields,
            _ => {
                return Err(StoreError::Status {
                    table,
                    status: 400,
                    body: "patch must be a JSON object".to_string(),
                })
            }
        };

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        let mut patched = Vec::new();

        for row in rows.iter_mut().filter(|row| query.matches(row)) {
            if let Value::Object(fields) = row {
                for (column, value) in &patch {
                    fields.insert(column.clone(), value.clone());
                }
            }
            patched.push(row.clone());
        }

        Ok(patched)
    }

    async fn delete(&self, table: Table, query: &Query) -> Result<usize> {
        self.check(table, true)?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        let before = rows.len();
        rows.retain(|row| !query.matches(row));

        Ok(before - rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_generates_key() {
        let store = MemoryStore::new();
        let rows = store
            .insert(Table::SosEvent, json!({"triggered_by": "u1", "handled": false}))
            .await
            .unwrap();

        let event_id = rows[0]["event_id"].as_str().unwrap();
        assert!(Uuid::parse_str(event_id).is_ok());
    }

    #[tokio::test]
    async fn test_unique_email_conflict() {
        let store = MemoryStore::new();
        store
            .insert(Table::User, json!({"user_email": "a@x.io"}))
            .await
            .unwrap();

        let err = store
            .insert(Table::User, json!({"user_email": "a@x.io"}))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_unique_connection_pair() {
        let store = MemoryStore::new();
        store
            .insert(Table::Connection, json!({"user1_id": "a", "user2_id": "b"}))
            .await
            .unwrap();
        store
            .insert(Table::Connection, json!({"user1_id": "b", "user2_id": "a"}))
            .await
            .unwrap();

        let err = store
            .insert(Table::Connection, json!({"user1_id": "a", "user2_id": "b"}))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_order_by_timestamp_and_limit() {
        let store = MemoryStore::new();
        for on_at in [
            "2026-01-01T10:00:00Z",
            "2026-01-01T10:00:00.500Z",
            "2025-12-31T23:59:59Z",
        ] {
            store
                .insert(Table::SosEvent, json!({"triggered_by": "u1", "on_at": on_at}))
                .await
                .unwrap();
        }

        let rows = store
            .select(
                Table::SosEvent,
                &Query::new().eq("triggered_by", "u1").order_desc("on_at").limit(2),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["on_at"], "2026-01-01T10:00:00.500Z");
        assert_eq!(rows[1]["on_at"], "2026-01-01T10:00:00Z");

        let rows = store
            .select(Table::SosEvent, &Query::new().order_asc("on_at"))
            .await
            .unwrap();
        assert_eq!(rows[0]["on_at"], "2025-12-31T23:59:59Z");
        assert_eq!(rows[2]["on_at"], "2026-01-01T10:00:00.500Z");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryStore::new();
        store
            .insert(Table::Device, json!({"device_id": "d1", "owner_id": "u1", "is_online": false}))
            .await
            .unwrap();

        let patched = store
            .update(Table::Device, &Query::new().eq("device_id", "d1"), json!({"is_online": true}))
            .await
            .unwrap();
        assert_eq!(patched[0]["is_online"], true);

        let removed = store
            .delete(Table::Device, &Query::new().eq("device_id", "d1"))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.rows(Table::Device).await.is_empty());
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let store = MemoryStore::new();
        store.inject_fault(Table::Device, Fault::Writes);

        assert!(store.select(Table::Device, &Query::new()).await.is_ok());
        let err = store
            .insert(Table::Device, json!({"owner_id": "u1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));

        store.clear_fault(Table::Device);
        assert!(store.insert(Table::Device, json!({"owner_id": "u1"})).await.is_ok());
    }
}
