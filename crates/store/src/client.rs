//! The data store seam.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::table::Table;

/// A REST-queryable collection store.
///
/// Every call is a single-row or single-filter operation the store applies
/// atomically. No multi-call transactions exist.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch rows matching `query`.
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>>;

    /// Create a row and return its stored representation.
    async fn insert(&self, table: Table, row: Value) -> Result<Vec<Value>>;

    /// Apply `patch` to every row matching `query`, returning the patched rows.
    async fn update(&self, table: Table, query: &Query, patch: Value) -> Result<Vec<Value>>;

    /// Remove every row matching `query`, returning how many were removed.
    async fn delete(&self, table: Table, query: &Query) -> Result<usize>;
}

/// Decode raw rows into a model.
pub(crate) fn decode_rows<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(|source| StoreError::Decode { table, source }))
        .collect()
}

/// Decode the first row, if any.
pub(crate) fn decode_first<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> Result<Option<T>> {
    match rows.into_iter().next() {
        Some(row) => serde_json::from_value(row)
            .map(Some)
            .map_err(|source| StoreError::Decode { table, source }),
        None => Ok(None),
    }
}

/// Serialize an insert or patch payload.
pub(crate) fn encode<T: Serialize>(table: Table, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|source| StoreError::Encode { table, source })
}

/// Typed selection.
pub(crate) async fn fetch<T: DeserializeOwned>(
    store: &dyn Store,
    table: Table,
    query: &Query,
) -> Result<Vec<T>> {
    let rows = store.select(table, query).await?;
    decode_rows(table, rows)
}

/// Typed selection of the first matching row.
pub(crate) async fn fetch_first<T: DeserializeOwned>(
    store: &dyn Store,
    table: Table,
    query: &Query,
) -> Result<Option<T>> {
    let rows = store.select(table, query).await?;
    decode_first(table, rows)
}

/// Typed insert that expects the created row back.
pub(crate) async fn create<P: Serialize, T: DeserializeOwned>(
    store: &dyn Store,
    table: Table,
    payload: &P,
) -> Result<T> {
    let rows = store.insert(table, encode(table, payload)?).await?;
    decode_first(table, rows)?.ok_or(StoreError::EmptyResponse { table })
}

/// Typed patch.
pub(crate) async fn patch<T: DeserializeOwned>(
    store: &dyn Store,
    table: Table,
    query: &Query,
    patch: Value,
) -> Result<Vec<T>> {
    let rows = store.update(table, query, patch).await?;
    decode_rows(table, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not representable"))
        }
    }

    #[tokio::test]
    async fn test_unencodable_payload() {
        let store = MemoryStore::new();

        let err = create::<_, Value>(&store, Table::Device, &Unencodable)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Encode { table: Table::Device, .. }));
        assert!(err.to_string().starts_with("failed to encode sos_device payload"));

        assert!(store.rows(Table::Device).await.is_empty());
    }
}
