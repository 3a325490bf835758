//! Device row operations.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::client::{create, fetch, fetch_first, patch, Store};
use crate::error::Result;
use crate::models::Device;
use crate::query::Query;
use crate::table::Table;

/// Insert a device row as given.
pub async fn create_device(store: &dyn Store, device: &Device) -> Result<Device> {
    create(store, Table::Device, device).await
}

/// Get a device by ID.
pub async fn get_device(store: &dyn Store, device_id: &str) -> Result<Option<Device>> {
    fetch_first(store, Table::Device, &Query::new().eq("device_id", device_id)).await
}

/// First device owned by `owner_id`, in store order.
pub async fn first_for_owner(store: &dyn Store, owner_id: &str) -> Result<Option<Device>> {
    fetch_first(store, Table::Device, &Query::new().eq("owner_id", owner_id)).await
}

/// Every device owned by `owner_id`.
pub async fn list_for_owner(store: &dyn Store, owner_id: &str) -> Result<Vec<Device>> {
    fetch(store, Table::Device, &Query::new().eq("owner_id", owner_id)).await
}

/// Mark a device online and stamp its trigger time.
pub async fn set_online(store: &dyn Store, device_id: &str, triggered_at: DateTime<Utc>) -> Result<Vec<Device>> {
    patch(
        store,
        Table::Device,
        &Query::new().eq("device_id", device_id),
        json!({ "is_online": true, "last_triggered_at": triggered_at }),
    )
    .await
}

/// Mark a device offline.
pub async fn set_offline(store: &dyn Store, device_id: &str) -> Result<Vec<Device>> {
    patch(
        store,
        Table::Device,
        &Query::new().eq("device_id", device_id),
        json!({ "is_online": false }),
    )
    .await
}

/// Stamp the last time the device authenticated.
pub async fn touch(store: &dyn Store, device_id: &str, seen_at: DateTime<Utc>) -> Result<Vec<Device>> {
    patch(
        store,
        Table::Device,
        &Query::new().eq("device_id", device_id),
        json!({ "last_seen_at": seen_at }),
    )
    .await
}

/// Delete a device by ID, returning how many rows were removed.
pub async fn delete_device(store: &dyn Store, device_id: &str) -> Result<usize> {
    store
        .delete(Table::Device, &Query::new().eq("device_id", device_id))
        .await
}
