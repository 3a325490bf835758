//! Device registry.

use chrono::{DateTime, Utc};
use store::{device, Device};
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, Result, StoreResultExt};
use crate::SharedStore;

/// Owns device existence and online state.
#[derive(Clone)]
pub struct DeviceRegistry {
    store: SharedStore,
}

impl DeviceRegistry {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Create a new offline device for `owner_id`.
    ///
    /// Not idempotent: every call creates another device.
    pub async fn register(&self, owner_id: &str) -> Result<Device> {
        let row = Device {
            device_id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            is_online: false,
            last_triggered_at: None,
            last_seen_at: None,
        };

        let created = device::create_device(self.store.as_ref(), &row)
            .await
            .or_upstream("Failed to register device")?;

        info!(device_id = %created.device_id, owner_id = %owner_id, "Device registered");
        Ok(created)
    }

    /// First device owned by `owner_id`. Multiple devices per owner are
    /// allowed; which one comes first is up to the store.
    pub async fn find_by_owner(&self, owner_id: &str) -> Result<Option<Device>> {
        device::first_for_owner(self.store.as_ref(), owner_id)
            .await
            .or_upstream("Failed to check devices")
    }

    pub async fn find_by_id(&self, device_id: &str) -> Result<Option<Device>> {
        device::get_device(self.store.as_ref(), device_id)
            .await
            .or_upstream("Failed to look up device")
    }

    /// Like [`find_by_id`](Self::find_by_id) but absent is an error.
    pub async fn get(&self, device_id: &str) -> Result<Device> {
        self.find_by_id(device_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("Device not found".to_string()))
    }

    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Device>> {
        device::list_for_owner(self.store.as_ref(), owner_id)
            .await
            .or_upstream("Failed to list devices")
    }

    pub async fn set_online(&self, device_id: &str, triggered_at: DateTime<Utc>) -> Result<()> {
        device::set_online(self.store.as_ref(), device_id, triggered_at)
            .await
            .or_upstream("Failed to update device state")?;
        Ok(())
    }

    pub async fn set_offline(&self, device_id: &str) -> Result<()> {
        device::set_offline(self.store.as_ref(), device_id)
            .await
            .or_upstream("Failed to update device state")?;
        Ok(())
    }

    /// Record that the device just authenticated.
    pub async fn mark_seen(&self, device_id: &str, seen_at: DateTime<Utc>) -> Result<()> {
        device::touch(self.store.as_ref(), device_id, seen_at)
            .await
            .or_upstream("Failed to update device state")?;
        Ok(())
    }

    pub async fn delete(&self, device_id: &str) -> Result<()> {
        let removed = device::delete_device(self.store.as_ref(), device_id)
            .await
            .or_upstream("Failed to remove device")?;

        if removed == 0 {
            return Err(EngineError::NotFound("Device not found".to_string()));
        }

        info!(device_id = %device_id, "Device removed");
        Ok(())
    }

    /// Delete a device only if `owner_id` owns it.
    pub async fn delete_owned(&self, owner_id: &str, device_id: &str) -> Result<()> {
        match self.find_by_id(device_id).await? {
            Some(found) if found.owner_id == owner_id => self.delete(device_id).await,
            _ => Err(EngineError::NotFound("Device not found".to_string())),
        }
    }

    /// Return the owner's device, registering one if they have none.
    pub async fn ensure_device_for(&self, owner_id: &str) -> Result<String> {
        if let Some(existing) = self.find_by_owner(owner_id).await? {
            return Ok(existing.device_id);
        }

        info!(owner_id = %owner_id, "Auto-provisioning device");
        let created = self.register(owner_id).await.map_err(|err| match err {
            EngineError::Upstream { source, .. } => EngineError::Upstream {
                context: "Failed to auto-create device",
                source,
            },
            other => other,
        })?;

        Ok(created.device_id)
    }
}
