//! Caregiver help acknowledgment.
//!
//! A second per-device toggle meaning "someone is physically responding".
//! Opening it records the responder on the device's unhandled SOS event;
//! closing it resolves that event.

use chrono::Utc;
use serde::Serialize;
use store::{help_event, sos_event, user, NewHelpEvent};
use tracing::info;

use crate::devices::DeviceRegistry;
use crate::error::{EngineError, Result, StoreResultExt};
use crate::notify::Notifier;
use crate::SharedStore;

/// What a help toggle did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HelpOutcome {
    Opened { help_id: String },
    Closed { help_id: String },
}

impl HelpOutcome {
    pub fn is_active(&self) -> bool {
        matches!(self, HelpOutcome::Opened { .. })
    }
}

/// Drives the per-device help state.
#[derive(Clone)]
pub struct HelpDesk {
    store: SharedStore,
    devices: DeviceRegistry,
    notifier: Notifier,
}

impl HelpDesk {
    pub fn new(store: SharedStore, devices: DeviceRegistry, notifier: Notifier) -> Self {
        Self {
            store,
            devices,
            notifier,
        }
    }

    /// Whether `device_id` has an active help acknowledgment.
    pub async fn state(&self, device_id: &str) -> Result<bool> {
        let active = help_event::active_for_device(self.store.as_ref(), device_id)
            .await
            .or_upstream("Failed to load help state")?;
        Ok(active.is_some())
    }

    /// Open or close help on `device_id` on behalf of `caregiver_user_id`.
    pub async fn toggle(&self, device_id: &str, caregiver_user_id: &str) -> Result<HelpOutcome> {
        let store = self.store.as_ref();
        let now = Utc::now();

        let caregiver = user::get_user(store, caregiver_user_id)
            .await
            .or_upstream("Failed to load caregiver")?
            .ok_or_else(|| EngineError::NotFound("User not found".to_string()))?;
        let responder = caregiver.user_email;

        let device = self
            .devices
            .find_by_id(device_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("Device not registered".to_string()))?;

        let active = help_event::active_for_device(store, device_id)
            .await
            .or_upstream("Failed to load help state")?;
        let pending_sos = sos_event::unhandled_for_device(store, device_id)
            .await
            .or_upstream("Failed to check SOS state")?;

        if let Some(help) = active {
            help_event::close(store, &help.help_id, now, &responder)
                .await
                .or_upstream("Failed to close help request")?;

            if let Some(event) = pending_sos {
                sos_event::resolve(store, &event.event_id, now, &responder)
                    .await
                    .or_upstream("Failed to resolve SOS event")?;
                self.devices.set_offline(device_id).await?;
                self.notifier.notify_stop(&event.event_id).await?;
                info!(event_id = %event.event_id, handled_by = %responder, "SOS resolved by caregiver");
            }

            info!(help_id = %help.help_id, device_id = %device_id, handled_by = %responder, "Help closed");
            return Ok(HelpOutcome::Closed {
                help_id: help.help_id,
            });
        }

        let help = help_event::create_help(
            store,
            &NewHelpEvent {
                device_id: device_id.to_string(),
                triggered_by: device.owner_id,
                help_on_at: now,
                active: true,
                handled_by: responder.clone(),
            },
        )
        .await
        .or_upstream("Failed to open help request")?;

        if let Some(event) = pending_sos {
            sos_event::set_responder(store, &event.event_id, &responder)
                .await
                .or_upstream("Failed to update SOS event")?;
        }

        info!(help_id = %help.help_id, device_id = %device_id, handled_by = %responder, "Help opened");
        Ok(HelpOutcome::Opened {
            help_id: help.help_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Principal;
    use crate::testing::{connect, harness, seed_device, seed_user};
    use store::{device, notification};

    #[tokio::test]
    async fn test_open_then_close() {
        let h = harness();
        let owner = seed_user(&h, "Olga", "olga@x.io").await;
        let carer = seed_user(&h, "Carl", "carl@x.io").await;
        seed_device(&h, "d1", &owner).await;

        assert!(!h.help.state("d1").await.unwrap());

        let opened = h.help.toggle("d1", &carer).await.unwrap();
        assert!(opened.is_active());
        assert!(h.help.state("d1").await.unwrap());

        let help = help_event::active_for_device(h.store.as_ref(), "d1").await.unwrap().unwrap();
        assert_eq!(help.triggered_by, owner);
        assert_eq!(help.handled_by.as_deref(), Some("carl@x.io"));

        let closed = h.help.toggle("d1", &carer).await.unwrap();
        assert!(!closed.is_active());
        assert!(!h.help.state("d1").await.unwrap());
    }

    #[tokio::test]
    async fn test_help_closes_sos() {
        let h = harness();
        let owner = seed_user(&h, "Olga", "olga@x.io").await;
        let carer = seed_user(&h, "Carl", "carl@x.io").await;
        let nurse = seed_user(&h, "Nina", "nina@x.io").await;
        connect(&h, &owner, &carer).await;
        seed_device(&h, "d1", &owner).await;

        let principal = Principal::Device {
            device_id: "d1".to_string(),
            owner_id: owner.clone(),
        };
        let started = h.sos.toggle(&principal).await.unwrap();

        h.help.toggle("d1", &carer).await.unwrap();
        let event = sos_event::get_event(h.store.as_ref(), started.event_id()).await.unwrap().unwrap();
        assert_eq!(event.handled_by.as_deref(), Some("carl@x.io"));
        assert!(!event.handled);

        h.help.toggle("d1", &nurse).await.unwrap();
        let event = sos_event::get_event(h.store.as_ref(), started.event_id()).await.unwrap().unwrap();
        assert_eq!(event.handled_by.as_deref(), Some("nina@x.io"));
        assert!(event.handled);
        assert!(event.off_at.is_some());

        let d1 = device::get_device(h.store.as_ref(), "d1").await.unwrap().unwrap();
        assert!(!d1.is_online);

        let rows = notification::list_for_event(h.store.as_ref(), started.event_id()).await.unwrap();
        assert!(rows.iter().all(|n| n.seen_at.is_some()));

        // The owner is idle again, so the next toggle starts a new event.
        assert!(h.sos.toggle(&principal).await.unwrap().is_active());
    }

    #[tokio::test]
    async fn test_unknown_device() {
        let h = harness();
        let carer = seed_user(&h, "Carl", "carl@x.io").await;

        let err = h.help.toggle("missing", &carer).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unknown_caregiver() {
        let h = harness();
        seed_device(&h, "d1", "owner").await;

        let err = h.help.toggle("d1", "ghost").await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
