//! The SOS toggle.
//!
//! Each triggering user is either idle (no unhandled event) or active
//! (one unhandled event). A toggle reads the current state from the store
//! and moves to the other one:
//!
//! - idle -> active: pick a device (the caller's, or the owner's first,
//!   auto-provisioning one if needed), create the event, mark the device
//!   online, notify connections.
//! - active -> idle: close the event, mark its device offline, close any
//!   help acknowledgment on that device, mark notifications seen.
//!
//! Steps run in order against the store with no rollback. A failure
//! leaves earlier steps applied. Two concurrent starts for the same user
//! can both observe idle and both create an event; the store has no
//! constraint preventing it.

use chrono::Utc;
use serde::Serialize;
use store::{help_event, sos_event, NewSosEvent, SosEvent};
use tracing::{info, warn};

use crate::devices::DeviceRegistry;
use crate::error::{Result, StoreResultExt};
use crate::identity::Principal;
use crate::notify::Notifier;
use crate::SharedStore;

/// What a toggle did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ToggleOutcome {
    /// A new event was created.
    Started {
        event_id: String,
        device_id: String,
        notified: usize,
    },
    /// The active event was closed.
    Stopped { event_id: String },
}

impl ToggleOutcome {
    pub fn is_active(&self) -> bool {
        matches!(self, ToggleOutcome::Started { .. })
    }

    pub fn event_id(&self) -> &str {
        match self {
            ToggleOutcome::Started { event_id, .. } | ToggleOutcome::Stopped { event_id } => event_id,
        }
    }
}

/// Drives the per-user SOS state machine.
#[derive(Clone)]
pub struct SosMachine {
    store: SharedStore,
    devices: DeviceRegistry,
    notifier: Notifier,
}

impl SosMachine {
    pub fn new(store: SharedStore, devices: DeviceRegistry, notifier: Notifier) -> Self {
        Self {
            store,
            devices,
            notifier,
        }
    }

    /// The event currently making `user_id` active, if any.
    ///
    /// Should more than one exist, the first the store returns wins.
    pub async fn active_event(&self, user_id: &str) -> Result<Option<SosEvent>> {
        let mut unhandled = sos_event::unhandled_for_user(self.store.as_ref(), user_id)
            .await
            .or_upstream("Failed to check SOS state")?;

        if unhandled.len() > 1 {
            warn!(
                user_id = %user_id,
                count = unhandled.len(),
                "Multiple unhandled SOS events; using the first"
            );
        }

        Ok(if unhandled.is_empty() {
            None
        } else {
            Some(unhandled.swap_remove(0))
        })
    }

    /// Start or stop the acting user's SOS depending on current state.
    pub async fn toggle(&self, principal: &Principal) -> Result<ToggleOutcome> {
        let user_id = principal.acting_user_id();

        match self.active_event(user_id).await? {
            Some(event) => self.stop(event).await,
            None => self.start(principal).await,
        }
    }

    async fn stop(&self, event: SosEvent) -> Result<ToggleOutcome> {
        let store = self.store.as_ref();
        let now = Utc::now();

        sos_event::close(store, &event.event_id, now)
            .await
            .or_upstream("Failed to stop SOS event")?;

        if let Some(device_id) = event.device_id.as_deref() {
            self.devices.set_offline(device_id).await?;

            let closed = help_event::close_all_for_device(store, device_id, now)
                .await
                .or_upstream("Failed to close help request")?;
            if !closed.is_empty() {
                info!(device_id = %device_id, count = closed.len(), "Help request closed with SOS");
            }
        }

        self.notifier.notify_stop(&event.event_id).await?;

        info!(
            event_id = %event.event_id,
            user_id = %event.triggered_by,
            "SOS stopped"
        );

        Ok(ToggleOutcome::Stopped {
            event_id: event.event_id,
        })
    }

    async fn start(&self, principal: &Principal) -> Result<ToggleOutcome> {
        let user_id = principal.acting_user_id();
        let now = Utc::now();

        let device_id = match principal.device_id() {
            Some(device_id) => device_id.to_string(),
            None => self.devices.ensure_device_for(user_id).await?,
        };

        let event = sos_event::create_event(
            self.store.as_ref(),
            &NewSosEvent {
                device_id: device_id.clone(),
                triggered_by: user_id.to_string(),
                on_at: now,
                handled: false,
            },
        )
        .await
        .or_upstream("Failed to create SOS event")?;

        self.devices.set_online(&device_id, now).await?;

        let notified = self.notifier.notify_start(&event.event_id, user_id).await?;

        info!(
            event_id = %event.event_id,
            user_id = %user_id,
            device_id = %device_id,
            from_device = principal.is_device(),
            notified,
            "SOS triggered"
        );

        Ok(ToggleOutcome::Started {
            event_id: event.event_id,
            device_id,
            notified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::testing::{connect, harness, seed_device, seed_user};
    use store::{device, notification, Fault, NewHelpEvent, Table};

    fn user(id: &str) -> Principal {
        Principal::User {
            user_id: id.to_string(),
        }
    }

    async fn unhandled_count(h: &crate::testing::Harness, user_id: &str) -> usize {
        sos_event::unhandled_for_user(h.store.as_ref(), user_id)
            .await
            .unwrap()
            .len()
    }

    #[tokio::test]
    async fn test_toggle_pairs_start_and_stop() {
        let h = harness();
        let u = seed_user(&h, "Una", "una@x.io").await;

        let started = h.sos.toggle(&user(&u)).await.unwrap();
        assert!(started.is_active());

        let stopped = h.sos.toggle(&user(&u)).await.unwrap();
        assert!(!stopped.is_active());
        assert_eq!(stopped.event_id(), started.event_id());

        let events = sos_event::list_for_user(h.store.as_ref(), &u).await.unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].handled);
        assert!(events[0].off_at.is_some());
    }

    #[tokio::test]
    async fn test_at_most_one_unhandled_event() {
        let h = harness();
        let u = seed_user(&h, "Una", "una@x.io").await;

        for _ in 0..7 {
            h.sos.toggle(&user(&u)).await.unwrap();
            assert!(unhandled_count(&h, &u).await <= 1);
        }
        assert_eq!(unhandled_count(&h, &u).await, 1);
        assert_eq!(
            sos_event::list_for_user(h.store.as_ref(), &u).await.unwrap().len(),
            4
        );
    }

    #[tokio::test]
    async fn test_start_auto_provisions_device() {
        let h = harness();
        let u = seed_user(&h, "Una", "una@x.io").await;

        let outcome = h.sos.toggle(&user(&u)).await.unwrap();
        let ToggleOutcome::Started { device_id, event_id, .. } = outcome else {
            panic!("expected start");
        };

        let devices = device::list_for_owner(h.store.as_ref(), &u).await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].device_id, device_id);
        assert!(devices[0].is_online);
        assert!(devices[0].last_triggered_at.is_some());

        let event = sos_event::get_event(h.store.as_ref(), &event_id).await.unwrap().unwrap();
        assert_eq!(event.device_id.as_deref(), Some(device_id.as_str()));
        assert!(!event.handled);
    }

    #[tokio::test]
    async fn test_device_principal_uses_its_own_device() {
        let h = harness();
        seed_device(&h, "first", "owner").await;
        seed_device(&h, "second", "owner").await;
        let principal = Principal::Device {
            device_id: "second".to_string(),
            owner_id: "owner".to_string(),
        };

        let outcome = h.sos.toggle(&principal).await.unwrap();
        assert!(matches!(outcome, ToggleOutcome::Started { ref device_id, .. } if device_id == "second"));

        let second = device::get_device(h.store.as_ref(), "second").await.unwrap().unwrap();
        let first = device::get_device(h.store.as_ref(), "first").await.unwrap().unwrap();
        assert!(second.is_online);
        assert!(!first.is_online);
    }

    #[tokio::test]
    async fn test_user_can_stop_device_started_event() {
        let h = harness();
        seed_device(&h, "d1", "owner").await;
        let principal = Principal::Device {
            device_id: "d1".to_string(),
            owner_id: "owner".to_string(),
        };
        h.sos.toggle(&principal).await.unwrap();

        let outcome = h.sos.toggle(&user("owner")).await.unwrap();
        assert!(!outcome.is_active());
        let d1 = device::get_device(h.store.as_ref(), "d1").await.unwrap().unwrap();
        assert!(!d1.is_online);
    }

    #[tokio::test]
    async fn test_stop_uses_stored_device_and_closes_help() {
        let h = harness();
        seed_device(&h, "d1", "owner").await;
        let from_device = Principal::Device {
            device_id: "d1".to_string(),
            owner_id: "owner".to_string(),
        };
        h.sos.toggle(&from_device).await.unwrap();

        help_event::create_help(
            h.store.as_ref(),
            &NewHelpEvent {
                device_id: "d1".to_string(),
                triggered_by: "owner".to_string(),
                help_on_at: Utc::now(),
                active: true,
                handled_by: "carer@x.io".to_string(),
            },
        )
        .await
        .unwrap();

        h.sos.toggle(&from_device).await.unwrap();

        assert!(help_event::active_for_device(h.store.as_ref(), "d1").await.unwrap().is_none());
        let d1 = device::get_device(h.store.as_ref(), "d1").await.unwrap().unwrap();
        assert!(!d1.is_online);
    }

    #[tokio::test]
    async fn test_notifications_follow_lifecycle() {
        let h = harness();
        let u = seed_user(&h, "Una", "una@x.io").await;
        for i in 0..3 {
            let other = seed_user(&h, "Carer", &format!("carer{}@x.io", i)).await;
            connect(&h, &u, &other).await;
        }

        let started = h.sos.toggle(&user(&u)).await.unwrap();
        let ToggleOutcome::Started { notified, ref event_id, .. } = started else {
            panic!("expected start");
        };
        assert_eq!(notified, 3);

        let rows = notification::list_for_event(h.store.as_ref(), event_id).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|n| n.trigger_email == "una@x.io"));
        assert!(rows.iter().all(|n| (Utc::now() - n.sent_at).num_seconds() < 5));

        h.sos.toggle(&user(&u)).await.unwrap();
        let rows = notification::list_for_event(h.store.as_ref(), event_id).await.unwrap();
        assert!(rows.iter().all(|n| n.seen_at.is_some()));
    }

    #[tokio::test]
    async fn test_failed_device_patch_leaves_event_closed() {
        let h = harness();
        let u = seed_user(&h, "Una", "una@x.io").await;
        let started = h.sos.toggle(&user(&u)).await.unwrap();
        let ToggleOutcome::Started { device_id, .. } = started else {
            panic!("expected start");
        };

        h.memory.inject_fault(Table::Device, Fault::Writes);
        let err = h.sos.toggle(&user(&u)).await.unwrap_err();
        assert!(matches!(err, EngineError::Upstream { .. }));

        // No rollback: the event stays closed while the device stays online.
        assert_eq!(unhandled_count(&h, &u).await, 0);
        let device = device::get_device(h.store.as_ref(), &device_id).await.unwrap().unwrap();
        assert!(device.is_online);
    }

    #[tokio::test]
    async fn test_state_read_failure_aborts() {
        let h = harness();
        h.memory.inject_fault(Table::SosEvent, Fault::All);

        let err = h.sos.toggle(&user("u1")).await.unwrap_err();
        assert_eq!(err.public_message(), "Failed to check SOS state");
        assert!(h.memory.rows(Table::Device).await.is_empty());
    }

    #[tokio::test]
    async fn test_trigger_user_read_failure_aborts() {
        let h = harness();
        let u = seed_user(&h, "Una", "una@x.io").await;
        let c = seed_user(&h, "Cy", "cy@x.io").await;
        connect(&h, &u, &c).await;

        h.memory.inject_fault(Table::User, Fault::All);
        let err = h.sos.toggle(&user(&u)).await.unwrap_err();
        assert!(matches!(err, EngineError::Upstream { .. }));
        assert_eq!(err.public_message(), "Failed to load trigger user");
        assert!(h.memory.rows(Table::Notification).await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_unhandled_events_tie_break() {
        let h = harness();
        for _ in 0..2 {
            sos_event::create_event(
                h.store.as_ref(),
                &NewSosEvent {
                    device_id: "d1".to_string(),
                    triggered_by: "u1".to_string(),
                    on_at: Utc::now(),
                    handled: false,
                },
            )
            .await
            .unwrap();
        }

        let outcome = h.sos.toggle(&user("u1")).await.unwrap();
        assert!(!outcome.is_active());
        assert_eq!(unhandled_count(&h, "u1").await, 1);
    }
}
