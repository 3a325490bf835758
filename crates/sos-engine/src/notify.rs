//! Notification fan-out to connected users.

use chrono::Utc;
use store::{connection, notification, user, NewNotification, Notification};
use tracing::{info, warn};

use crate::error::{Result, StoreResultExt};
use crate::SharedStore;

/// Emits one notification row per connection when an SOS starts, and
/// marks them seen when it stops.
///
/// Rows are written one at a time. A failure partway through leaves the
/// earlier rows in place.
#[derive(Clone)]
pub struct Notifier {
    store: SharedStore,
}

impl Notifier {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Notify every connection of `trigger_user_id` about `event_id`.
    ///
    /// Returns how many notifications were recorded.
    pub async fn notify_start(&self, event_id: &str, trigger_user_id: &str) -> Result<usize> {
        let store = self.store.as_ref();
        let now = Utc::now();

        let trigger = user::get_user(store, trigger_user_id)
            .await
            .or_upstream("Failed to load trigger user")?;
        let (trigger_name, trigger_email) = match trigger {
            Some(u) => (u.user_name, u.user_email),
            None => {
                warn!(user_id = %trigger_user_id, "Trigger user missing; notifying as Unknown");
                ("Unknown".to_string(), String::new())
            }
        };

        let connections = connection::list_for_user(store, trigger_user_id)
            .await
            .or_upstream("Failed to find connections")?;

        let mut notified = 0;
        for conn in &connections {
            let other = conn.other_party(trigger_user_id);
            let row = NewNotification {
                event_id: event_id.to_string(),
                notified_user: other.to_string(),
                sent_at: now,
                trigger_name: trigger_name.clone(),
                trigger_email: trigger_email.clone(),
            };

            notification::create_notification(store, &row)
                .await
                .or_upstream("Failed to send notifications")?;
            notified += 1;
        }

        info!(event_id = %event_id, notified, "Start notifications sent");
        Ok(notified)
    }

    /// Stamp `seen_at` on every notification for `event_id`.
    pub async fn notify_stop(&self, event_id: &str) -> Result<usize> {
        let marked = notification::mark_seen(self.store.as_ref(), event_id, Utc::now())
            .await
            .or_upstream("Failed to update notifications")?
            .len();

        info!(event_id = %event_id, marked, "Stop notifications updated");
        Ok(marked)
    }

    /// Notifications addressed to `user_id`, newest first.
    pub async fn inbox(&self, user_id: &str) -> Result<Vec<Notification>> {
        notification::list_for_user(self.store.as_ref(), user_id)
            .await
            .or_upstream("Failed to load notifications")
    }
}
