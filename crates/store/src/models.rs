//! Row models for each collection.
//!
//! `New*` structs are insert payloads: they omit the identifiers the store
//! generates. Everything else mirrors the stored row shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub user_name: String,
    /// Always lower-cased.
    pub user_email: String,
    /// Hex SHA-256 digest of the password.
    pub user_password: String,
}

/// Insert payload for [`User`].
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub user_name: String,
    pub user_email: String,
    pub user_password: String,
}

/// A pairing between two users. Either side may be the one in distress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    pub user1_id: String,
    pub user2_id: String,
}

impl Connection {
    /// The party on the other side of `user_id`.
    pub fn other_party(&self, user_id: &str) -> &str {
        if self.user1_id == user_id {
            &self.user2_id
        } else {
            &self.user1_id
        }
    }
}

/// An alert device. `device_id` is generated by this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub device_id: String,
    pub owner_id: String,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub last_triggered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// One alert-active interval for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SosEvent {
    pub event_id: String,
    pub device_id: Option<String>,
    pub triggered_by: String,
    pub on_at: DateTime<Utc>,
    #[serde(default)]
    pub off_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub handled: bool,
    #[serde(default)]
    pub handled_by: Option<String>,
}

/// Insert payload for [`SosEvent`].
#[derive(Debug, Clone, Serialize)]
pub struct NewSosEvent {
    pub device_id: String,
    pub triggered_by: String,
    pub on_at: DateTime<Utc>,
    pub handled: bool,
}

/// A caregiver acknowledgment interval on a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpEvent {
    pub help_id: String,
    pub device_id: String,
    pub triggered_by: String,
    pub help_on_at: DateTime<Utc>,
    #[serde(default)]
    pub help_off_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub handled_by: Option<String>,
}

/// Insert payload for [`HelpEvent`].
#[derive(Debug, Clone, Serialize)]
pub struct NewHelpEvent {
    pub device_id: String,
    pub triggered_by: String,
    pub help_on_at: DateTime<Utc>,
    pub active: bool,
    pub handled_by: String,
}

/// Record that a connected party was told about an SOS event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub notification_id: Option<String>,
    pub event_id: String,
    pub notified_user: String,
    pub sent_at: DateTime<Utc>,
    pub trigger_name: String,
    pub trigger_email: String,
    #[serde(default)]
    pub seen_at: Option<DateTime<Utc>>,
}

/// Insert payload for [`Notification`].
#[derive(Debug, Clone, Serialize)]
pub struct NewNotification {
    pub event_id: String,
    pub notified_user: String,
    pub sent_at: DateTime<Utc>,
    pub trigger_name: String,
    pub trigger_email: String,
}
