//! Collections exposed by the data store.

use std::fmt;

/// A collection in the external store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    User,
    Connection,
    Device,
    SosEvent,
    HelpEvent,
    Notification,
}

impl Table {
    /// Collection name as used in REST paths.
    pub fn name(self) -> &'static str {
        match self {
            Table::User => "user",
            Table::Connection => "connection",
            Table::Device => "sos_device",
            Table::SosEvent => "sos_event",
            Table::HelpEvent => "help_event",
            Table::Notification => "notification",
        }
    }

    /// Column holding the generated opaque identifier.
    pub fn key_column(self) -> &'static str {
        match self {
            Table::User => "user_id",
            Table::Connection => "connection_id",
            Table::Device => "device_id",
            Table::SosEvent => "event_id",
            Table::HelpEvent => "help_id",
            Table::Notification => "notification_id",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
