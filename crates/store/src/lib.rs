//! Data store boundary for the SOS service.
//!
//! All persistence and query execution live in an external REST-queryable
//! store. This crate provides:
//!
//! - The [`Store`] trait and a [`Query`] builder for filters, ordering and limits
//! - [`RestStore`], an HTTP client for PostgREST-compatible endpoints
//! - [`MemoryStore`], an in-process store with the same semantics
//! - Typed row models and per-collection operations
//!
//! # Example
//!
//! ```no_run
//! use store::{device, RestStore, StoreConfig};
//!
//! # async fn example() -> store::Result<()> {
//! let store = RestStore::new(StoreConfig::new("https://project.supabase.co", "api-key"))?;
//! if let Some(device) = device::get_device(&store, "8f1c...").await? {
//!     println!("{} online: {}", device.device_id, device.is_online);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod query;
pub mod rest;
pub mod table;

pub mod connection;
pub mod device;
pub mod help_event;
pub mod notification;
pub mod sos_event;
pub mod user;

pub use client::Store;
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use memory::{Fault, MemoryStore};
pub use models::{
    Connection, Device, HelpEvent, NewHelpEvent, NewNotification, NewSosEvent, NewUser,
    Notification, SosEvent, User,
};
pub use query::Query;
pub use rest::RestStore;
pub use table::Table;
