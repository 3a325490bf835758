//! Core of the SOS service.
//!
//! Resolves who is acting, runs the SOS and help toggles, and fans
//! notifications out to connections. Holds no state between calls: every
//! operation re-reads what it needs from the [`Store`](store::Store).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use sos_engine::{Engine, TokenConfig};
//! use store::MemoryStore;
//!
//! # async fn example() -> sos_engine::Result<()> {
//! let engine = Engine::new(
//!     Arc::new(MemoryStore::new()),
//!     TokenConfig::new("secret", Duration::from_secs(8 * 3600)),
//! );
//!
//! let principal = engine.identity.resolve(Some("Bearer eyJ...")).await?;
//! let outcome = engine.sos.toggle(&principal).await?;
//! println!("active: {}", outcome.is_active());
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod connections;
pub mod devices;
pub mod error;
pub mod help;
pub mod history;
pub mod identity;
pub mod notify;
pub mod sos;
pub mod token;

#[cfg(test)]
mod testing;

use std::sync::Arc;

pub use accounts::{Accounts, Session, UserProfile};
pub use connections::{ConnectionSummary, Connections};
pub use devices::DeviceRegistry;
pub use error::{EngineError, Result};
pub use help::{HelpDesk, HelpOutcome};
pub use history::{ActiveSos, EventFilter, History};
pub use identity::{IdentityResolver, Principal};
pub use notify::Notifier;
pub use sos::{SosMachine, ToggleOutcome};
pub use token::{Claims, TokenConfig, TokenIssuer};

/// Shared handle to the data store.
pub type SharedStore = Arc<dyn store::Store>;

/// Every engine component, wired to one store.
#[derive(Clone)]
pub struct Engine {
    pub tokens: TokenIssuer,
    pub identity: IdentityResolver,
    pub devices: DeviceRegistry,
    pub notifier: Notifier,
    pub sos: SosMachine,
    pub help: HelpDesk,
    pub accounts: Accounts,
    pub connections: Connections,
    pub history: History,
}

impl Engine {
    pub fn new(store: SharedStore, tokens: TokenConfig) -> Self {
        let tokens = TokenIssuer::new(tokens);
        let devices = DeviceRegistry::new(store.clone());
        let notifier = Notifier::new(store.clone());

        Self {
            identity: IdentityResolver::new(tokens.clone(), store.clone()),
            sos: SosMachine::new(store.clone(), devices.clone(), notifier.clone()),
            help: HelpDesk::new(store.clone(), devices.clone(), notifier.clone()),
            accounts: Accounts::new(store.clone(), tokens.clone(), devices.clone()),
            connections: Connections::new(store.clone()),
            history: History::new(store),
            tokens,
            devices,
            notifier,
        }
    }
}
