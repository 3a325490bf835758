//! Shared fixtures for engine tests.

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use store::{connection, device, user, Device, MemoryStore, NewUser};

use crate::token::TokenConfig;
use crate::{Engine, SharedStore};

pub struct Harness {
    pub memory: MemoryStore,
    pub store: SharedStore,
    engine: Engine,
}

impl Deref for Harness {
    type Target = Engine;

    fn deref(&self) -> &Engine {
        &self.engine
    }
}

pub fn harness() -> Harness {
    let memory = MemoryStore::new();
    let store: SharedStore = Arc::new(memory.clone());
    let engine = Engine::new(
        store.clone(),
        TokenConfig::new("test-secret", Duration::from_secs(3600)),
    );

    Harness {
        memory,
        store,
        engine,
    }
}

pub async fn seed_user(h: &Harness, name: &str, email: &str) -> String {
    user::create_user(
        h.store.as_ref(),
        &NewUser {
            user_name: name.to_string(),
            user_email: email.to_string(),
            user_password: "x".to_string(),
        },
    )
    .await
    .unwrap()
    .user_id
}

pub async fn seed_device(h: &Harness, device_id: &str, owner_id: &str) {
    device::create_device(
        h.store.as_ref(),
        &Device {
            device_id: device_id.to_string(),
            owner_id: owner_id.to_string(),
            is_online: false,
            last_triggered_at: None,
            last_seen_at: None,
        },
    )
    .await
    .unwrap();
}

pub async fn connect(h: &Harness, a: &str, b: &str) {
    connection::create_connection(h.store.as_ref(), a, b)
        .await
        .unwrap();
}
