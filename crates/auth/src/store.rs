//! Process-wide credential cache keyed by agent.
//!
//! The outer map lock is only held long enough to find or insert a slot.
//! Each slot has its own lock, so writers to one agent never block readers
//! or writers of another, and a reader never observes a half-written
//! credential.

use std::collections::HashMap;
use std::sync::Arc;

use formgate_types::{AgentId, Credential};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

#[derive(Debug, Default)]
pub struct CredentialStore {
    slots: Mutex<HashMap<AgentId, Arc<RwLock<Credential>>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of the agent's credential, if one has been stored.
    pub async fn get(&self, agent: &AgentId) -> Option<Credential> {
        let slot = self.slots.lock().await.get(agent).cloned()?;
        let credential = slot.read().await.clone();
        Some(credential)
    }

    /// Store a credential for the agent, replacing any previous one.
    pub async fn set(&self, agent: &AgentId, credential: Credential) {
        let existing = {
            let mut slots = self.slots.lock().await;
            match slots.get(agent) {
                Some(slot) => Some(Arc::clone(slot)),
                None => {
                    slots.insert(agent.clone(), Arc::new(RwLock::new(credential.clone())));
                    None
                }
            }
        };

        let replaced = match existing {
            Some(slot) => {
                *slot.write().await = credential;
                true
            }
            None => false,
        };
        debug!(agent_id = %agent, replaced, "credential stored");
    }
}
