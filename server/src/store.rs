//! Latest-value state store, keyed by device identifier.
//!
//! Holds exactly one pending command and one reported status per device.
//! Every write replaces the previous value whole; there is no history and
//! no queue. A command issued before the previous one was fetched silently
//! supersedes it.

use homelink_shared::AcceptedCommand;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-wide store of the latest command and status per device
#[derive(Default)]
pub struct StateStore {
    commands: RwLock<HashMap<String, AcceptedCommand>>,
    statuses: RwLock<HashMap<String, Value>>,
}

impl StateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending command for a device
    pub async fn set_command(&self, device_id: &str, command: AcceptedCommand) {
        let mut commands = self.commands.write().await;
        commands.insert(device_id.to_string(), command);
    }

    /// Get the pending command for a device, if any
    pub async fn get_command(&self, device_id: &str) -> Option<AcceptedCommand> {
        let commands = self.commands.read().await;
        commands.get(device_id).cloned()
    }

    /// Replace the latest verified status for a device
    pub async fn set_status(&self, device_id: &str, payload: Value) {
        let mut statuses = self.statuses.write().await;
        statuses.insert(device_id.to_string(), payload);
    }

    /// Get the latest verified status for a device, if any
    pub async fn get_status(&self, device_id: &str) -> Option<Value> {
        let statuses = self.statuses.read().await;
        statuses.get(device_id).cloned()
    }

    /// Whether a pending command is currently held for a device
    pub async fn has_command(&self, device_id: &str) -> bool {
        self.commands.read().await.contains_key(device_id)
    }

    /// Whether a status has been reported for a device
    pub async fn has_status(&self, device_id: &str) -> bool {
        self.statuses.read().await.contains_key(device_id)
    }
}
