//! Request dispatch for the relay core.
//!
//! Each request flows through the same fixed pipeline: identity gate for
//! privileged operations, validation or device authentication, then a store
//! write followed by a broadcast. Rejections short-circuit before any state
//! is written, so a refused request never mutates the store or emits an
//! event.

use crate::auth::{DeviceAuthenticator, IdentityGate};
use crate::config::Config;
use crate::hub::BroadcastHub;
use crate::store::StateStore;
use homelink_shared::{
    validate, AcceptedCommand, CommandSet, CommandSubmission, DeviceClass, EventKind, ModuleInfo,
    Payload, Rejection, StateEvent, StatusReport,
};
use serde_json::json;
use tracing::{debug, warn};

/// The relay core: validation, authentication, state, and fan-out
pub struct Relay {
    store: StateStore,
    hub: BroadcastHub,
    devices: DeviceAuthenticator,
    gate: IdentityGate,
}

impl Relay {
    /// Assemble the relay from its startup configuration
    pub fn new(config: &Config) -> Self {
        Self {
            store: StateStore::new(),
            hub: BroadcastHub::new(),
            devices: DeviceAuthenticator::new(config.device_secrets.clone()),
            gate: IdentityGate::new(&config.token_secret),
        }
    }

    /// The broadcast hub, for the session layer to join observers against
    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Handle one request payload.
    ///
    /// Returns `None` for payloads that are not requests (a client echoing
    /// relay frames back); `Subscribe` is intercepted by the session layer,
    /// which owns the connection.
    pub async fn handle(&self, payload: &Payload) -> Option<Payload> {
        let result = match payload {
            Payload::SubmitCommand { token, submission } => {
                self.submit_command(token, submission).await
            }
            Payload::FetchCommand { device_id } => Ok(Payload::PendingCommand {
                command: self.store.get_command(device_id).await,
            }),
            Payload::ReportStatus(report) => self.report_status(report).await,
            Payload::FetchStatus { device_id } => Ok(Payload::LatestStatus {
                payload: self.store.get_status(device_id).await,
            }),
            Payload::ListModules { token } => self.list_modules(token).await,
            other => {
                warn!("Ignoring non-request payload: {:?}", other);
                return None;
            }
        };

        Some(result.unwrap_or_else(|rejection| {
            debug!("Request rejected: {}", rejection);
            Payload::Rejected(rejection.to_wire())
        }))
    }

    /// Gate, validate, store, broadcast, in that order
    async fn submit_command(
        &self,
        token: &str,
        submission: &CommandSubmission,
    ) -> Result<Payload, Rejection> {
        self.gate.authorize(token)?;
        let accepted = validate(submission)?;

        self.store
            .set_command(accepted.device.wire_name(), accepted.clone())
            .await;
        self.hub.broadcast(&command_event(&accepted)).await;

        Ok(Payload::CommandAccepted(accepted))
    }

    async fn report_status(&self, report: &StatusReport) -> Result<Payload, Rejection> {
        let verified = self.devices.authenticate(report)?;

        self.store
            .set_status(&verified.device_id, verified.payload.clone())
            .await;
        self.hub
            .broadcast(&StateEvent {
                device_id: verified.device_id.clone(),
                kind: EventKind::Status,
                data: verified.payload,
            })
            .await;

        Ok(Payload::StatusAccepted {
            device_id: verified.device_id,
        })
    }

    /// Management surface: the module inventory. Admin only.
    async fn list_modules(&self, token: &str) -> Result<Payload, Rejection> {
        self.gate.authorize(token)?.require_admin()?;

        let mut modules = Vec::with_capacity(DeviceClass::ALL.len());
        for class in DeviceClass::ALL {
            let (commands, open_parameters) = match class.command_set() {
                CommandSet::Fixed(allowed) => {
                    (allowed.iter().map(|c| c.to_string()).collect(), false)
                }
                CommandSet::Open => (Vec::new(), true),
            };

            modules.push(ModuleInfo {
                device: *class,
                commands,
                open_parameters,
                pending_command: self.store.has_command(class.wire_name()).await,
                has_status: self.store.has_status(class.wire_name()).await,
            });
        }

        Ok(Payload::ModuleList { modules })
    }
}

fn command_event(accepted: &AcceptedCommand) -> StateEvent {
    StateEvent {
        device_id: accepted.device.wire_name().to_string(),
        kind: EventKind::Command,
        data: json!({
            "device": accepted.device.wire_name(),
            "command": accepted.command,
            "parameters": accepted.parameters,
        }),
    }
}
