//! Homelink Shared Protocol Types
//!
//! This crate provides the wire protocol, framing codec, command vocabulary,
//! and payload canonicalization shared between the relay server, control
//! clients, and actuator firmware bridges.

pub mod canonical;
pub mod codec;
pub mod validator;
pub mod vocabulary;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub use validator::validate;
pub use vocabulary::{CommandSet, DeviceClass};

/// Structured key/value parameters carried by commands and status payloads.
pub type Params = serde_json::Map<String, Value>;

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Message header attached to every frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub sender: String,
    pub sequence_id: u64,
    pub timestamp_ms: u64,
}

impl Header {
    /// Create a new header with the given sender and sequence number
    pub fn new(sender: impl Into<String>, sequence_id: u64) -> Self {
        Self {
            sender: sender.into(),
            sequence_id,
            timestamp_ms: now_ms(),
        }
    }
}

/// Top-level wire message: header plus one protocol payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub header: Header,
    pub payload: Payload,
}

/// Protocol payloads for both directions of the relay link
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    // Client/actuator -> relay
    SubmitCommand {
        token: String,
        #[serde(flatten)]
        submission: CommandSubmission,
    },
    FetchCommand {
        device_id: String,
    },
    ReportStatus(StatusReport),
    FetchStatus {
        device_id: String,
    },
    Subscribe,
    ListModules {
        token: String,
    },

    // Relay -> client/actuator
    CommandAccepted(AcceptedCommand),
    PendingCommand {
        command: Option<AcceptedCommand>,
    },
    StatusAccepted {
        device_id: String,
    },
    LatestStatus {
        payload: Option<Value>,
    },
    Subscribed,
    ModuleList {
        modules: Vec<ModuleInfo>,
    },
    Rejected(WireRejection),
    Event(StateEvent),
}

/// Raw command submission as received from a control client.
///
/// Exists only during validation; `validate` turns it into an
/// [`AcceptedCommand`] or a [`Rejection`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSubmission {
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// A validated command, as held in the relay's latest-command slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedCommand {
    pub device: DeviceClass,
    pub command: String,
    pub parameters: Params,
}

/// Status report from an actuator, authenticated by a keyed hash
/// over the canonicalized payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub mac: String,
}

/// State-change event pushed to all subscribed observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEvent {
    pub device_id: String,
    pub kind: EventKind,
    pub data: Value,
}

/// What kind of state changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Command,
    Status,
}

/// One vocabulary entry as reported on the management surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub device: DeviceClass,
    pub commands: Vec<String>,
    pub open_parameters: bool,
    pub pending_command: bool,
    pub has_status: bool,
}

/// Why a submission, report, or privileged request was refused.
///
/// Every variant is a client-input or auth failure; none of them are
/// process faults and none of them mutate relay state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("unknown device: {0}")]
    UnknownDevice(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("structured parameters are required")]
    MissingParameters,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

/// Machine-readable rejection discriminant, as serialized on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionKind {
    MissingField,
    UnknownDevice,
    UnknownCommand,
    MissingParameters,
    InvalidSignature,
    Unauthenticated,
    Unauthorized,
}

/// Wire form of a rejection: machine-readable kind plus human-readable detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRejection {
    pub kind: RejectionKind,
    pub detail: String,
}

impl Rejection {
    /// The machine-readable kind for this rejection
    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::MissingField(_) => RejectionKind::MissingField,
            Rejection::UnknownDevice(_) => RejectionKind::UnknownDevice,
            Rejection::UnknownCommand(_) => RejectionKind::UnknownCommand,
            Rejection::MissingParameters => RejectionKind::MissingParameters,
            Rejection::InvalidSignature => RejectionKind::InvalidSignature,
            Rejection::Unauthenticated(_) => RejectionKind::Unauthenticated,
            Rejection::Unauthorized(_) => RejectionKind::Unauthorized,
        }
    }

    /// Convert to the wire representation
    pub fn to_wire(&self) -> WireRejection {
        WireRejection {
            kind: self.kind(),
            detail: self.to_string(),
        }
    }
}
