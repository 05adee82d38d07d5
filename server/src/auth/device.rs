//! Device authentication for inbound status reports.
//!
//! A report is admitted only if its MAC proves possession of the device's
//! provisioned shared secret. The tag is recomputed over the canonicalized
//! payload and compared in constant time; per-device secrets are long-lived
//! and shared across many requests, so a short-circuiting compare would be
//! a usable timing oracle.

use homelink_shared::{canonical, Rejection, StatusReport};
use serde_json::Value;
use std::collections::HashMap;

/// A status report that passed the keyed-hash check
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedStatus {
    pub device_id: String,
    pub payload: Value,
}

/// Verifies status reports against per-device shared secrets
pub struct DeviceAuthenticator {
    secrets: HashMap<String, String>,
}

impl DeviceAuthenticator {
    /// Create an authenticator over the provisioned secret map
    pub fn new(secrets: HashMap<String, String>) -> Self {
        Self { secrets }
    }

    /// Verify a status report: field presence, then device provisioning,
    /// then the MAC itself.
    ///
    /// An unprovisioned device is indistinguishable from an unknown one at
    /// the protocol level, so both reject as `UnknownDevice`.
    pub fn authenticate(&self, report: &StatusReport) -> Result<VerifiedStatus, Rejection> {
        if report.device_id.is_empty() {
            return Err(Rejection::MissingField("device_id"));
        }
        if report.payload.is_null() {
            return Err(Rejection::MissingField("payload"));
        }
        if report.mac.is_empty() {
            return Err(Rejection::MissingField("mac"));
        }

        let secret = self
            .secrets
            .get(&report.device_id)
            .ok_or_else(|| Rejection::UnknownDevice(report.device_id.clone()))?;

        if !canonical::verify(secret.as_bytes(), &report.payload, &report.mac) {
            return Err(Rejection::InvalidSignature);
        }

        Ok(VerifiedStatus {
            device_id: report.device_id.clone(),
            payload: report.payload.clone(),
        })
    }
}
