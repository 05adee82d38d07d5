//! Process configuration, loaded once at startup and immutable thereafter.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::env;

/// Relay configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the TCP listener binds to
    pub listen_addr: String,
    /// Shared secret used to verify identity tokens (HS256)
    pub token_secret: String,
    /// Per-device shared secrets, keyed by device id. Provisioned
    /// out-of-band; used only as MAC keys, never transmitted.
    pub device_secrets: HashMap<String, String>,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `HOMELINK_DEVICE_SECRETS` is a JSON map of device id -> secret,
    /// matching the provisioning format flashed into actuator firmware.
    pub fn from_env() -> Result<Self> {
        let listen_addr =
            env::var("HOMELINK_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let token_secret =
            env::var("HOMELINK_TOKEN_SECRET").context("HOMELINK_TOKEN_SECRET must be set")?;

        let device_secrets = match env::var("HOMELINK_DEVICE_SECRETS") {
            Ok(raw) => serde_json::from_str(&raw)
                .context("HOMELINK_DEVICE_SECRETS is not a valid JSON map")?,
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            listen_addr,
            token_secret,
            device_secrets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_secrets_parse() {
        let raw = r#"{"door-01":"s1","arduino-master":"s2"}"#;
        let secrets: HashMap<String, String> = serde_json::from_str(raw).unwrap();
        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets.get("door-01").map(String::as_str), Some("s1"));
    }
}
