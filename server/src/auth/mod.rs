//! Authentication for the two inbound surfaces
//!
//! This module handles:
//! - Keyed-hash verification of actuator status reports
//! - Identity token verification for the privileged client surface

mod device;
mod identity;

pub use device::{DeviceAuthenticator, VerifiedStatus};
pub use identity::{Claims, Identity, IdentityGate, Role};
