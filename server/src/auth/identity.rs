//! Identity gate for the privileged client surface.
//!
//! Token signature and expiry verification is delegated to `jsonwebtoken`;
//! the gate keeps no session state and verifies each request independently.

use homelink_shared::Rejection;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by a verified identity token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub role: String,
    pub exp: u64,
}

/// Role attached to an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

/// Identity attached to a request after token verification.
///
/// Created per request and discarded when the request completes.
#[derive(Debug, Clone)]
pub struct Identity {
    pub subject: String,
    pub role: Role,
}

impl Identity {
    /// Require the admin role for management operations
    pub fn require_admin(&self) -> Result<(), Rejection> {
        match self.role {
            Role::Admin => Ok(()),
            Role::User => Err(Rejection::Unauthorized(format!(
                "{} is not an administrator",
                self.subject
            ))),
        }
    }
}

/// Stateless verifier for inbound identity tokens
pub struct IdentityGate {
    key: DecodingKey,
    validation: Validation,
}

impl IdentityGate {
    /// Create a gate over the configured signing secret
    pub fn new(token_secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(token_secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify a raw token and attach an identity to the request.
    ///
    /// Every verification failure (bad signature, expired, malformed) maps
    /// to `Unauthenticated`; authorization decisions happen downstream on
    /// the returned identity.
    pub fn authorize(&self, raw_token: &str) -> Result<Identity, Rejection> {
        if raw_token.is_empty() {
            return Err(Rejection::Unauthenticated("no token provided".into()));
        }

        let data = decode::<Claims>(raw_token, &self.key, &self.validation)
            .map_err(|err| Rejection::Unauthenticated(err.to_string()))?;

        let role = match data.claims.role.as_str() {
            "admin" => Role::Admin,
            _ => Role::User,
        };

        Ok(Identity {
            subject: data.claims.sub,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homelink_shared::{now_ms, RejectionKind};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-signing-secret";

    fn mint(sub: &str, role: &str, exp: u64) -> String {
        let claims = Claims {
            sub: sub.into(),
            role: role.into(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> u64 {
        now_ms() / 1000 + 3600
    }

    #[test]
    fn test_valid_token_round_trip() {
        let gate = IdentityGate::new(SECRET);
        let token = mint("alice", "admin", future_exp());

        let identity = gate.authorize(&token).expect("should verify");
        assert_eq!(identity.subject, "alice");
        assert_eq!(identity.role, Role::Admin);
        assert!(identity.require_admin().is_ok());
    }

    #[test]
    fn test_non_admin_role() {
        let gate = IdentityGate::new(SECRET);
        let token = mint("bob", "user", future_exp());

        let identity = gate.authorize(&token).expect("should verify");
        assert_eq!(identity.role, Role::User);
        assert_eq!(
            identity.require_admin().unwrap_err().kind(),
            RejectionKind::Unauthorized
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let gate = IdentityGate::new("a-different-secret");
        let token = mint("alice", "admin", future_exp());

        let err = gate.authorize(&token).unwrap_err();
        assert_eq!(err.kind(), RejectionKind::Unauthenticated);
    }

    #[test]
    fn test_expired_token_rejected() {
        let gate = IdentityGate::new(SECRET);
        let token = mint("alice", "admin", 1); // expired long ago

        let err = gate.authorize(&token).unwrap_err();
        assert_eq!(err.kind(), RejectionKind::Unauthenticated);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let gate = IdentityGate::new(SECRET);
        assert_eq!(
            gate.authorize("not.a.token").unwrap_err().kind(),
            RejectionKind::Unauthenticated
        );
        assert_eq!(
            gate.authorize("").unwrap_err().kind(),
            RejectionKind::Unauthenticated
        );
    }
}
