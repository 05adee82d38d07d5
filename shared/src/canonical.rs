//! Deterministic payload canonicalization and keyed-MAC helpers.
//!
//! The actuator signs what it sends and the relay recomputes the tag over
//! what it received, so both sides must agree byte-for-byte on the encoding.
//! Object keys are emitted in sorted order at every nesting level; arrays
//! keep their element order.

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Encode a payload as canonical JSON bytes.
///
/// Logically equal payloads always produce identical bytes, regardless of
/// the field order they were built or parsed with.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    write_canonical(value, &mut out)?;
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) -> Result<(), serde_json::Error> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();

            out.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                out.extend_from_slice(serde_json::to_string(key)?.as_bytes());
                out.push(b':');
                write_canonical(&map[key.as_str()], out)?;
            }
            out.push(b'}');
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out)?;
            }
            out.push(b']');
        }
        scalar => out.extend_from_slice(serde_json::to_string(scalar)?.as_bytes()),
    }
    Ok(())
}

fn keyed_hash(secret: &[u8], bytes: &[u8]) -> HmacSha256 {
    // HMAC-SHA256 accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC key length");
    mac.update(bytes);
    mac
}

/// Compute the hex MAC tag for a payload.
///
/// This is the actuator side of the handshake; the relay only ever verifies.
pub fn sign(secret: &[u8], payload: &Value) -> Result<String, serde_json::Error> {
    let bytes = canonical_bytes(payload)?;
    Ok(hex::encode(keyed_hash(secret, &bytes).finalize().into_bytes()))
}

/// Verify a hex MAC tag against a payload in constant time.
///
/// Returns `false` for malformed hex and for canonicalization faults; the
/// caller cannot distinguish those from a plain tag mismatch, so neither key
/// material nor payload fragments can leak through the failure path.
pub fn verify(secret: &[u8], payload: &Value, tag_hex: &str) -> bool {
    let Ok(bytes) = canonical_bytes(payload) else {
        return false;
    };
    let Ok(tag) = hex::decode(tag_hex) else {
        return false;
    };
    keyed_hash(secret, &bytes).verify_slice(&tag).is_ok()
}
