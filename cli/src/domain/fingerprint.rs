//! Content fingerprints for resource graphs and resource properties.

use sha2::{Digest, Sha256};
use stackcraft_common::ResourceGraph;

/// Encode bytes as lowercase hex.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(HEX[usize::from(b >> 4)]));
        out.push(char::from(HEX[usize::from(b & 0xf)]));
    }
    out
}

/// SHA-256 of `bytes` as lowercase hex.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex_encode(&Sha256::digest(bytes))
}

/// SHA-256 over the canonical JSON form of `graph`.
///
/// Two graphs with the same fingerprint declare the same resources in the
/// same order.
///
/// # Errors
///
/// Returns an error if the graph cannot be serialized.
pub fn graph_fingerprint(graph: &ResourceGraph) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_vec(graph)?;
    Ok(sha256_hex(&canonical))
}
