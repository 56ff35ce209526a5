use std::hash::{Hash, Hasher};

use isa_core::errors::IsaError;
use serde::Serialize;
use sha2::{Digest, Sha256};
use siphasher::sip::SipHasher13;

use crate::serde::to_canonical_json_bytes;

/// Computes a stable hexadecimal SHA256 digest of the canonical JSON encoding.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, IsaError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// Computes a process-independent 64-bit fingerprint from a value's `Hash` impl.
///
/// Uses SipHash-1-3 with fixed zero keys so the result does not depend on the
/// randomly seeded `std` hasher.
pub fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    value.hash(&mut hasher);
    hasher.finish()
}
