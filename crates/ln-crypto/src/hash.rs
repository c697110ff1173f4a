use sha2::{Digest, Sha256};

pub const HASH_SIZE: usize = 32;

pub fn sha256(data: &[u8]) -> [u8; HASH_SIZE] {
    Sha256::digest(data).into()
}

/// Hashes the concatenation of `parts` without allocating the joined buffer.
pub fn sha256_concat(parts: &[&[u8]]) -> [u8; HASH_SIZE] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
