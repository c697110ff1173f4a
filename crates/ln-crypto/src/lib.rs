mod ecdh;
mod hash;
mod hkdf;
mod keys;
mod nonce;

pub use ecdh::{
    ecdh, generate_private_key, public_key, validate_private_key, validate_public_key,
    PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE, SHARED_SECRET_SIZE,
};
pub use hash::{sha256, sha256_concat, HASH_SIZE};
pub use hkdf::{Hkdf, HkdfSha256};
pub use keys::{decrypt, encrypt, fill_random, from_hex, to_hex, KEY_SIZE, TAG_SIZE};
pub use nonce::{Nonce, NonceError, NONCE_SIZE};

#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid hex encoding")]
    HexError,
    #[error("invalid key length")]
    InvalidKeyLength,
    #[error("invalid secp256k1 secret key")]
    InvalidSecretKey,
    #[error("invalid secp256k1 public key")]
    InvalidPublicKey,
    #[error("os random number generator failed")]
    OsRngError,
    #[error("destination buffer too small")]
    DestTooSmall,
    #[error("hkdf output too long")]
    HkdfExpandTooLong,
    #[error("aead encryption failed")]
    EncryptionError,
    #[error("aead decryption failed")]
    DecryptionError,
}
