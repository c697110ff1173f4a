use ln_crypto::{CryptoError, NonceError};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum NoiseError {
    #[error("invalid local or remote static key material")]
    InvalidKeyMaterial,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("handshake already complete")]
    HandshakeAlreadyComplete,
    #[error("handshake previously failed")]
    HandshakeFailed,
    #[error("message out of turn")]
    OutOfTurn,
    #[error("invalid handshake version {0}")]
    InvalidVersion(u8),
    #[error("invalid message length: expected {expected} bytes, got {actual}")]
    InvalidMessageLength { expected: usize, actual: usize },
    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
    #[error("payload too large: {0} bytes (max 65535)")]
    PayloadTooLarge(usize),
    #[error("decryption failed")]
    DecryptionFailed,
    #[error("nonce exhausted")]
    NonceExhausted,
    #[error("cipher keys missing")]
    KeysMissing,
    #[error("frame payload read before its length")]
    FrameOutOfOrder,
    #[error("remote static key does not match the expected key")]
    RemoteStaticMismatch,
    #[error("crypto error: {0}")]
    Crypto(CryptoError),
}

impl From<CryptoError> for NoiseError {
    fn from(value: CryptoError) -> Self {
        match value {
            CryptoError::DecryptionError => NoiseError::DecryptionFailed,
            CryptoError::InvalidPublicKey => NoiseError::InvalidPublicKey,
            other => NoiseError::Crypto(other),
        }
    }
}

impl From<NonceError> for NoiseError {
    fn from(_: NonceError) -> Self {
        NoiseError::NonceExhausted
    }
}
