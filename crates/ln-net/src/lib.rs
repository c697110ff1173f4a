// Lightning's peer transport (BOLT 8): Noise_XK_secp256k1_ChaChaPoly_SHA256 as described at noiseprotocol.org/noise.html

const KEY_SIZE: usize = ln_crypto::KEY_SIZE;
const HASHLEN: usize = ln_crypto::HASH_SIZE;
const DHLEN: usize = ln_crypto::PUBLIC_KEY_SIZE; // compressed secp256k1 point

pub const PROLOGUE: &[u8] = b"lightning";
pub const HANDSHAKE_VERSION: u8 = 0;

/// Largest plaintext a transport frame (or a whole handshake act) may carry.
pub const MAX_MESSAGE_SIZE: usize = u16::MAX as usize;
pub const MAC_SIZE: usize = ln_crypto::TAG_SIZE;
pub const LENGTH_HEADER_SIZE: usize = 2;
pub const ENCRYPTED_LENGTH_SIZE: usize = LENGTH_HEADER_SIZE + MAC_SIZE;

pub const ACT_ONE_SIZE: usize = 1 + DHLEN + MAC_SIZE;
pub const ACT_TWO_SIZE: usize = 1 + DHLEN + MAC_SIZE;
pub const ACT_THREE_SIZE: usize = 1 + DHLEN + MAC_SIZE + MAC_SIZE;

/// Transport ciphers rotate their key once the nonce reaches this value.
pub const REKEY_INTERVAL: u64 = 1000;
/// Each handshake key encrypts at most two messages; anything past this is a state bug.
pub const MAX_HANDSHAKE_NONCE: u64 = 8;

mod connection;
mod noise;

pub use connection::{ConnectionConfig, ConnectionError, NoiseConnection};
pub use noise::{
    cipher_state::CipherState,
    handshake_pattern::{message_overhead, HandshakePattern, HandshakeToken, KeyRef, Role},
    handshake_state::{HandshakePhase, HandshakeResult, HandshakeState},
    key_pair::{KeyPair, PublicKey},
    noise_error::NoiseError,
    symmetric_state::{SplitResult, SymmetricState},
    transport::Transport,
};
