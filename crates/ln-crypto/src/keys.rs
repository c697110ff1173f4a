use crate::{CryptoError, NONCE_SIZE};
use chacha20poly1305::{aead::AeadMutInPlace, ChaCha20Poly1305, KeyInit};
use rand::{rngs::OsRng, TryRngCore};
use zeroize::Zeroize;

pub const TAG_SIZE: usize = 16;
pub const KEY_SIZE: usize = 32;

impl From<hex::FromHexError> for CryptoError {
    fn from(_: hex::FromHexError) -> Self {
        CryptoError::HexError
    }
}

impl From<digest::InvalidLength> for CryptoError {
    fn from(_: digest::InvalidLength) -> Self {
        CryptoError::InvalidKeyLength
    }
}

pub fn to_hex(bytes: &[u8], str: &mut [u8]) -> Result<(), CryptoError> {
    Ok(hex::encode_to_slice(bytes, str)?)
}

pub fn from_hex(str: &[u8], bytes: &mut [u8]) -> Result<(), CryptoError> {
    Ok(hex::decode_to_slice(str, bytes)?)
}

pub fn fill_random(dest: &mut [u8]) -> Result<(), CryptoError> {
    OsRng
        .try_fill_bytes(dest)
        .map_err(|_| CryptoError::OsRngError)
}

/// ChaCha20-Poly1305 encryption of `plaintext` into `dest`, which receives `ciphertext || tag`.
/// `dest` must hold at least `plaintext.len() + TAG_SIZE` bytes.
pub fn encrypt(
    dest: &mut [u8],
    plaintext: &[u8],
    key: &[u8],
    nonce: &[u8; NONCE_SIZE],
    associated_data: &[u8],
) -> Result<(), CryptoError> {
    let p_len = plaintext.len();
    if dest.len() < p_len + TAG_SIZE {
        return Err(CryptoError::DestTooSmall);
    }
    let mut cipher = <ChaCha20Poly1305 as KeyInit>::new_from_slice(key)?;
    dest[..p_len].copy_from_slice(plaintext);
    let tag = cipher
        .encrypt_in_place_detached(
            chacha20poly1305::Nonce::from_slice(nonce),
            associated_data,
            &mut dest[..p_len],
        )
        .map_err(|_| {
            dest.zeroize();
            CryptoError::EncryptionError
        })?;
    dest[p_len..p_len + TAG_SIZE].copy_from_slice(&tag);
    Ok(())
}

/// Verifies and decrypts `ciphertext || tag` into `dest`.
/// On a tag mismatch `dest` is zeroed and nothing of the plaintext is released.
pub fn decrypt(
    dest: &mut [u8],
    ciphertext: &[u8],
    key: &[u8],
    nonce: &[u8; NONCE_SIZE],
    associated_data: &[u8],
) -> Result<(), CryptoError> {
    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::DecryptionError);
    }
    let c_len = ciphertext.len() - TAG_SIZE;
    if dest.len() < c_len {
        return Err(CryptoError::DestTooSmall);
    }
    let mut cipher = <ChaCha20Poly1305 as KeyInit>::new_from_slice(key)?;

    let (data, tag) = ciphertext.split_at(c_len);
    dest[..c_len].copy_from_slice(data);

    cipher
        .decrypt_in_place_detached(
            chacha20poly1305::Nonce::from_slice(nonce),
            associated_data,
            &mut dest[..c_len],
            chacha20poly1305::Tag::from_slice(tag),
        )
        .map_err(|_| {
            dest.zeroize();
            CryptoError::DecryptionError
        })?;
    Ok(())
}
