use ln_crypto::{decrypt, encrypt, HkdfSha256, Nonce};
use ln_vault::{FixedSecret, SecureAccess};

use crate::{NoiseError, KEY_SIZE, MAC_SIZE, MAX_HANDSHAKE_NONCE, REKEY_INTERVAL};

/// A ChaCha20-Poly1305 key, its nonce, and for transport ciphers the chaining key used to rekey.
#[derive(Debug, Default)]
pub struct CipherState {
    key: Option<FixedSecret<KEY_SIZE>>,
    chaining_key: Option<FixedSecret<KEY_SIZE>>,
    nonce: Nonce,
}

impl CipherState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Will take the `key` array into protected memory and reset the nonce
    pub fn initialize_key(&mut self, key: [u8; KEY_SIZE]) {
        self.key = Some(FixedSecret::new(key, "cipher key"));
        self.nonce = Nonce::default();
    }

    /// Transport ciphers also keep the chaining key that seeds each rekey
    pub fn initialize_key_and_chaining_key(
        &mut self,
        key: [u8; KEY_SIZE],
        chaining_key: [u8; KEY_SIZE],
    ) {
        self.initialize_key(key);
        self.chaining_key = Some(FixedSecret::new(chaining_key, "transport ck"));
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    pub fn nonce(&self) -> u64 {
        self.nonce.counter()
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce.set_counter(nonce);
    }

    /// Handshake encryption. Passes the plaintext through while no key is set.
    pub fn encrypt_with_ad(
        &mut self,
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, NoiseError> {
        if !self.has_key() {
            return Ok(plaintext.to_vec());
        }
        if self.nonce.counter() >= MAX_HANDSHAKE_NONCE {
            Err(NoiseError::NonceExhausted)?
        }
        self.seal(associated_data, plaintext)
    }

    /// Handshake decryption. Passes the ciphertext through while no key is set.
    pub fn decrypt_with_ad(
        &mut self,
        associated_data: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, NoiseError> {
        if !self.has_key() {
            return Ok(ciphertext.to_vec());
        }
        if self.nonce.counter() >= MAX_HANDSHAKE_NONCE {
            Err(NoiseError::NonceExhausted)?
        }
        self.open(associated_data, ciphertext)
    }

    /// Transport encryption with empty associated data.
    /// Rekeys first once the nonce reaches `REKEY_INTERVAL`.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        self.rekey_if_due()?;
        self.seal(&[], plaintext)
    }

    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        self.rekey_if_due()?;
        self.open(&[], ciphertext)
    }

    fn rekey_if_due(&mut self) -> Result<(), NoiseError> {
        if !self.has_key() {
            Err(NoiseError::KeysMissing)?
        }
        if self.nonce.counter() >= REKEY_INTERVAL {
            self.rekey()?;
        }
        Ok(())
    }

    /// `(ck, k) = HKDF(ck, k)` and the nonce starts over.
    pub fn rekey(&mut self) -> Result<(), NoiseError> {
        let (mut chaining_key, mut key) = match (&self.chaining_key, &self.key) {
            (Some(ck), Some(key)) => {
                ck.with(|ck| key.with(|k| HkdfSha256::extract_and_expand2(ck, k)))?
            }
            _ => Err(NoiseError::KeysMissing)?,
        };
        self.chaining_key = Some(FixedSecret::take(&mut chaining_key, "transport ck"));
        self.key = Some(FixedSecret::take(&mut key, "cipher key"));
        self.nonce = Nonce::default();
        Ok(())
    }

    fn seal(&mut self, associated_data: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let key = self.key.as_ref().ok_or(NoiseError::KeysMissing)?;
        let mut next = self.nonce;
        next.to_next()?;

        let mut ciphertext = vec![0u8; plaintext.len() + MAC_SIZE];
        let nonce = self.nonce.as_bytes();
        key.with(|k| encrypt(&mut ciphertext, plaintext, k, &nonce, associated_data))?;
        self.nonce = next;
        Ok(ciphertext)
    }

    /// Leaves the nonce untouched when authentication fails
    fn open(&mut self, associated_data: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let key = self.key.as_ref().ok_or(NoiseError::KeysMissing)?;
        if ciphertext.len() < MAC_SIZE {
            Err(NoiseError::DecryptionFailed)?
        }
        let mut next = self.nonce;
        next.to_next()?;

        let mut plaintext = vec![0u8; ciphertext.len() - MAC_SIZE];
        let nonce = self.nonce.as_bytes();
        key.with(|k| decrypt(&mut plaintext, ciphertext, k, &nonce, associated_data))?;
        self.nonce = next;
        Ok(plaintext)
    }

    #[cfg(test)]
    pub(crate) fn key_bytes(&self) -> Option<[u8; KEY_SIZE]> {
        self.key.as_ref().map(|key| key.copy())
    }

    #[cfg(test)]
    pub(crate) fn chaining_key_bytes(&self) -> Option<[u8; KEY_SIZE]> {
        self.chaining_key.as_ref().map(|ck| ck.copy())
    }
}
