use crate::{CipherState, HandshakePattern, NoiseError, HASHLEN};
use ln_crypto::{sha256_concat, HkdfSha256};
use ln_vault::{FixedSecret, SecureAccess};
use zeroize::Zeroize;

/// `(initiator -> responder, responder -> initiator, handshake hash)`
pub type SplitResult = (CipherState, CipherState, [u8; HASHLEN]);

#[derive(Debug)]
pub struct SymmetricState {
    cipher_state: CipherState,
    ck: FixedSecret<HASHLEN>,
    h: FixedSecret<HASHLEN>,
}

impl SymmetricState {
    pub fn initialize_symmetric(pattern: HandshakePattern) -> Self {
        Self {
            cipher_state: CipherState::new(),
            ck: FixedSecret::new(pattern.to_bytes(), "ck"),
            h: FixedSecret::new(pattern.to_bytes(), "h"),
        }
    }

    pub fn has_key(&self) -> bool {
        self.cipher_state.has_key()
    }

    pub fn mix_key(&mut self, input_key_material: &[u8]) -> Result<(), NoiseError> {
        let (mut ck, mut temp_k) = self
            .ck
            .with(|ck| HkdfSha256::extract_and_expand2(ck, input_key_material))?;
        self.ck.set(&mut ck);
        self.cipher_state.initialize_key(temp_k);
        temp_k.zeroize();
        Ok(())
    }

    pub fn mix_hash(&mut self, data: &[u8]) {
        self.h.with_mut(|h| {
            let next = sha256_concat(&[h.as_slice(), data]);
            h.copy_from_slice(&next)
        })
    }

    pub fn get_handshake_hash(&self) -> [u8; HASHLEN] {
        self.h.copy()
    }

    pub fn encrypt_and_hash(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let ciphertext = self
            .h
            .with(|h| self.cipher_state.encrypt_with_ad(h, plaintext))?;
        self.mix_hash(&ciphertext);
        Ok(ciphertext)
    }

    pub fn decrypt_and_hash(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let plaintext = self
            .h
            .with(|h| self.cipher_state.decrypt_with_ad(h, ciphertext))?;
        self.mix_hash(ciphertext);
        Ok(plaintext)
    }

    /// Derives both transport ciphers, each keeping the final chaining key for rekeying.
    /// Every secret held here is zeroed afterwards.
    pub fn split(&mut self) -> Result<SplitResult, NoiseError> {
        let (mut k1, mut k2) = self
            .ck
            .with(|ck| HkdfSha256::extract_and_expand2(ck, &[]))?;
        let mut c1 = CipherState::new();
        let mut c2 = CipherState::new();
        c1.initialize_key_and_chaining_key(k1, self.ck.copy());
        c2.initialize_key_and_chaining_key(k2, self.ck.copy());
        k1.zeroize();
        k2.zeroize();

        let handshake_hash = self.get_handshake_hash();
        self.clear();
        Ok((c1, c2, handshake_hash))
    }

    /// Drops the cipher key and zeroes `ck` and `h`.
    pub fn clear(&mut self) {
        self.cipher_state = CipherState::new();
        self.ck.zeroize();
        self.h.zeroize();
    }
}
