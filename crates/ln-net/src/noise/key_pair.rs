use std::fmt;

use ln_crypto::{
    ecdh, generate_private_key, to_hex, validate_private_key, validate_public_key,
    PRIVATE_KEY_SIZE, SHARED_SECRET_SIZE,
};
use ln_vault::{FixedSecret, SecureAccess, SecureRef};

use crate::{NoiseError, DHLEN};

/// A secp256k1 key pair. The private scalar never leaves its `FixedSecret`.
#[derive(Debug)]
pub struct KeyPair {
    private: FixedSecret<PRIVATE_KEY_SIZE>,
    public: PublicKey,
}

impl KeyPair {
    /// Fresh key pair from the OS random number generator.
    pub fn generate() -> Result<Self, NoiseError> {
        let mut private = FixedSecret::zeroed("ephemeral key");
        private.with_mut(generate_private_key)?;
        Self::from_secret(private)
    }

    pub fn from_private(private: &[u8], tag: &'static str) -> Result<Self, NoiseError> {
        validate_private_key(private).map_err(|_| NoiseError::InvalidKeyMaterial)?;
        let mut bytes = [0u8; PRIVATE_KEY_SIZE];
        bytes.copy_from_slice(private);
        Self::from_secret(FixedSecret::take(&mut bytes, tag))
    }

    fn from_secret(private: FixedSecret<PRIVATE_KEY_SIZE>) -> Result<Self, NoiseError> {
        let public = private.with(ln_crypto::public_key)?;
        Ok(Self {
            private,
            public: PublicKey(public),
        })
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// ECDH between this private key and `remote`, zeroed once the result is dropped.
    pub fn dh(
        &self,
        remote: &PublicKey,
    ) -> Result<SecureRef<[u8; SHARED_SECRET_SIZE]>, NoiseError> {
        Ok(SecureRef::new(
            self.private.with(|private| ecdh(private, remote.as_bytes()))?,
        ))
    }
}

/// A compressed secp256k1 public key, validated on construction.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct PublicKey([u8; DHLEN]);

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NoiseError> {
        validate_public_key(bytes).map_err(|_| NoiseError::InvalidPublicKey)?;
        let mut key = [0u8; DHLEN];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; DHLEN] {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; DHLEN] {
        self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hex = [0u8; 2 * DHLEN];
        to_hex(&self.0, &mut hex).map_err(|_| fmt::Error)?;
        f.write_str(std::str::from_utf8(&hex).map_err(|_| fmt::Error)?)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({self})")
    }
}
