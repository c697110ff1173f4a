pub const NONCE_SIZE: usize = 12;

#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum NonceError {
    #[error("nonce counter exhausted")]
    EndOfCounter,
}

/// Zero(4 bytes) || Counter(8 bytes, little-endian) - the ChaChaPoly nonce layout Noise uses.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Nonce {
    counter: u64,
}

impl Nonce {
    pub fn new(counter: u64) -> Self {
        Self { counter }
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn set_counter(&mut self, counter: u64) {
        self.counter = counter;
    }

    /// Advances the counter, refusing to wrap.
    pub fn to_next(&mut self) -> Result<(), NonceError> {
        self.counter = self
            .counter
            .checked_add(1)
            .ok_or(NonceError::EndOfCounter)?;
        Ok(())
    }

    pub fn as_bytes(&self) -> [u8; NONCE_SIZE] {
        let mut bytes = [0u8; NONCE_SIZE];
        bytes[4..].copy_from_slice(&self.counter.to_le_bytes());
        bytes
    }
}
