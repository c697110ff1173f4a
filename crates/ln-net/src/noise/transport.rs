use crate::{
    CipherState, NoiseError, PublicKey, ENCRYPTED_LENGTH_SIZE, HASHLEN, LENGTH_HEADER_SIZE,
    MAC_SIZE, MAX_MESSAGE_SIZE,
};

/// Post-handshake framing: every message is an encrypted big-endian `u16` length
/// followed by the encrypted payload, each sealed under the next sending nonce.
#[derive(Debug)]
pub struct Transport {
    sending: CipherState,
    receiving: CipherState,
    handshake_hash: [u8; HASHLEN],
    remote_static: PublicKey,
    pending_len: Option<usize>,
    read_failed: bool,
}

impl Transport {
    pub(crate) fn new(
        sending: CipherState,
        receiving: CipherState,
        handshake_hash: [u8; HASHLEN],
        remote_static: PublicKey,
    ) -> Self {
        Self {
            sending,
            receiving,
            handshake_hash,
            remote_static,
            pending_len: None,
            read_failed: false,
        }
    }

    pub fn handshake_hash(&self) -> &[u8; HASHLEN] {
        &self.handshake_hash
    }

    pub fn remote_static(&self) -> &PublicKey {
        &self.remote_static
    }

    pub fn sending_nonce(&self) -> u64 {
        self.sending.nonce()
    }

    pub fn receiving_nonce(&self) -> u64 {
        self.receiving.nonce()
    }

    /// Frames `payload` as `encrypted length (18 bytes) || encrypted payload (len + 16 bytes)`.
    pub fn write_message(&mut self, payload: &[u8]) -> Result<Vec<u8>, NoiseError> {
        if payload.len() > MAX_MESSAGE_SIZE {
            Err(NoiseError::PayloadTooLarge(payload.len()))?
        }
        let length = (payload.len() as u16).to_be_bytes();
        let header = self.sending.encrypt(&length)?;
        let body = self.sending.encrypt(payload)?;

        let mut frame = Vec::with_capacity(header.len() + body.len());
        frame.extend_from_slice(&header);
        frame.extend_from_slice(&body);
        Ok(frame)
    }

    /// Decrypts the 18 byte length prefix and returns the payload length that follows.
    /// The ciphertext to read next is `len + MAC_SIZE` bytes.
    pub fn read_message_length(&mut self, header: &[u8]) -> Result<usize, NoiseError> {
        self.check_readable()?;
        if self.pending_len.is_some() {
            Err(NoiseError::FrameOutOfOrder)?
        }
        if header.len() != ENCRYPTED_LENGTH_SIZE {
            Err(NoiseError::InvalidMessageLength {
                expected: ENCRYPTED_LENGTH_SIZE,
                actual: header.len(),
            })?
        }
        let length = self.decrypt(header)?;
        let mut bytes = [0u8; LENGTH_HEADER_SIZE];
        bytes.copy_from_slice(&length);
        let len = u16::from_be_bytes(bytes) as usize;
        self.pending_len = Some(len);
        Ok(len)
    }

    pub fn read_message_payload(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        self.check_readable()?;
        let len = self.pending_len.ok_or(NoiseError::FrameOutOfOrder)?;
        if ciphertext.len() != len + MAC_SIZE {
            Err(NoiseError::InvalidMessageLength {
                expected: len + MAC_SIZE,
                actual: ciphertext.len(),
            })?
        }
        let payload = self.decrypt(ciphertext)?;
        self.pending_len = None;
        Ok(payload)
    }

    /// A receiving stream that failed to authenticate is never read again.
    fn check_readable(&self) -> Result<(), NoiseError> {
        if self.read_failed {
            Err(NoiseError::DecryptionFailed)?
        }
        Ok(())
    }

    fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        self.receiving.decrypt(ciphertext).inspect_err(|_| {
            self.read_failed = true;
            self.pending_len = None;
        })
    }

    /// Reads one complete frame as produced by `write_message`.
    pub fn read_message(&mut self, frame: &[u8]) -> Result<Vec<u8>, NoiseError> {
        if frame.len() < ENCRYPTED_LENGTH_SIZE {
            Err(NoiseError::InvalidMessageLength {
                expected: ENCRYPTED_LENGTH_SIZE,
                actual: frame.len(),
            })?
        }
        let (header, body) = frame.split_at(ENCRYPTED_LENGTH_SIZE);
        self.read_message_length(header)?;
        self.read_message_payload(body)
    }

    #[cfg(test)]
    pub(crate) fn ciphers(&self) -> (&CipherState, &CipherState) {
        (&self.sending, &self.receiving)
    }
}
