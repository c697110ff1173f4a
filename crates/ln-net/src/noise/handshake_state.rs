use tracing::trace;

use crate::{
    message_overhead, HandshakePattern, HandshakeToken, KeyPair, KeyRef, NoiseError, PublicKey,
    Role, SymmetricState, Transport, DHLEN, HANDSHAKE_VERSION, HASHLEN, MAC_SIZE,
    MAX_MESSAGE_SIZE, PROLOGUE,
};

/// Where the three-act exchange stands. The writer of each act is fixed by the pattern.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HandshakePhase {
    AwaitingAct1,
    AwaitingAct2,
    AwaitingAct3,
    Complete,
    Failed,
}

impl HandshakePhase {
    fn message_index(self) -> Option<usize> {
        match self {
            HandshakePhase::AwaitingAct1 => Some(0),
            HandshakePhase::AwaitingAct2 => Some(1),
            HandshakePhase::AwaitingAct3 => Some(2),
            HandshakePhase::Complete | HandshakePhase::Failed => None,
        }
    }

    fn next(self) -> Self {
        match self {
            HandshakePhase::AwaitingAct1 => HandshakePhase::AwaitingAct2,
            HandshakePhase::AwaitingAct2 => HandshakePhase::AwaitingAct3,
            HandshakePhase::AwaitingAct3 | HandshakePhase::Complete => HandshakePhase::Complete,
            HandshakePhase::Failed => HandshakePhase::Failed,
        }
    }
}

/// Outcome of one act. `transport` and `handshake_hash` are only set by the act that completes the handshake.
#[derive(Debug)]
pub struct HandshakeResult {
    pub size: usize,
    pub handshake_hash: Option<[u8; HASHLEN]>,
    pub transport: Option<Transport>,
}

#[derive(Debug)]
pub struct HandshakeState {
    symmetric_state: SymmetricState,
    pattern: HandshakePattern,
    role: Role,
    phase: HandshakePhase,
    s: Option<KeyPair>,
    e: Option<KeyPair>,
    rs: Option<PublicKey>,
    re: Option<PublicKey>,
    /// Static key a responder insists the initiator reveals in act three
    expected_rs: Option<PublicKey>,
}

impl HandshakeState {
    /// `remote_static_public` is required for the initiator. A responder may pass an
    /// empty slice to accept any initiator, or a key to pin the expected peer.
    pub fn new(
        role: Role,
        local_static_private: &[u8],
        remote_static_public: &[u8],
    ) -> Result<Self, NoiseError> {
        let s = KeyPair::from_private(local_static_private, "local static key")?;
        let remote = match (role, remote_static_public.is_empty()) {
            (Role::Initiator, true) => Err(NoiseError::InvalidKeyMaterial)?,
            (Role::Responder, true) => None,
            (_, false) => Some(
                PublicKey::from_bytes(remote_static_public)
                    .map_err(|_| NoiseError::InvalidKeyMaterial)?,
            ),
        };
        let (rs, expected_rs) = match role {
            Role::Initiator => (remote, None),
            Role::Responder => (None, remote),
        };

        let pattern = HandshakePattern::XK;
        let mut symmetric_state = SymmetricState::initialize_symmetric(pattern);
        symmetric_state.mix_hash(PROLOGUE);
        pattern.mix_premessages(&mut symmetric_state, role, Some(&s), rs.as_ref())?;
        Ok(Self {
            symmetric_state,
            pattern,
            role,
            phase: HandshakePhase::AwaitingAct1,
            s: Some(s),
            e: None,
            rs,
            re: None,
            expected_rs,
        })
    }

    pub fn initiator(
        local_static_private: &[u8],
        remote_static_public: &[u8],
    ) -> Result<Self, NoiseError> {
        Self::new(Role::Initiator, local_static_private, remote_static_public)
    }

    pub fn responder(local_static_private: &[u8]) -> Result<Self, NoiseError> {
        Self::new(Role::Responder, local_static_private, &[])
    }

    /// Uses `ephemeral_private` instead of a freshly generated ephemeral key. Only meant for
    /// reproducing known transcripts; a reused ephemeral key breaks forward secrecy.
    pub fn with_ephemeral(mut self, ephemeral_private: &[u8]) -> Result<Self, NoiseError> {
        if self.phase != HandshakePhase::AwaitingAct1 {
            Err(NoiseError::OutOfTurn)?
        }
        self.e = Some(KeyPair::from_private(ephemeral_private, "ephemeral key")?);
        Ok(self)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn phase(&self) -> HandshakePhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == HandshakePhase::Complete
    }

    /// True when the next act is ours to write.
    pub fn is_my_turn(&self) -> bool {
        self.phase
            .message_index()
            .is_some_and(|index| HandshakePattern::writer(index) == self.role)
    }

    /// Known from construction for the initiator, learned in act three by the responder.
    pub fn remote_static(&self) -> Option<&PublicKey> {
        self.rs.as_ref()
    }

    /// Running transcript hash, `None` once the handshake has finished or failed.
    pub fn handshake_hash(&self) -> Option<[u8; HASHLEN]> {
        self.phase
            .message_index()
            .map(|_| self.symmetric_state.get_handshake_hash())
    }

    /// Exact size of the next act when it carries `payload_len` bytes of payload.
    pub fn next_message_len(&self, payload_len: usize) -> Option<usize> {
        let tokens = self.pattern.to_tokens()[self.phase.message_index()?];
        Some(message_overhead(tokens, self.symmetric_state.has_key()) + payload_len)
    }

    fn check_usable(&self) -> Result<usize, NoiseError> {
        match self.phase {
            HandshakePhase::Complete => Err(NoiseError::HandshakeAlreadyComplete),
            HandshakePhase::Failed => Err(NoiseError::HandshakeFailed),
            phase => phase.message_index().ok_or(NoiseError::HandshakeFailed),
        }
    }

    /// Zeroes every secret and refuses further use.
    fn fail<T>(&mut self, error: NoiseError) -> Result<T, NoiseError> {
        self.phase = HandshakePhase::Failed;
        self.clear();
        Err(error)
    }

    fn clear(&mut self) {
        self.symmetric_state.clear();
        self.s = None;
        self.e = None;
        self.re = None;
    }

    /// Writes the next act into `message_buffer`, which must hold `next_message_len(payload.len())` bytes.
    /// Any error leaves the handshake unusable.
    pub fn write_message(
        &mut self,
        payload: &[u8],
        message_buffer: &mut [u8],
    ) -> Result<HandshakeResult, NoiseError> {
        let index = self.check_usable()?;
        let tokens = self.pattern.to_tokens()[index];
        let size = message_overhead(tokens, self.symmetric_state.has_key()) + payload.len();
        if size > MAX_MESSAGE_SIZE || size > message_buffer.len() {
            return self.fail(NoiseError::MessageTooLarge {
                size,
                max: MAX_MESSAGE_SIZE.min(message_buffer.len()),
            });
        }
        if HandshakePattern::writer(index) != self.role {
            return self.fail(NoiseError::OutOfTurn);
        }

        match self
            .write_act(tokens, payload, &mut message_buffer[..size])
            .and_then(|_| self.advance(index, size))
        {
            Ok(result) => Ok(result),
            Err(error) => self.fail(error),
        }
    }

    fn write_act(
        &mut self,
        tokens: &[HandshakeToken],
        payload: &[u8],
        message_buffer: &mut [u8],
    ) -> Result<(), NoiseError> {
        message_buffer[0] = HANDSHAKE_VERSION;
        let mut head = 1;
        for token in tokens {
            head += self.process_write(*token, message_buffer, head)?
        }

        let ciphertext = self.symmetric_state.encrypt_and_hash(payload)?;
        message_buffer[head..head + ciphertext.len()].copy_from_slice(&ciphertext);
        Ok(())
    }

    /// Performs actions and writes bytes according to the token, returns the number of bytes written
    fn process_write(
        &mut self,
        token: HandshakeToken,
        message_buffer: &mut [u8],
        head: usize,
    ) -> Result<usize, NoiseError> {
        match token {
            HandshakeToken::E => {
                // Sets e to GENERATE_KEYPAIR() unless one was supplied up front.
                let pair = match self.e.take() {
                    Some(pair) => pair,
                    None => KeyPair::generate()?,
                };

                // Appends e.public_key to the buffer and calls MixHash(e.public_key).
                let public = pair.public().to_bytes();
                message_buffer[head..head + DHLEN].copy_from_slice(&public);
                self.symmetric_state.mix_hash(&public);
                self.e = Some(pair);
                Ok(DHLEN)
            }
            HandshakeToken::S => {
                // Appends EncryptAndHash(s.public_key) to the buffer.
                let s_pub = self
                    .s
                    .as_ref()
                    .ok_or(NoiseError::KeysMissing)?
                    .public()
                    .to_bytes();
                let ciphertext = self.symmetric_state.encrypt_and_hash(&s_pub)?;
                message_buffer[head..head + ciphertext.len()].copy_from_slice(&ciphertext);
                Ok(ciphertext.len())
            }
            dh => {
                self.mix_dh(dh)?;
                Ok(0)
            }
        }
    }

    /// Checks the version and exact length of `message` before processing it.
    /// `payload_buffer` must be exactly as long as the payload the act carries.
    pub fn read_message(
        &mut self,
        message: &[u8],
        payload_buffer: &mut [u8],
    ) -> Result<HandshakeResult, NoiseError> {
        let index = self.check_usable()?;
        if HandshakePattern::writer(index) == self.role {
            return self.fail(NoiseError::OutOfTurn);
        }
        let tokens = self.pattern.to_tokens()[index];
        let expected =
            message_overhead(tokens, self.symmetric_state.has_key()) + payload_buffer.len();
        if message.len() != expected {
            return self.fail(NoiseError::InvalidMessageLength {
                expected,
                actual: message.len(),
            });
        }

        match self
            .read_act(tokens, message, payload_buffer)
            .and_then(|_| self.advance(index, message.len()))
        {
            Ok(result) => Ok(result),
            Err(error) => self.fail(error),
        }
    }

    fn read_act(
        &mut self,
        tokens: &[HandshakeToken],
        message: &[u8],
        payload_buffer: &mut [u8],
    ) -> Result<(), NoiseError> {
        if message[0] != HANDSHAKE_VERSION {
            Err(NoiseError::InvalidVersion(message[0]))?
        }
        let mut head = 1;
        for token in tokens {
            head += self.process_read(*token, message, head)?
        }

        // Call DecryptAndHash() on the remaining bytes of the message and store the output into payload_buffer.
        let plaintext = self.symmetric_state.decrypt_and_hash(&message[head..])?;
        payload_buffer.copy_from_slice(&plaintext);
        Ok(())
    }

    /// Reads bytes and performs actions according to the token, returns the number of bytes read
    fn process_read(
        &mut self,
        token: HandshakeToken,
        message: &[u8],
        head: usize,
    ) -> Result<usize, NoiseError> {
        match token {
            HandshakeToken::E => {
                // Sets re to the next DHLEN bytes from the message and calls MixHash(re.public_key).
                let public_bytes = &message[head..head + DHLEN];
                self.re = Some(PublicKey::from_bytes(public_bytes)?);
                self.symmetric_state.mix_hash(public_bytes);
                Ok(DHLEN)
            }
            HandshakeToken::S => {
                // Sets rs to DecryptAndHash() of the next DHLEN + 16 bytes if HasKey() == True, or the next DHLEN bytes otherwise.
                let len = DHLEN + if self.symmetric_state.has_key() { MAC_SIZE } else { 0 };
                let bytes = self
                    .symmetric_state
                    .decrypt_and_hash(&message[head..head + len])?;
                let rs = PublicKey::from_bytes(&bytes)?;
                if self.expected_rs.is_some_and(|expected| expected != rs) {
                    Err(NoiseError::RemoteStaticMismatch)?
                }
                self.rs = Some(rs);
                Ok(len)
            }
            dh => {
                self.mix_dh(dh)?;
                Ok(0)
            }
        }
    }

    /// Calls MixKey(DH(local, remote)) with the key slots the token selects for this role.
    fn mix_dh(&mut self, token: HandshakeToken) -> Result<(), NoiseError> {
        let Some((local, remote)) = token.dh_keys(self.role) else {
            return Ok(());
        };
        let local = match local {
            KeyRef::Ephemeral => self.e.as_ref(),
            KeyRef::Static => self.s.as_ref(),
        }
        .ok_or(NoiseError::KeysMissing)?;
        let remote = match remote {
            KeyRef::Ephemeral => self.re.as_ref(),
            KeyRef::Static => self.rs.as_ref(),
        }
        .ok_or(NoiseError::KeysMissing)?;

        let dh = local.dh(remote)?;
        self.symmetric_state.mix_key(dh.get())
    }

    fn advance(&mut self, index: usize, size: usize) -> Result<HandshakeResult, NoiseError> {
        trace!(role = ?self.role, act = index + 1, size, "handshake act processed");
        self.phase = self.phase.next();
        if self.phase != HandshakePhase::Complete {
            return Ok(HandshakeResult {
                size,
                handshake_hash: None,
                transport: None,
            });
        }

        let remote_static = self.rs.ok_or(NoiseError::KeysMissing)?;
        let (c1, c2, handshake_hash) = self.symmetric_state.split()?;
        let (sending, receiving) = match self.role {
            Role::Initiator => (c1, c2),
            Role::Responder => (c2, c1),
        };
        self.clear();
        Ok(HandshakeResult {
            size,
            handshake_hash: Some(handshake_hash),
            transport: Some(Transport::new(
                sending,
                receiving,
                handshake_hash,
                remote_static,
            )),
        })
    }
}
