use crate::{KeyPair, NoiseError, PublicKey, SymmetricState, DHLEN, HASHLEN, MAC_SIZE};

/// Which end of the connection this handshake state plays.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Role {
    Initiator,
    Responder,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum HandshakePattern {
    /// Responder authenticated up front, initiator transmits its static in the final act
    #[default]
    XK,
}

impl HandshakePattern {
    /// Returns a two bool tuple representing `(initiator, responder)` required
    pub fn requires_premessage(&self) -> (bool, bool) {
        match self {
            // _K: initiator knows responder static
            HandshakePattern::XK => (false, true),
        }
    }

    /// Mixes any known static public keys as a pre-message.
    /// If both initiator and responder have pre-messages, the initiator's public keys are hashed first.
    pub fn mix_premessages(
        &self,
        symmetric_state: &mut SymmetricState,
        role: Role,
        s: Option<&KeyPair>,
        rs: Option<&PublicKey>,
    ) -> Result<(), NoiseError> {
        let (initiator_known, responder_known) = self.requires_premessage();
        if initiator_known {
            match role {
                Role::Initiator => Self::mix_local(symmetric_state, s)?,
                Role::Responder => Self::mix_remote(symmetric_state, rs)?,
            }
        }
        if responder_known {
            match role {
                Role::Initiator => Self::mix_remote(symmetric_state, rs)?,
                Role::Responder => Self::mix_local(symmetric_state, s)?,
            }
        }
        Ok(())
    }

    fn mix_local(
        symmetric_state: &mut SymmetricState,
        local: Option<&KeyPair>,
    ) -> Result<(), NoiseError> {
        match local {
            Some(local) => symmetric_state.mix_hash(local.public().as_bytes()),
            None => Err(NoiseError::InvalidKeyMaterial)?,
        }
        Ok(())
    }

    fn mix_remote(
        symmetric_state: &mut SymmetricState,
        remote: Option<&PublicKey>,
    ) -> Result<(), NoiseError> {
        match remote {
            Some(remote) => symmetric_state.mix_hash(remote.as_bytes()),
            None => Err(NoiseError::InvalidKeyMaterial)?,
        }
        Ok(())
    }

    pub fn protocol_name(&self) -> &'static [u8] {
        match self {
            HandshakePattern::XK => b"Noise_XK_secp256k1_ChaChaPoly_SHA256",
        }
    }

    /// Initial `h` and `ck`: the protocol name padded with zeros, or its hash when longer than `HASHLEN`.
    pub fn to_bytes(&self) -> [u8; HASHLEN] {
        let protocol = self.protocol_name();
        match protocol.len() {
            n if n <= HASHLEN => {
                let mut out = [0u8; HASHLEN];
                out[..n].copy_from_slice(protocol);
                out
            }
            _ => ln_crypto::sha256(protocol),
        }
    }

    pub fn to_tokens(&self) -> &'static [&'static [HandshakeToken]] {
        match self {
            HandshakePattern::XK => &[
                &[HandshakeToken::E, HandshakeToken::ES],
                &[HandshakeToken::E, HandshakeToken::EE],
                &[HandshakeToken::S, HandshakeToken::SE],
            ],
        }
    }

    /// Messages alternate, starting with the initiator.
    pub fn writer(message_index: usize) -> Role {
        match message_index % 2 {
            0 => Role::Initiator,
            _ => Role::Responder,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HandshakeToken {
    /// Ephemeral key
    E,
    /// Static key
    S,
    /// Ephemeral-ephemeral DH
    EE,
    /// Ephemeral-static DH (initiator's ephemeral with responder's static)
    ES,
    /// Static-ephemeral DH (initiator's static with responder's ephemeral)
    SE,
    /// Static-static DH
    SS,
}

/// Selects one of a side's key slots for a DH token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyRef {
    Ephemeral,
    Static,
}

impl HandshakeToken {
    /// `(local, remote)` keys a DH token combines for `role`, `None` for the key-transmitting tokens.
    pub fn dh_keys(self, role: Role) -> Option<(KeyRef, KeyRef)> {
        match (self, role) {
            (HandshakeToken::E | HandshakeToken::S, _) => None,
            (HandshakeToken::EE, _) => Some((KeyRef::Ephemeral, KeyRef::Ephemeral)),
            (HandshakeToken::ES, Role::Initiator) | (HandshakeToken::SE, Role::Responder) => {
                Some((KeyRef::Ephemeral, KeyRef::Static))
            }
            (HandshakeToken::ES, Role::Responder) | (HandshakeToken::SE, Role::Initiator) => {
                Some((KeyRef::Static, KeyRef::Ephemeral))
            }
            (HandshakeToken::SS, _) => Some((KeyRef::Static, KeyRef::Static)),
        }
    }
}

/// Bytes a handshake message adds on top of its payload: the version byte, the
/// transmitted keys (encrypted static keys carry a tag) and the payload tag once a key is set.
pub fn message_overhead(tokens: &[HandshakeToken], mut has_key: bool) -> usize {
    let mut len = 1;
    for token in tokens {
        match token {
            HandshakeToken::E => len += DHLEN,
            HandshakeToken::S => len += DHLEN + if has_key { MAC_SIZE } else { 0 },
            _ => has_key = true,
        }
    }
    len + if has_key { MAC_SIZE } else { 0 }
}
