use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::{
    HandshakeState, NoiseError, PublicKey, Transport, ENCRYPTED_LENGTH_SIZE, HASHLEN, MAC_SIZE,
};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Upper bound for all three acts together
    pub handshake_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("noise error: {0}")]
    Noise(#[from] NoiseError),
    #[error("handshake timed out after {0:?}")]
    Timeout(Duration),
}

/// A Noise-encrypted connection to a Lightning peer over any async byte stream.
pub struct NoiseConnection<S> {
    stream: S,
    transport: Transport,
}

impl<S: AsyncRead + AsyncWrite + Unpin> NoiseConnection<S> {
    /// Performs the handshake as initiator towards the node `remote_static`.
    pub async fn connect(
        stream: S,
        local_static: &[u8],
        remote_static: &[u8],
        config: &ConnectionConfig,
    ) -> Result<Self, ConnectionError> {
        let handshake = HandshakeState::initiator(local_static, remote_static)?;
        Self::establish(stream, handshake, config).await
    }

    /// Performs the handshake as responder, accepting any initiator.
    pub async fn accept(
        stream: S,
        local_static: &[u8],
        config: &ConnectionConfig,
    ) -> Result<Self, ConnectionError> {
        Self::establish(stream, HandshakeState::responder(local_static)?, config).await
    }

    /// Drives an already configured handshake to completion over `stream`.
    pub async fn establish(
        mut stream: S,
        handshake: HandshakeState,
        config: &ConnectionConfig,
    ) -> Result<Self, ConnectionError> {
        let role = handshake.role();
        let transport = tokio::time::timeout(
            config.handshake_timeout,
            Self::perform_handshake(&mut stream, handshake),
        )
        .await
        .map_err(|_| ConnectionError::Timeout(config.handshake_timeout))??;

        debug!(?role, remote = %transport.remote_static(), "noise handshake complete");
        Ok(Self { stream, transport })
    }

    async fn perform_handshake(
        stream: &mut S,
        mut handshake: HandshakeState,
    ) -> Result<Transport, ConnectionError> {
        loop {
            let len = handshake
                .next_message_len(0)
                .ok_or(NoiseError::HandshakeAlreadyComplete)?;
            let mut act = vec![0u8; len];

            let result = if handshake.is_my_turn() {
                let result = handshake.write_message(&[], &mut act)?;
                stream.write_all(&act[..result.size]).await?;
                stream.flush().await?;
                result
            } else {
                stream.read_exact(&mut act).await?;
                handshake.read_message(&act, &mut [])?
            };

            if let Some(transport) = result.transport {
                return Ok(transport);
            }
        }
    }

    /// Encrypts and sends one message of at most 65535 bytes.
    pub async fn send_message(&mut self, msg: &[u8]) -> Result<(), ConnectionError> {
        let frame = self.transport.write_message(msg)?;
        self.stream.write_all(&frame).await?;
        self.stream.flush().await?;
        trace!(len = msg.len(), "sent message");
        Ok(())
    }

    pub async fn recv_message(&mut self) -> Result<Vec<u8>, ConnectionError> {
        // Read and decrypt length prefix
        let mut header = [0u8; ENCRYPTED_LENGTH_SIZE];
        self.stream.read_exact(&mut header).await?;
        let len = self.transport.read_message_length(&header)?;

        // Read and decrypt message body
        let mut body = vec![0u8; len + MAC_SIZE];
        self.stream.read_exact(&mut body).await?;
        let msg = self.transport.read_message_payload(&body)?;
        trace!(len, "received message");
        Ok(msg)
    }

    pub fn remote_static(&self) -> &PublicKey {
        self.transport.remote_static()
    }

    pub fn handshake_hash(&self) -> &[u8; HASHLEN] {
        self.transport.handshake_hash()
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}
