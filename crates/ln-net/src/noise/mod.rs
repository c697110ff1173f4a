pub mod cipher_state;
pub mod handshake_pattern;
pub mod handshake_state;
pub mod key_pair;
pub mod noise_error;
pub mod symmetric_state;
pub mod transport;

#[cfg(test)]
mod tests;
