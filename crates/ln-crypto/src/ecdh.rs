use crate::{fill_random, CryptoError};
use secp256k1::{ecdh::SharedSecret, PublicKey, Secp256k1, SecretKey};

pub const PRIVATE_KEY_SIZE: usize = 32;
pub const PUBLIC_KEY_SIZE: usize = 33;
pub const SHARED_SECRET_SIZE: usize = 32;

fn secret_key(private: &[u8; PRIVATE_KEY_SIZE]) -> Result<SecretKey, CryptoError> {
    SecretKey::from_byte_array(*private).map_err(|_| CryptoError::InvalidSecretKey)
}

fn parse_public(public: &[u8]) -> Result<PublicKey, CryptoError> {
    if public.len() != PUBLIC_KEY_SIZE {
        Err(CryptoError::InvalidKeyLength)?
    }
    PublicKey::from_slice(public).map_err(|_| CryptoError::InvalidPublicKey)
}

/// Fills `dest` with a uniformly random, valid secp256k1 scalar.
pub fn generate_private_key(dest: &mut [u8; PRIVATE_KEY_SIZE]) -> Result<(), CryptoError> {
    loop {
        fill_random(dest)?;
        if let Ok(mut key) = secret_key(dest) {
            key.non_secure_erase();
            return Ok(());
        }
    }
}

pub fn validate_private_key(private: &[u8]) -> Result<(), CryptoError> {
    let private: &[u8; PRIVATE_KEY_SIZE] = private
        .try_into()
        .map_err(|_| CryptoError::InvalidKeyLength)?;
    let mut key = secret_key(private)?;
    key.non_secure_erase();
    Ok(())
}

/// Checks that `public` is a 33-byte compressed point on the curve.
pub fn validate_public_key(public: &[u8]) -> Result<(), CryptoError> {
    // Uncompressed encodings are 65 bytes, so a parsed 33-byte key is compressed.
    parse_public(public)?;
    Ok(())
}

/// Compressed public point of `private`.
pub fn public_key(
    private: &[u8; PRIVATE_KEY_SIZE],
) -> Result<[u8; PUBLIC_KEY_SIZE], CryptoError> {
    let mut key = secret_key(private)?;
    let public = PublicKey::from_secret_key(&Secp256k1::signing_only(), &key);
    key.non_secure_erase();
    Ok(public.serialize())
}

/// `SHA256(compressed(private * public))`, the ECDH function Lightning's Noise uses.
pub fn ecdh(
    private: &[u8; PRIVATE_KEY_SIZE],
    public: &[u8],
) -> Result<[u8; SHARED_SECRET_SIZE], CryptoError> {
    let public = parse_public(public)?;
    let mut key = secret_key(private)?;
    let shared = SharedSecret::new(&public, &key);
    key.non_secure_erase();
    Ok(shared.secret_bytes())
}

#[cfg(test)]
mod tests {
    use crate::{
        ecdh, from_hex, generate_private_key, public_key, validate_private_key,
        validate_public_key, CryptoError, PUBLIC_KEY_SIZE,
    };

    fn decode<const N: usize>(hex: &str) -> [u8; N] {
        let mut bytes = [0u8; N];
        from_hex(hex.as_bytes(), &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn public_keys_of_known_scalars() {
        let cases = [
            ("11", "034f355bdcb7cc0af728ef3cceb9615d90684bb5b2ca5f859ab0f0b704075871aa"),
            ("12", "036360e856310ce5d294e8be33fc807077dc56ac80d95d9cd4ddbd21325eff73f7"),
            ("21", "028d7500dd4c12685d1f568b4c2b5048e8534b873319f3a8daa612b469132ec7f7"),
            ("22", "02466d7fcae563e5cb09a0d1870bb580344804617879a14949cf22285f1bae3f27"),
        ];
        for (byte, expected) in cases {
            let private = decode::<32>(&byte.repeat(32));
            assert_eq!(
                public_key(&private).unwrap(),
                decode::<PUBLIC_KEY_SIZE>(expected)
            );
        }
    }

    #[test]
    fn ecdh_is_symmetric() {
        let a = [0x11u8; 32];
        let b = [0x21u8; 32];
        let ab = ecdh(&a, &public_key(&b).unwrap()).unwrap();
        let ba = ecdh(&b, &public_key(&a).unwrap()).unwrap();
        assert_eq!(ab, ba);
        assert_ne!(ab, [0u8; 32]);
    }

    #[test]
    fn generated_keys_are_valid_and_distinct() {
        let mut first = [0u8; 32];
        let mut second = [0u8; 32];
        generate_private_key(&mut first).unwrap();
        generate_private_key(&mut second).unwrap();
        assert_ne!(first, second);
        validate_private_key(&first).unwrap();
        validate_public_key(&public_key(&first).unwrap()).unwrap();
    }

    #[test]
    fn rejects_bad_keys() {
        assert_eq!(validate_private_key(&[0u8; 32]), Err(CryptoError::InvalidSecretKey));
        assert_eq!(validate_private_key(&[1u8; 31]), Err(CryptoError::InvalidKeyLength));
        assert_eq!(validate_private_key(&[0xffu8; 32]), Err(CryptoError::InvalidSecretKey));

        let mut public = public_key(&[0x11u8; 32]).unwrap();
        assert_eq!(validate_public_key(&public[..32]), Err(CryptoError::InvalidKeyLength));
        public[0] = 0x04;
        assert_eq!(validate_public_key(&public), Err(CryptoError::InvalidPublicKey));
        assert_eq!(ecdh(&[0x11u8; 32], &public), Err(CryptoError::InvalidPublicKey));
    }
}
