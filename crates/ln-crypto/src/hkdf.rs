use crate::CryptoError;
use digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::marker::PhantomData;
use zeroize::Zeroize;

/// Generic HKDF following RFC 5869.
/// H: MAC over the hash function (eg. `Hmac<Sha256>`).
/// N: hash output size (eg. 32 for SHA-256).
pub struct Hkdf<H: Mac + KeyInit, const N: usize>(PhantomData<H>);

pub type HkdfSha256 = Hkdf<Hmac<Sha256>, 32>;

impl<H: Mac + KeyInit, const N: usize> Hkdf<H, N> {
    fn mac(key: &[u8]) -> Result<H, CryptoError> {
        Ok(<H as KeyInit>::new_from_slice(key)?)
    }

    /// PRK = HMAC(salt, IKM)
    pub fn extract(
        dest: &mut [u8; N],
        salt: &[u8],
        initial_key_material: &[u8],
    ) -> Result<(), CryptoError> {
        let mut mac = Self::mac(salt)?;
        mac.update(initial_key_material);
        let mut tag = mac.finalize().into_bytes();
        dest.copy_from_slice(&tag[..N]);
        tag.as_mut_slice().zeroize();
        Ok(())
    }

    /// OKM = T(1) | T(2) | ... truncated to `L`, where T(i) = HMAC(PRK, T(i-1) | info | i)
    pub fn expand<const L: usize>(
        dest: &mut [u8; L],
        prk: &[u8; N],
        info: &[u8],
    ) -> Result<(), CryptoError> {
        if L.div_ceil(N) > 255 {
            Err(CryptoError::HkdfExpandTooLong)?
        }

        let mut block = [0u8; N];
        for (i, chunk) in dest.chunks_mut(N).enumerate() {
            let mut mac = Self::mac(prk)?;
            if i > 0 {
                mac.update(&block);
            }
            mac.update(info);
            mac.update(&[i as u8 + 1]);

            let mut tag = mac.finalize().into_bytes();
            block.copy_from_slice(&tag[..N]);
            tag.as_mut_slice().zeroize();
            chunk.copy_from_slice(&block[..chunk.len()]);
        }
        block.zeroize();
        Ok(())
    }

    pub fn derive<const L: usize>(
        dest: &mut [u8; L],
        salt: &[u8],
        initial_key_material: &[u8],
        info: &[u8],
    ) -> Result<(), CryptoError> {
        let mut prk = [0u8; N];
        let result = Self::extract(&mut prk, salt, initial_key_material)
            .and_then(|()| Self::expand(dest, &prk, info));
        prk.zeroize();
        result
    }

    /// Splits `L = K * N` bytes of output into `K` keys.
    pub fn derive_keys<const K: usize, const L: usize>(
        dest: &mut [[u8; N]; K],
        salt: &[u8],
        initial_key_material: &[u8],
        info: &[u8],
    ) -> Result<(), CryptoError> {
        if N.checked_mul(K) != Some(L) {
            Err(CryptoError::DestTooSmall)?
        }
        let mut okm = [0u8; L];
        let result = Self::derive(&mut okm, salt, initial_key_material, info);
        if result.is_ok() {
            for (key, chunk) in dest.iter_mut().zip(okm.chunks_exact(N)) {
                key.copy_from_slice(chunk);
            }
        }
        okm.zeroize();
        result
    }

    /// The two-output HKDF used by Noise `MixKey`, `Split` and transport rekeying:
    /// `(out1, out2) = HKDF(chaining_key, input_key_material)` with an empty info string.
    pub fn extract_and_expand2(
        chaining_key: &[u8],
        input_key_material: &[u8],
    ) -> Result<([u8; N], [u8; N]), CryptoError> {
        let mut keys = [[0u8; N]; 2];
        let result = Self::derive_keys::<2, 64>(&mut keys, chaining_key, input_key_material, &[]);
        let out = (keys[0], keys[1]);
        keys.zeroize();
        result.map(|()| out)
    }
}
