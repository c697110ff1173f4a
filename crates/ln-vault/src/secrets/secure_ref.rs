use std::ops::{Deref, DerefMut};

/// Owns a temporary secret (a DH output, a decrypted key) and zeroes it when dropped.
pub struct SecureRef<T: zeroize::Zeroize>(T);

impl<T: zeroize::Zeroize> Drop for SecureRef<T> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// `SecureRef` for any T that is at least zeroizable
impl<T: zeroize::Zeroize> SecureRef<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn get(&self) -> &T {
        &self.0
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: zeroize::Zeroize> Deref for SecureRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: zeroize::Zeroize> DerefMut for SecureRef<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}
