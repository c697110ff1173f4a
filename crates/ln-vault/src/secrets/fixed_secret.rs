use std::fmt;

use crate::{SecureAccess, SecureContainer};
use ::secrets::SecretBox;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// For raw, fixed-size byte arrays (keys, chaining keys, transcript hashes).
/// It uses `secrets::SecretBox<T>` directly, so the bytes sit in locked, guarded memory
/// that is only readable while borrowed and is wiped when freed.
pub struct FixedSecret<const N: usize> {
    inner: SecretBox<[u8; N]>,
    tag: &'static str,
}

impl<const N: usize> FixedSecret<N> {
    /// Will consume `inner`, zeroing the local copy after taking it
    pub fn new(mut inner: [u8; N], tag: &'static str) -> Self {
        Self::take(&mut inner, tag)
    }

    pub fn take(inner: &mut [u8; N], tag: &'static str) -> Self {
        Self {
            // `SecretBox::from` zeroes the data in `inner` after taking it
            inner: SecretBox::from(inner),
            tag,
        }
    }

    pub fn zeroed(tag: &'static str) -> Self {
        Self {
            inner: SecretBox::zero(),
            tag,
        }
    }

    /// Overwrites the held bytes in place
    pub fn set(&mut self, value: &mut [u8; N]) {
        self.inner.borrow_mut().copy_from_slice(value);
        value.zeroize();
    }
}

impl<const N: usize> SecureContainer for FixedSecret<N> {
    type InnerType = [u8; N];

    fn tag(&self) -> &str {
        self.tag
    }

    fn len(&self) -> usize {
        N
    }
}

impl<const N: usize> SecureAccess for FixedSecret<N> {
    fn copy(&self) -> [u8; N] {
        *self.inner.borrow()
    }

    fn with<R>(&self, f: impl FnOnce(&Self::InnerType) -> R) -> R {
        f(&self.inner.borrow())
    }

    fn with_mut<R>(&mut self, f: impl FnOnce(&mut Self::InnerType) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }
}

impl<const N: usize> Zeroize for FixedSecret<N> {
    fn zeroize(&mut self) {
        self.inner.borrow_mut().zeroize();
    }
}

impl<const N: usize> fmt::Debug for FixedSecret<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedSecret<{N}>({:?}, ***)", self.tag)
    }
}

impl<const N: usize> PartialEq for FixedSecret<N> {
    fn eq(&self, other: &Self) -> bool {
        let ours = self.inner.borrow();
        let theirs = other.inner.borrow();
        ours[..].ct_eq(&theirs[..]).into()
    }
}

impl<const N: usize> Eq for FixedSecret<N> {}
