pub trait SecureContainer {
    type InnerType;

    fn tag(&self) -> &str;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scoped access to the protected bytes. Closures receive a reference that must not escape.
pub trait SecureAccess: SecureContainer {
    /// Returns a plain copy, the caller becomes responsible for zeroing it.
    fn copy(&self) -> Self::InnerType;

    fn with<R>(&self, f: impl FnOnce(&Self::InnerType) -> R) -> R;
    fn with_mut<R>(&mut self, f: impl FnOnce(&mut Self::InnerType) -> R) -> R;
}
