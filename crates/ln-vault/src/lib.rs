mod container;
mod secrets;

pub use container::secure_container::{SecureAccess, SecureContainer};
pub use self::secrets::{fixed_secret::FixedSecret, secure_ref::SecureRef};
