pub mod fixed_secret;
pub mod secure_ref;
