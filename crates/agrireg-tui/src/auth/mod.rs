//! Operator accounts for console login

mod directory;

pub use directory::{hash_password, AccountDirectory, MIN_PASSWORD_LENGTH};
