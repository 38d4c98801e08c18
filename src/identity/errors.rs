//! Identity errors.

use thiserror::Error;

/// Errors raised while validating credentials or talking to the identity provider.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// No email address was given.
    #[error("email address is required")]
    MissingEmail,

    /// The email address is not plausibly an address.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// No password was given.
    #[error("password is required")]
    MissingPassword,

    /// Sign-up password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// The provider rejected the request.
    #[error("identity provider error: {0}")]
    Provider(String),
}
