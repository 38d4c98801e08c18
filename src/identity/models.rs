//! Identity models.

use std::fmt;

use crate::identity::IdentityError;

/// Snapshot of the signed-in user as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-assigned user id.
    pub id: String,

    /// Email address, when the provider shares one.
    pub email: Option<String>,
}

impl Identity {
    /// Create an identity snapshot.
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
        }
    }
}

/// Email and password credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Validate and wrap email/password credentials.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::MissingEmail`]: the email is blank.
    /// - [`IdentityError::InvalidEmail`]: the email has no `@`.
    /// - [`IdentityError::MissingPassword`]: the password is empty.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self, IdentityError> {
        let email = email.into().trim().to_string();
        let password = password.into();

        if email.is_empty() {
            return Err(IdentityError::MissingEmail);
        }

        if !email.contains('@') {
            return Err(IdentityError::InvalidEmail(email));
        }

        if password.is_empty() {
            return Err(IdentityError::MissingPassword);
        }

        Ok(Self { email, password })
    }

    /// Email address
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Password
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sign-up request with a confirmed password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUp {
    credentials: Credentials,
}

impl SignUp {
    /// Validate a sign-up form.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::PasswordMismatch`] if the confirmation differs,
    /// or any error from [`Credentials::new`].
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: &str,
    ) -> Result<Self, IdentityError> {
        let password = password.into();

        if password != confirm_password {
            return Err(IdentityError::PasswordMismatch);
        }

        Ok(Self {
            credentials: Credentials::new(email, password)?,
        })
    }

    /// Credentials to register
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account must be confirmed by email before signing in.
    ConfirmationRequired,

    /// The account was created and signed in.
    SignedIn(Identity),
}

/// External OAuth providers offered at sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OAuthProvider {
    /// Google
    Google,
}
