//! Identity provider.

use async_trait::async_trait;
use mockall::automock;
use tokio::sync::watch;

use crate::identity::{Credentials, Identity, IdentityError, OAuthProvider, SignUpOutcome};

/// Receives the latest identity snapshot published by a provider.
pub type IdentityReceiver = watch::Receiver<Option<Identity>>;

/// Publishes identity snapshots to subscribers.
pub type IdentitySender = watch::Sender<Option<Identity>>;

/// Create a snapshot channel seeded with the current identity.
///
/// Only the most recent snapshot is retained; receivers that fall behind see
/// the latest value and nothing in between.
pub fn identity_channel(initial: Option<Identity>) -> (IdentitySender, IdentityReceiver) {
    watch::channel(initial)
}

/// Hosted authentication service.
#[automock]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Identity of the current provider session, if any.
    async fn current_identity(&self) -> Result<Option<Identity>, IdentityError>;

    /// Subscribe to identity changes.
    fn subscribe(&self) -> IdentityReceiver;

    /// Sign in with an email and password.
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Identity, IdentityError>;

    /// Register a new account.
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, IdentityError>;

    /// Start an external OAuth sign-in. The resulting identity arrives through
    /// [`IdentityProvider::subscribe`].
    async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<(), IdentityError>;

    /// End the provider session.
    async fn sign_out(&self) -> Result<(), IdentityError>;
}
