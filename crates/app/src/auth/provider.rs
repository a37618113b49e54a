//! Identity provider.

use async_trait::async_trait;
use mockall::automock;
use tokio::sync::broadcast;

use crate::auth::{
    errors::AuthError,
    models::{Credentials, FederatedIdentity, IdTokenChanged, User},
};

/// Account store and sign-in state.
#[automock]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and sign it in.
    async fn sign_up(&self, credentials: Credentials) -> Result<User, AuthError>;

    async fn sign_in(&self, credentials: Credentials) -> Result<User, AuthError>;

    /// Sign in with an external identity, creating the account on first use.
    async fn sign_in_federated(&self, identity: FederatedIdentity) -> Result<User, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Rename the signed-in user.
    async fn update_display_name(&self, display_name: String) -> Result<User, AuthError>;

    /// Start a password reset for `email`. Unknown addresses are not reported.
    async fn send_password_reset(&self, email: String) -> Result<(), AuthError>;

    fn current_user(&self) -> Option<User>;

    fn subscribe(&self) -> broadcast::Receiver<IdTokenChanged>;
}
