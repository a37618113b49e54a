//! Signed-in session
//!
//! Owns the current user and admin flag for the whole client. Screens read
//! it through [`SessionProvider`] or watch it through
//! [`SessionService::subscribe`].

use std::sync::Arc;

use mockall::automock;
use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{
    auth::{
        errors::{AuthError, SessionError},
        models::{Credentials, FederatedIdentity, User},
        provider::IdentityProvider,
    },
    domain::users::{
        UsersService,
        models::{ProfileUpdate, UserProfile},
    },
};

/// Who is signed in, and whether they may edit the menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    pub is_admin: bool,
}

/// Read access to the session for components that gate on it.
#[automock]
pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<User>;

    fn is_admin(&self) -> bool;
}

pub struct SessionService {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UsersService>,
    state: watch::Sender<SessionState>,
}

impl SessionService {
    /// Starts from the provider's remembered user; call [`Self::refresh`] to
    /// load the admin flag.
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, users: Arc<dyn UsersService>) -> Self {
        let (state, _) = watch::channel(SessionState {
            user: identity.current_user(),
            is_admin: false,
        });

        Self {
            identity,
            users,
            state,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Re-read the signed-in user and recompute the admin flag.
    pub async fn refresh(&self) -> SessionState {
        self.apply(self.identity.current_user()).await
    }

    async fn apply(&self, user: Option<User>) -> SessionState {
        let is_admin = match &user {
            Some(user) => self
                .users
                .is_admin(user.email.clone())
                .await
                .unwrap_or_else(|error| {
                    warn!(uid = %user.uid, %error, "admin lookup failed");

                    false
                }),
            None => false,
        };

        let state = SessionState { user, is_admin };

        self.state.send_replace(state.clone());

        state
    }

    /// # Errors
    ///
    /// Returns an error when the credentials are rejected.
    pub async fn log_in(&self, credentials: Credentials) -> Result<User, AuthError> {
        let user = self.identity.sign_in(credentials).await?;

        self.apply(Some(user.clone())).await;

        Ok(user)
    }

    /// Create an account and its profile document.
    ///
    /// # Errors
    ///
    /// Returns an error when the account or the profile cannot be created.
    pub async fn sign_up(&self, credentials: Credentials) -> Result<User, SessionError> {
        let user = self.identity.sign_up(credentials).await?;

        self.users
            .create_profile(user.uid.clone(), user.email.clone())
            .await?;

        self.apply(Some(user.clone())).await;

        Ok(user)
    }

    /// # Errors
    ///
    /// Returns an error when the identity is rejected.
    pub async fn google_sign_in(&self, identity: FederatedIdentity) -> Result<User, AuthError> {
        let user = self.identity.sign_in_federated(identity).await?;

        self.apply(Some(user.clone())).await;

        Ok(user)
    }

    /// # Errors
    ///
    /// Returns an error when the session cannot be cleared.
    pub async fn log_out(&self) -> Result<(), AuthError> {
        self.identity.sign_out().await?;

        self.apply(None).await;

        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error when the address is not a valid email.
    pub async fn reset_password(&self, email: String) -> Result<(), AuthError> {
        self.identity.send_password_reset(email).await
    }

    /// The signed-in user's profile, if they have one.
    ///
    /// # Errors
    ///
    /// Returns an error when nobody is signed in or the lookup fails.
    pub async fn profile(&self) -> Result<Option<UserProfile>, SessionError> {
        let user = self.current_user().ok_or(AuthError::NotSignedIn)?;

        Ok(self.users.find_profile(user.uid).await?)
    }

    /// Update the signed-in user's profile, keeping the account's display
    /// name in step.
    ///
    /// # Errors
    ///
    /// Returns an error when nobody is signed in or a write fails.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, SessionError> {
        let user = self.current_user().ok_or(AuthError::NotSignedIn)?;

        if let Some(display_name) = &update.display_name {
            self.identity
                .update_display_name(display_name.clone())
                .await?;
        }

        let profile = self.users.update_profile(user, update).await?;

        self.refresh().await;

        Ok(profile)
    }

    /// Follow token changes from the identity provider until the returned
    /// handle is dropped.
    pub async fn listen(self: &Arc<Self>) -> SessionListener {
        let mut events = self.identity.subscribe();
        let session = Arc::clone(self);

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        session.apply(event.user).await;
                    }
                    Err(RecvError::Lagged(_)) => {
                        session.refresh().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            debug!("session listener stopped");
        });

        SessionListener { task }
    }
}

impl SessionProvider for SessionService {
    fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    fn is_admin(&self) -> bool {
        self.state.borrow().is_admin
    }
}

/// Stops following token changes when dropped.
#[derive(Debug)]
pub struct SessionListener {
    task: JoinHandle<()>,
}

impl Drop for SessionListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}
