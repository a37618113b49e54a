//! Local identity provider
//!
//! Accounts live in the `accounts` document collection with salted SHA-256
//! password digests; the signed-in user is kept under the `session` key of the
//! key-value mirror so it survives restarts.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::{
    auth::{
        errors::AuthError,
        models::{
            Credentials, FederatedIdentity, FederatedProvider, IdTokenChanged, User, UserId,
        },
        provider::IdentityProvider,
    },
    documents::{Documents, collections::ACCOUNTS},
    storage::{KeyValueStore, KeyValueStoreExt},
};

/// Storage key holding the signed-in user.
pub const SESSION_KEY: &str = "session";

const MIN_PASSWORD_LENGTH: usize = 6;
const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    uid: UserId,
    email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_digest: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    provider: Option<FederatedProvider>,
}

impl AccountRecord {
    fn user(&self) -> User {
        User {
            uid: self.uid.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_ascii_lowercase();

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AuthError::InvalidEmail),
    }
}

fn password_digest(uid: &UserId, password: &str) -> String {
    format!("{:x}", Sha256::digest(format!("{uid}:{password}").as_bytes()))
}

pub struct LocalIdentityProvider {
    docs: Documents,
    storage: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<IdTokenChanged>,
}

impl LocalIdentityProvider {
    #[must_use]
    pub fn new(docs: Documents, storage: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            docs,
            storage,
            events,
        }
    }

    fn find_account(&self, email: &str) -> Result<Option<AccountRecord>, AuthError> {
        Ok(self
            .docs
            .find::<AccountRecord, _>(ACCOUNTS, |account| account.email == email)?
            .into_iter()
            .next()
            .map(|(_, account)| account))
    }

    fn save_account(&self, account: &AccountRecord) -> Result<(), AuthError> {
        self.docs.set(ACCOUNTS, account.uid.as_str(), account)?;

        Ok(())
    }

    fn start_session(&self, user: User) -> Result<User, AuthError> {
        self.storage.write_json(SESSION_KEY, &user)?;

        self.announce(Some(user.clone()));

        Ok(user)
    }

    fn announce(&self, user: Option<User>) {
        _ = self.events.send(IdTokenChanged { user });
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_up(&self, credentials: Credentials) -> Result<User, AuthError> {
        let email = normalize_email(&credentials.email)?;

        if credentials.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LENGTH));
        }

        if self.find_account(&email)?.is_some() {
            return Err(AuthError::EmailInUse);
        }

        let uid = UserId::generate();

        let account = AccountRecord {
            password_digest: Some(password_digest(&uid, &credentials.password)),
            uid,
            email,
            display_name: None,
            provider: None,
        };

        self.save_account(&account)?;

        info!(uid = %account.uid, "account created");

        self.start_session(account.user())
    }

    async fn sign_in(&self, credentials: Credentials) -> Result<User, AuthError> {
        let email = normalize_email(&credentials.email)?;

        let account = self
            .find_account(&email)?
            .ok_or(AuthError::InvalidCredentials)?;

        let expected = account
            .password_digest
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;

        if password_digest(&account.uid, &credentials.password) != expected {
            debug!(uid = %account.uid, "password mismatch");

            return Err(AuthError::InvalidCredentials);
        }

        info!(uid = %account.uid, "signed in");

        self.start_session(account.user())
    }

    async fn sign_in_federated(&self, identity: FederatedIdentity) -> Result<User, AuthError> {
        let email = normalize_email(&identity.email)?;

        let account = match self.find_account(&email)? {
            Some(account) => account,
            None => {
                let account = AccountRecord {
                    uid: UserId::generate(),
                    email,
                    display_name: identity.display_name,
                    password_digest: None,
                    provider: Some(identity.provider),
                };

                self.save_account(&account)?;

                info!(uid = %account.uid, provider = ?identity.provider, "federated account created");

                account
            }
        };

        self.start_session(account.user())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.storage.remove(SESSION_KEY)?;

        self.announce(None);

        info!("signed out");

        Ok(())
    }

    async fn update_display_name(&self, display_name: String) -> Result<User, AuthError> {
        let user = self.current_user().ok_or(AuthError::NotSignedIn)?;

        let mut account = self
            .docs
            .get::<AccountRecord>(ACCOUNTS, user.uid.as_str())?
            .ok_or(AuthError::NotSignedIn)?;

        account.display_name = Some(display_name);

        self.save_account(&account)?;

        self.start_session(account.user())
    }

    async fn send_password_reset(&self, email: String) -> Result<(), AuthError> {
        let email = normalize_email(&email)?;

        match self.find_account(&email)? {
            Some(account) if account.password_digest.is_some() => {
                info!(uid = %account.uid, "password reset requested");
            }
            _ => debug!("password reset requested for an address without a password"),
        }

        Ok(())
    }

    fn current_user(&self) -> Option<User> {
        self.storage.read_json(SESSION_KEY)
    }

    fn subscribe(&self) -> broadcast::Receiver<IdTokenChanged> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::storage::MemoryStore;

    use super::*;

    fn provider() -> (Arc<MemoryStore>, LocalIdentityProvider) {
        let storage = Arc::new(MemoryStore::new());
        let provider = LocalIdentityProvider::new(Documents::in_memory(), storage.clone());

        (storage, provider)
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() -> TestResult {
        let (_, provider) = provider();

        let created = provider
            .sign_up(Credentials::new("Ann@Example.com", "secret1"))
            .await?;

        assert_eq!(created.email, "ann@example.com");

        provider.sign_out().await?;
        assert_eq!(provider.current_user(), None);

        let signed_in = provider
            .sign_in(Credentials::new("ann@example.com", "secret1"))
            .await?;

        assert_eq!(signed_in.uid, created.uid);
        assert_eq!(provider.current_user(), Some(signed_in));

        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() -> TestResult {
        let (_, provider) = provider();

        provider
            .sign_up(Credentials::new("ann@example.com", "secret1"))
            .await?;

        let result = provider
            .sign_in(Credentials::new("ann@example.com", "secret2"))
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        Ok(())
    }

    #[tokio::test]
    async fn short_password_and_duplicate_email_are_rejected() -> TestResult {
        let (_, provider) = provider();

        let short = provider
            .sign_up(Credentials::new("ann@example.com", "12345"))
            .await;

        assert!(matches!(short, Err(AuthError::WeakPassword(6))));

        provider
            .sign_up(Credentials::new("ann@example.com", "123456"))
            .await?;

        let duplicate = provider
            .sign_up(Credentials::new("ANN@example.com", "abcdef"))
            .await;

        assert!(matches!(duplicate, Err(AuthError::EmailInUse)));

        Ok(())
    }

    #[tokio::test]
    async fn sign_out_clears_session_key() -> TestResult {
        let (storage, provider) = provider();

        provider
            .sign_up(Credentials::new("ann@example.com", "secret1"))
            .await?;

        assert!(storage.get(SESSION_KEY)?.is_some());

        provider.sign_out().await?;

        assert_eq!(storage.get(SESSION_KEY)?, None);

        Ok(())
    }

    #[tokio::test]
    async fn federated_sign_in_reuses_account() -> TestResult {
        let (_, provider) = provider();

        let identity = FederatedIdentity {
            provider: FederatedProvider::Google,
            email: "bob@example.com".to_string(),
            display_name: Some("Bob".to_string()),
        };

        let first = provider.sign_in_federated(identity.clone()).await?;
        let second = provider.sign_in_federated(identity).await?;

        assert_eq!(first.uid, second.uid);
        assert_eq!(second.display_name.as_deref(), Some("Bob"));

        // No password was ever set for this account.
        let password = provider
            .sign_in(Credentials::new("bob@example.com", "anything"))
            .await;

        assert!(matches!(password, Err(AuthError::InvalidCredentials)));

        Ok(())
    }

    #[tokio::test]
    async fn token_changes_are_announced() -> TestResult {
        let (_, provider) = provider();
        let mut events = provider.subscribe();

        let user = provider
            .sign_up(Credentials::new("ann@example.com", "secret1"))
            .await?;
        provider.sign_out().await?;

        assert_eq!(events.recv().await?.user, Some(user));
        assert_eq!(events.recv().await?.user, None);

        Ok(())
    }
}
