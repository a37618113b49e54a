//! Users service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    auth::models::{User, UserId},
    clock::Clock,
    documents::{
        Documents,
        collections::{SPECIAL_USERS, USERS},
    },
    domain::users::{
        errors::UsersServiceError,
        models::{ProfileUpdate, SpecialUser, UserProfile},
    },
};

pub struct DocUsersService {
    docs: Documents,
    clock: Arc<dyn Clock>,
}

impl DocUsersService {
    #[must_use]
    pub fn new(docs: Documents, clock: Arc<dyn Clock>) -> Self {
        Self { docs, clock }
    }

    fn load(&self, user: &UserId) -> Result<Option<UserProfile>, UsersServiceError> {
        Ok(self.docs.get::<UserProfile>(USERS, user.as_str())?)
    }
}

#[async_trait]
impl UsersService for DocUsersService {
    async fn create_profile(
        &self,
        user: UserId,
        email: String,
    ) -> Result<UserProfile, UsersServiceError> {
        if self.load(&user)?.is_some() {
            return Err(UsersServiceError::AlreadyExists);
        }

        let profile = UserProfile {
            uid: user,
            email,
            created_at: self.clock.now(),
            display_name: None,
            phone: None,
            address: None,
        };

        self.docs.set(USERS, profile.uid.as_str(), &profile)?;

        info!(uid = %profile.uid, "profile created");

        Ok(profile)
    }

    async fn get_profile(&self, user: UserId) -> Result<UserProfile, UsersServiceError> {
        self.load(&user)?.ok_or(UsersServiceError::NotFound)
    }

    async fn find_profile(&self, user: UserId) -> Result<Option<UserProfile>, UsersServiceError> {
        self.load(&user)
    }

    async fn update_profile(
        &self,
        user: User,
        update: ProfileUpdate,
    ) -> Result<UserProfile, UsersServiceError> {
        // Federated accounts may not have a profile yet.
        let mut profile = self.load(&user.uid)?.unwrap_or_else(|| UserProfile {
            uid: user.uid.clone(),
            email: user.email.clone(),
            created_at: self.clock.now(),
            display_name: user.display_name.clone(),
            phone: None,
            address: None,
        });

        if let Some(display_name) = update.display_name {
            profile.display_name = Some(display_name);
        }

        if let Some(phone) = update.phone {
            profile.phone = Some(phone);
        }

        if let Some(address) = update.address {
            profile.address = Some(address);
        }

        self.docs.set(USERS, profile.uid.as_str(), &profile)?;

        info!(uid = %profile.uid, "profile updated");

        Ok(profile)
    }

    async fn is_admin(&self, email: String) -> Result<bool, UsersServiceError> {
        Ok(!self
            .docs
            .find::<SpecialUser, _>(SPECIAL_USERS, |entry| entry.email == email && entry.is_admin)?
            .is_empty())
    }

    async fn grant_admin(&self, email: String) -> Result<(), UsersServiceError> {
        let email = email.trim().to_ascii_lowercase();

        self.docs.set(
            SPECIAL_USERS,
            &email,
            &SpecialUser {
                email: email.clone(),
                is_admin: true,
            },
        )?;

        info!(%email, "admin granted");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Create the profile document for a new account.
    async fn create_profile(
        &self,
        user: UserId,
        email: String,
    ) -> Result<UserProfile, UsersServiceError>;

    async fn get_profile(&self, user: UserId) -> Result<UserProfile, UsersServiceError>;

    /// Like [`UsersService::get_profile`], with a missing profile as `None`.
    async fn find_profile(&self, user: UserId) -> Result<Option<UserProfile>, UsersServiceError>;

    /// Apply `update`, creating the profile if the account never had one.
    async fn update_profile(
        &self,
        user: User,
        update: ProfileUpdate,
    ) -> Result<UserProfile, UsersServiceError>;

    /// Whether `email` is on the admin allow-list.
    async fn is_admin(&self, email: String) -> Result<bool, UsersServiceError>;

    /// Put `email` on the admin allow-list.
    async fn grant_admin(&self, email: String) -> Result<(), UsersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn ann() -> User {
        User {
            uid: UserId::from_string("ann"),
            email: "ann@example.com".to_string(),
            display_name: None,
        }
    }

    #[tokio::test]
    async fn create_profile_twice_is_rejected() -> TestResult {
        let ctx = TestContext::new();

        ctx.app
            .users
            .create_profile(ann().uid, ann().email)
            .await?;

        let again = ctx.app.users.create_profile(ann().uid, ann().email).await;

        assert!(matches!(again, Err(UsersServiceError::AlreadyExists)));

        Ok(())
    }

    #[tokio::test]
    async fn update_profile_creates_missing_profile() -> TestResult {
        let ctx = TestContext::new();

        let profile = ctx
            .app
            .users
            .update_profile(
                ann(),
                ProfileUpdate {
                    address: Some("Király utca 12".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await?;

        assert_eq!(profile.email, "ann@example.com");
        assert_eq!(
            ctx.app.users.get_profile(ann().uid).await?.address.as_deref(),
            Some("Király utca 12")
        );

        Ok(())
    }

    #[tokio::test]
    async fn only_allow_listed_admins_are_admins() -> TestResult {
        let ctx = TestContext::new();

        assert!(!ctx.app.users.is_admin("ann@example.com".to_string()).await?);

        ctx.app.users.grant_admin(" Ann@Example.com ".to_string()).await?;
        ctx.app.users.grant_admin("ann@example.com".to_string()).await?;

        assert!(ctx.app.users.is_admin("ann@example.com".to_string()).await?);
        assert!(!ctx.app.users.is_admin("bob@example.com".to_string()).await?);

        Ok(())
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let ctx = TestContext::new();

        let result = ctx.app.users.get_profile(UserId::from_string("nobody")).await;

        assert!(matches!(result, Err(UsersServiceError::NotFound)));
    }
}
