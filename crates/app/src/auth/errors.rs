//! Auth errors.

use thiserror::Error;

use crate::{documents::DocumentError, domain::users::UsersServiceError, storage::StorageError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email address")]
    InvalidEmail,

    #[error("password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("an account with this email already exists")]
    EmailInUse,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("not signed in")]
    NotSignedIn,

    #[error("account storage error")]
    Backend(#[from] DocumentError),

    #[error("session storage error")]
    Session(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("profile error")]
    Profile(#[from] UsersServiceError),
}
