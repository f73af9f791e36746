//! Driven port for durable credential storage.
//!
//! The request pipeline reads the access token before each call and rewrites
//! the pair after a refresh. Keeping storage behind this port lets tests
//! substitute an in-memory store for the on-disk one.

use std::sync::{Mutex, MutexGuard};

use super::define_port_error;
use crate::domain::{AccessToken, Credentials, RefreshToken};

define_port_error! {
    /// Errors surfaced by credential storage.
    pub enum CredentialStoreError {
        /// Storage could not be read or written.
        Unavailable { message: String } =>
            "credential storage unavailable: {message}",
        /// Stored credentials could not be decoded.
        Corrupt { message: String } =>
            "credential storage is corrupt: {message}",
    }
}

/// Port for reading and writing the bearer credential pair.
///
/// No mutual exclusion is promised across callers: a refresh racing with a
/// concurrent write may overwrite it.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    /// Read both tokens.
    fn credentials(&self) -> Result<Credentials, CredentialStoreError>;

    /// Overwrite both tokens unconditionally.
    fn set_tokens(
        &self,
        access: &AccessToken,
        refresh: &RefreshToken,
    ) -> Result<(), CredentialStoreError>;

    /// Remove both tokens. Clearing an empty store succeeds.
    fn clear_tokens(&self) -> Result<(), CredentialStoreError>;

    /// Read the access token.
    fn access_token(&self) -> Result<Option<AccessToken>, CredentialStoreError> {
        self.credentials().map(|credentials| credentials.access_token)
    }

    /// Read the refresh token.
    fn refresh_token(&self) -> Result<Option<RefreshToken>, CredentialStoreError> {
        self.credentials().map(|credentials| credentials.refresh_token)
    }
}

/// Process-local credential store.
///
/// Used by tests and by callers that do not want tokens persisted.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: Mutex<Credentials>,
}

impl InMemoryCredentialStore {
    /// Create a store pre-populated with both tokens.
    pub fn with_tokens(access: AccessToken, refresh: RefreshToken) -> Self {
        Self {
            credentials: Mutex::new(Credentials::new(access, refresh)),
        }
    }

    /// Create a store holding an explicit credential pair.
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Mutex::new(credentials),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Credentials>, CredentialStoreError> {
        self.credentials
            .lock()
            .map_err(|err| CredentialStoreError::unavailable(err.to_string()))
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn credentials(&self) -> Result<Credentials, CredentialStoreError> {
        self.lock().map(|guard| guard.clone())
    }

    fn set_tokens(
        &self,
        access: &AccessToken,
        refresh: &RefreshToken,
    ) -> Result<(), CredentialStoreError> {
        *self.lock()? = Credentials::new(access.clone(), refresh.clone());
        Ok(())
    }

    fn clear_tokens(&self) -> Result<(), CredentialStoreError> {
        *self.lock()? = Credentials::default();
        Ok(())
    }
}
