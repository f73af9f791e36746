//! Credential storage adapters.

mod file_credential_store;

pub use file_credential_store::{
    ACCESS_TOKEN_KEY, CREDENTIALS_FILE_NAME, FileCredentialStore, REFRESH_TOKEN_KEY,
};
