//! Static AWS credentials sourced from the process environment.
//!
//! Reads `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY` (both required) and
//! `AWS_SESSION_TOKEN` (optional). Secret parts are wrapped in
//! [`SecretString`] and are only exposed while computing a signature.

use secrecy::SecretString;
use thiserror::Error;

pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
}

/// Long-lived or temporary AWS credentials.
///
/// `Debug` output redacts the secret key and session token.
#[derive(Debug)]
pub struct AwsCredentials {
    access_key_id: String,
    secret_access_key: SecretString,
    session_token: Option<SecretString>,
}

impl AwsCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: SecretString,
        session_token: Option<SecretString>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key,
            session_token,
        }
    }

    /// Load credentials from the process environment.
    pub fn from_env() -> Result<Self, CredentialsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load credentials through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CredentialsError> {
        let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let access_key_id = read(ACCESS_KEY_ID_VAR).ok_or(CredentialsError::Missing(ACCESS_KEY_ID_VAR))?;
        let secret_access_key =
            read(SECRET_ACCESS_KEY_VAR).ok_or(CredentialsError::Missing(SECRET_ACCESS_KEY_VAR))?;
        let session_token = read(SESSION_TOKEN_VAR).map(SecretString::from);

        Ok(Self::new(
            access_key_id,
            SecretString::from(secret_access_key),
            session_token,
        ))
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub(crate) fn secret_access_key(&self) -> &SecretString {
        &self.secret_access_key
    }

    pub(crate) fn session_token(&self) -> Option<&SecretString> {
        self.session_token.as_ref()
    }
}
