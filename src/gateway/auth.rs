//! Credentials and the publish API's authentication scheme.
//!
//! The remote API has changed how it wants the key presented between
//! versions. [`credential_header`] is the only code that knows.

use std::fmt;

use crate::params::ApiVersion;

const REDACTED: &str = "[REDACTED]";

/// Publish API credentials, loaded once and never logged.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    account_id: String,
}

impl Credentials {
    /// Build credentials, stripping whitespace and stray surrounding quotes.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is blank after cleaning.
    pub fn new(api_key: &str, account_id: &str) -> Result<Self, String> {
        let api_key = clean(api_key);
        let account_id = clean(account_id);
        if api_key.is_empty() {
            return Err("Blotato API key is empty".to_string());
        }
        if account_id.is_empty() {
            return Err("Blotato account id is empty".to_string());
        }
        Ok(Self { api_key, account_id })
    }

    /// The raw API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The account posts are published from.
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Replace any occurrence of the API key in `text`.
    #[must_use]
    pub fn scrub(&self, text: &str) -> String {
        text.replace(&self.api_key, REDACTED)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &REDACTED)
            .field("account_id", &self.account_id)
            .finish()
    }
}

fn clean(raw: &str) -> String {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_string()
}

/// A single HTTP header carrying the credential.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeader {
    name: &'static str,
    value: String,
}

impl AuthHeader {
    /// Header name, lowercase.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Header value, secret.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeader").field("name", &self.name).field("value", &REDACTED).finish()
    }
}

/// Build the credential header the given API version expects.
#[must_use]
pub fn credential_header(version: ApiVersion, credentials: &Credentials) -> AuthHeader {
    match version {
        ApiVersion::V1 => {
            AuthHeader { name: "blotato-api-key", value: credentials.api_key().to_string() }
        }
        ApiVersion::V2 => {
            AuthHeader { name: "authorization", value: format!("Bearer {}", credentials.api_key()) }
        }
    }
}
