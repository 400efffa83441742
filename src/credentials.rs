//! Credential attachment.
//!
//! The transport never inspects credentials; it hands each outbound request
//! to a [`Credentials`] implementation which mutates its headers.

use std::fmt;

use reqwest::header::{HeaderValue, AUTHORIZATION};

use crate::error::{Error, Result};

/// Adds authentication material to an outbound request.
pub trait Credentials: Send + Sync + fmt::Debug {
    fn set(&self, request: &mut reqwest::Request);
}

/// `Authorization: OAuth <token>`.
#[derive(Clone)]
pub struct TokenCredentials {
    header: HeaderValue,
}

impl TokenCredentials {
    /// Fails if the token contains bytes not allowed in a header.
    pub fn new(token: &str) -> Result<Self> {
        let mut header =
            HeaderValue::from_str(&format!("OAuth {token}")).map_err(|_| Error::InvalidToken)?;
        header.set_sensitive(true);
        Ok(Self { header })
    }
}

impl Credentials for TokenCredentials {
    fn set(&self, request: &mut reqwest::Request) {
        request.headers_mut().insert(AUTHORIZATION, self.header.clone());
    }
}

impl fmt::Debug for TokenCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCredentials").field("token", &"<redacted>").finish()
    }
}
