// Identity assertions returned by the OpenID provider

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

/// Errors raised while checking a provider response
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid provider URL: {0}")]
    InvalidProvider(String),

    #[error("Login cancelled at the identity provider")]
    Cancelled,

    #[error("Unexpected OpenID mode: {0}")]
    UnexpectedMode(String),

    #[error("Provider response carries no identity")]
    MissingIdentity,

    #[error("Identity not issued by the configured provider: {0}")]
    UntrustedIdentity(String),
}

/// Turns the provider's response parameters into a verified identity URL
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, params: &HashMap<String, String>) -> Result<String, VerificationError>;
}

/// Accepts positive assertions whose identity lives under the provider host
///
/// Signature checking of the assertion is left to the provider integration.
#[derive(Debug, Clone)]
pub struct AssertionVerifier {
    provider_host: String,
}

impl AssertionVerifier {
    pub fn for_provider(provider: &str) -> Result<Self, VerificationError> {
        let host = Url::parse(provider)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .ok_or_else(|| VerificationError::InvalidProvider(provider.to_string()))?;
        Ok(Self {
            provider_host: host,
        })
    }

    fn is_trusted(&self, identity: &str) -> bool {
        let Ok(url) = Url::parse(identity) else {
            return false;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        url.host_str().is_some_and(|host| {
            host == self.provider_host
                || host
                    .strip_suffix(&self.provider_host)
                    .is_some_and(|account| account.ends_with('.') && account.len() > 1)
        })
    }
}

#[async_trait]
impl IdentityVerifier for AssertionVerifier {
    async fn verify(&self, params: &HashMap<String, String>) -> Result<String, VerificationError> {
        match params.get("openid.mode").map(String::as_str) {
            Some("id_res") => {}
            Some("cancel") => return Err(VerificationError::Cancelled),
            other => {
                return Err(VerificationError::UnexpectedMode(
                    other.unwrap_or_default().to_string(),
                ))
            }
        }

        let identity = params
            .get("openid.identity")
            .or_else(|| params.get("openid.claimed_id"))
            .ok_or(VerificationError::MissingIdentity)?;

        if self.is_trusted(identity) {
            Ok(identity.clone())
        } else {
            Err(VerificationError::UntrustedIdentity(identity.clone()))
        }
    }
}
