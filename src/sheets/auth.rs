//! Access tokens for the Sheets API
//!
//! A service account signs a short-lived JWT assertion and trades it at the
//! account's token endpoint for an OAuth access token. Issued tokens last
//! about an hour, so they are cached and replaced shortly before expiry.

use crate::config::SheetsAuth;
use async_trait::async_trait;
use chrono::{DateTime, Duration as TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Longest assertion lifetime the token endpoint accepts
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Cached tokens this close to expiry are replaced before use
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to read credentials file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid credentials file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// The fields of a service account key file that token minting needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let raw = std::fs::read_to_string(path).map_err(|source| AuthError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Bearer token for the next API call
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String, AuthError>;
}

/// A freshly issued token and the instant it stops working
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    fn usable_at(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Trades credentials for a new token on every call
#[async_trait]
pub trait TokenFetcher: Send + Sync {
    async fn fetch(&self) -> Result<IssuedToken, AuthError>;
}

#[async_trait]
impl<T: TokenFetcher + ?Sized> TokenFetcher for Arc<T> {
    async fn fetch(&self) -> Result<IssuedToken, AuthError> {
        (**self).fetch().await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Token taken verbatim from configuration; never refreshed
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// JWT bearer grant (RFC 7523) against the key's token endpoint
pub struct ServiceAccountFetcher {
    client: Client,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
}

impl ServiceAccountFetcher {
    pub fn new(key: ServiceAccountKey, timeout: Duration) -> Result<Self, AuthError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            key,
            signing_key,
        })
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.key.private_key_id);
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        Ok(jsonwebtoken::encode(&header, &claims, &self.signing_key)?)
    }
}

#[async_trait]
impl TokenFetcher for ServiceAccountFetcher {
    async fn fetch(&self) -> Result<IssuedToken, AuthError> {
        let issued_at = Utc::now();
        let assertion = self.assertion(issued_at)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!(
            account = %self.key.client_email,
            expires_in = token.expires_in,
            "Sheets access token issued"
        );
        let lifetime = TimeDelta::try_seconds(token.expires_in).unwrap_or_default();
        Ok(IssuedToken {
            access_token: token.access_token,
            expires_at: issued_at.checked_add_signed(lifetime).unwrap_or(issued_at),
        })
    }
}

/// Reuses the last issued token until it is about to expire
pub struct CachedTokens<F> {
    fetcher: F,
    current: Mutex<Option<IssuedToken>>,
}

impl<F: TokenFetcher> CachedTokens<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            current: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<F: TokenFetcher> TokenProvider for CachedTokens<F> {
    async fn token(&self) -> Result<String, AuthError> {
        // Held across the fetch so concurrent callers share one refresh
        let mut current = self.current.lock().await;
        if let Some(token) = current.as_ref().filter(|t| t.usable_at(Utc::now())) {
            return Ok(token.access_token.clone());
        }

        let fresh = self.fetcher.fetch().await?;
        let access_token = fresh.access_token.clone();
        *current = Some(fresh);
        Ok(access_token)
    }
}

/// Token provider for the configured Sheets credentials
pub fn provider_for(
    auth: &SheetsAuth,
    timeout: Duration,
) -> Result<Arc<dyn TokenProvider>, AuthError> {
    match auth {
        SheetsAuth::ServiceAccount(path) => {
            let key = ServiceAccountKey::from_file(path)?;
            tracing::info!(account = %key.client_email, "Using Sheets service account");
            let fetcher = ServiceAccountFetcher::new(key, timeout)?;
            Ok(Arc::new(CachedTokens::new(fetcher)))
        }
        SheetsAuth::AccessToken(token) => {
            tracing::warn!("Using a fixed Sheets access token; it will not be refreshed");
            Ok(Arc::new(StaticToken::new(token.clone())))
        }
    }
}
