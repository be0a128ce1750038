//! Firebase ID token verification.
//!
//! Tokens are RS256 JWTs signed by one of Google's rotating
//! `securetoken@system.gserviceaccount.com` keys. The published key set is
//! cached for as long as its `Cache-Control: max-age` allows and refetched
//! early when a token names a key id the cache does not know, at most once
//! a minute.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use moka::Expiry;
use moka::future::Cache;
use pet_buddy_core::Email;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::FirebaseConfig;

/// Google's JWK endpoint for Firebase Auth signing keys.
pub const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Key set lifetime when the response carries no usable `max-age`.
const DEFAULT_KEYS_MAX_AGE: Duration = Duration::from_secs(3600);

/// Minimum age of the cached key set before an unknown key id may trigger
/// a refetch.
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

/// Clock skew allowed on `exp` and `auth_time`.
const LEEWAY_SECS: u64 = 60;

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Firebase user id (`sub`).
    pub uid: String,
    /// Email from the token.
    pub email: Email,
}

/// Errors that can occur while verifying a token.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The token header is unreadable or lacks a key id.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Signature, audience, issuer or expiry check failed.
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// The token names a key Google does not publish.
    #[error("unknown signing key: {0}")]
    UnknownKey(String),

    /// The token carries no usable email.
    #[error("token has no valid email claim")]
    MissingEmail,

    /// The token subject is empty.
    #[error("token has no subject")]
    MissingSubject,

    /// `auth_time` is in the future.
    #[error("token auth_time is in the future")]
    FutureAuthTime,

    /// The signing keys could not be fetched.
    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(String),
}

/// Verifies bearer tokens.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` and return the identity it asserts.
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError>;
}

/// Claims of a Firebase ID token the server reads.
#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    auth_time: Option<u64>,
}

/// Decoding keys by key id, plus how long they may be cached.
struct KeySet {
    keys: HashMap<String, DecodingKey>,
    max_age: Duration,
    fetched_at: Instant,
}

struct KeySetExpiry;

impl Expiry<(), Arc<KeySet>> for KeySetExpiry {
    fn expire_after_create(
        &self,
        _key: &(),
        value: &Arc<KeySet>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.max_age)
    }
}

/// Verifies Firebase ID tokens against Google's published keys.
#[derive(Clone)]
pub struct FirebaseVerifier {
    inner: Arc<FirebaseVerifierInner>,
}

struct FirebaseVerifierInner {
    client: reqwest::Client,
    keys_url: String,
    validation: Validation,
    keys: Cache<(), Arc<KeySet>>,
    refetch_floor: Duration,
}

impl FirebaseVerifier {
    /// Create a verifier for the configured Firebase project.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self::with_keys_url(config, GOOGLE_JWKS_URL)
    }

    /// Create a verifier that fetches keys from `keys_url`.
    #[must_use]
    pub fn with_keys_url(config: &FirebaseConfig, keys_url: &str) -> Self {
        Self::build(config, keys_url, MIN_REFETCH_INTERVAL)
    }

    fn build(config: &FirebaseConfig, keys_url: &str, refetch_floor: Duration) -> Self {
        let keys = Cache::builder()
            .max_capacity(1)
            .expire_after(KeySetExpiry)
            .build();

        Self {
            inner: Arc::new(FirebaseVerifierInner {
                client: reqwest::Client::new(),
                keys_url: keys_url.to_owned(),
                validation: firebase_validation(&config.project_id),
                keys,
                refetch_floor,
            }),
        }
    }

    async fn key_set(&self) -> Result<Arc<KeySet>, IdentityError> {
        self.inner
            .keys
            .try_get_with((), self.fetch_keys())
            .await
            .map_err(|e| match e.as_ref() {
                IdentityError::KeyFetch(reason) => IdentityError::KeyFetch(reason.clone()),
                other => IdentityError::KeyFetch(other.to_string()),
            })
    }

    #[instrument(skip(self))]
    async fn fetch_keys(&self) -> Result<Arc<KeySet>, IdentityError> {
        let response = self
            .inner
            .client
            .get(&self.inner.keys_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| IdentityError::KeyFetch(e.to_string()))?;

        let max_age = max_age(
            response
                .headers()
                .get(reqwest::header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
        );

        let set: JwkSet = response
            .json()
            .await
            .map_err(|e| IdentityError::KeyFetch(e.to_string()))?;

        let keys: HashMap<String, DecodingKey> = set
            .keys
            .iter()
            .filter_map(|jwk| {
                let kid = jwk.common.key_id.clone()?;
                DecodingKey::from_jwk(jwk).ok().map(|key| (kid, key))
            })
            .collect();

        debug!(count = keys.len(), max_age_secs = max_age.as_secs(), "Fetched signing keys");
        Ok(Arc::new(KeySet {
            keys,
            max_age,
            fetched_at: Instant::now(),
        }))
    }
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        let header = decode_header(token).map_err(|e| IdentityError::Malformed(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| IdentityError::Malformed("missing kid".to_owned()))?;

        let mut set = self.key_set().await?;
        if !set.keys.contains_key(&kid) && set.fetched_at.elapsed() >= self.inner.refetch_floor {
            // Keys may have rotated since the last fetch.
            debug!(%kid, "Unknown key id, refetching signing keys");
            self.inner.keys.invalidate(&()).await;
            set = self.key_set().await?;
        }
        let key = set
            .keys
            .get(&kid)
            .ok_or_else(|| IdentityError::UnknownKey(kid.clone()))?;

        let claims = decode::<FirebaseClaims>(token, key, &self.inner.validation)?.claims;
        identity_from_claims(claims, jsonwebtoken::get_current_timestamp())
    }
}

fn firebase_validation(project_id: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[project_id]);
    validation.set_issuer(&[format!("https://securetoken.google.com/{project_id}")]);
    validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);
    validation.leeway = LEEWAY_SECS;
    validation
}

fn identity_from_claims(claims: FirebaseClaims, now: u64) -> Result<Identity, IdentityError> {
    if claims.sub.trim().is_empty() {
        return Err(IdentityError::MissingSubject);
    }
    if claims
        .auth_time
        .is_some_and(|at| at > now.saturating_add(LEEWAY_SECS))
    {
        return Err(IdentityError::FutureAuthTime);
    }
    let email = claims
        .email
        .as_deref()
        .and_then(|e| Email::parse(e).ok())
        .ok_or(IdentityError::MissingEmail)?;

    Ok(Identity {
        uid: claims.sub,
        email,
    })
}

/// Read `max-age` from a `Cache-Control` header value.
fn max_age(cache_control: Option<&str>) -> Duration {
    cache_control
        .into_iter()
        .flat_map(|value| value.split(','))
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map_or(DEFAULT_KEYS_MAX_AGE, Duration::from_secs)
}

/// Fixed token → identity table for router tests.
#[cfg(test)]
#[derive(Default)]
pub struct StaticVerifier {
    tokens: HashMap<String, Identity>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
impl StaticVerifier {
    #[must_use]
    pub fn with(mut self, token: &str, uid: &str, email: &str) -> Self {
        self.tokens.insert(
            token.to_owned(),
            Identity {
                uid: uid.to_owned(),
                email: Email::parse(email).unwrap(),
            },
        );
        self
    }
}

#[cfg(test)]
#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| IdentityError::Malformed("unknown test token".to_owned()))
    }
}
