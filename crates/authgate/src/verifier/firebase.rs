//! Firebase ID token verifier.
//!
//! Signature and expiry checks are delegated to `jsonwebtoken`. This module
//! fetches Google's published signing keys and applies the Firebase claim
//! rules (audience, issuer, subject).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};

use super::{TokenVerifier, VerifiedCredential, VerifyError, VerifyResult};

/// Google's JWK set for Firebase ID tokens.
pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const ISSUER_PREFIX: &str = "https://securetoken.google.com/";
const DEFAULT_KEY_TTL: Duration = Duration::from_secs(3600);
/// Minimum spacing between key-set downloads triggered by an unknown `kid`.
const FORCED_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
const MAX_SUBJECT_LEN: usize = 128;

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
    expires_at: Instant,
}

/// Verifies Firebase ID tokens for one project.
pub struct FirebaseVerifier {
    project_id: String,
    jwks_url: String,
    client: reqwest::Client,
    keys: RwLock<Option<CachedKeys>>,
    /// Held while downloading so concurrent misses share one fetch.
    refresh: Mutex<()>,
}

impl FirebaseVerifier {
    /// Verifier using Google's key endpoint.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self::with_jwks_url(project_id, DEFAULT_JWKS_URL)
    }

    /// Verifier using a custom key endpoint.
    pub fn with_jwks_url(project_id: impl Into<String>, jwks_url: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            jwks_url: jwks_url.into(),
            client: reqwest::Client::new(),
            keys: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Expected `iss` claim.
    pub fn issuer(&self) -> String {
        format!("{ISSUER_PREFIX}{}", self.project_id)
    }

    /// Decoding key for `kid`.
    ///
    /// The key set is downloaded when missing or past its `max-age`. An
    /// unknown `kid` against a live key set forces a download (Google rotates
    /// keys early), but at most once per `FORCED_REFRESH_INTERVAL`.
    async fn decoding_key(&self, kid: &str) -> VerifyResult<DecodingKey> {
        if let Some(key) = self.cached_key(kid).await? {
            return Ok(key);
        }

        let _refresh = self.refresh.lock().await;

        // Another request may have refreshed while we waited.
        if let Some(key) = self.cached_key(kid).await? {
            return Ok(key);
        }

        let now = Instant::now();
        let throttled = self.keys.read().await.as_ref().is_some_and(|cached| {
            cached.expires_at > now
                && now.duration_since(cached.fetched_at) < FORCED_REFRESH_INTERVAL
        });
        if throttled {
            return Err(unknown_kid(kid));
        }

        let fresh = self.fetch_keys().await?;
        let key = find_key(&fresh.keys, kid)?;
        *self.keys.write().await = Some(fresh);

        key.ok_or_else(|| unknown_kid(kid))
    }

    async fn cached_key(&self, kid: &str) -> VerifyResult<Option<DecodingKey>> {
        let guard = self.keys.read().await;
        match guard.as_ref() {
            Some(cached) if cached.expires_at > Instant::now() => find_key(&cached.keys, kid),
            _ => Ok(None),
        }
    }

    #[instrument(skip(self), fields(url = %self.jwks_url))]
    async fn fetch_keys(&self) -> VerifyResult<CachedKeys> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| VerifyError::Unavailable(format!("fetching signing keys: {e}")))?;

        let ttl = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(max_age)
            .unwrap_or(DEFAULT_KEY_TTL);

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| VerifyError::Unavailable(format!("parsing signing keys: {e}")))?;

        debug!(
            count = keys.keys.len(),
            ttl_secs = ttl.as_secs(),
            "refreshed Firebase signing keys"
        );

        let fetched_at = Instant::now();
        Ok(CachedKeys {
            keys,
            fetched_at,
            expires_at: fetched_at + ttl,
        })
    }
}

fn unknown_kid(kid: &str) -> VerifyError {
    VerifyError::InvalidToken(format!("no signing key for kid {kid}"))
}

fn find_key(keys: &JwkSet, kid: &str) -> VerifyResult<Option<DecodingKey>> {
    keys.find(kid)
        .map(|jwk| {
            DecodingKey::from_jwk(jwk)
                .map_err(|e| VerifyError::Unavailable(format!("malformed signing key {kid}: {e}")))
        })
        .transpose()
}

/// `max-age` directive of a Cache-Control header.
fn max_age(cache_control: &str) -> Option<Duration> {
    cache_control
        .split(',')
        .map(str::trim)
        .find_map(|directive| directive.strip_prefix("max-age="))
        .and_then(|secs| secs.parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> VerifyResult<VerifiedCredential> {
        let header = decode_header(token)
            .map_err(|e| VerifyError::InvalidToken(format!("malformed token header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(VerifyError::InvalidToken(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| VerifyError::InvalidToken("token header has no kid".to_string()))?;
        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);

        let claims = decode::<FirebaseClaims>(token, &key, &validation)
            .map_err(|e| VerifyError::InvalidToken(e.to_string()))?
            .claims;

        if claims.sub.is_empty() || claims.sub.len() > MAX_SUBJECT_LEN {
            return Err(VerifyError::InvalidToken(
                "subject claim must be 1-128 characters".to_string(),
            ));
        }

        Ok(VerifiedCredential {
            subject_id: claims.sub,
            email: claims.email,
            phone_number: claims.phone_number,
        })
    }
}
