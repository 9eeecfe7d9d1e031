// src/client.rs

use crate::error::OidcBearerError;
use crate::model::JsonWebKeySet;
use jsonwebtoken::DecodingKey;
use moka::future::Cache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use url::Url;

/// A client for fetching and caching JSON Web Keys (JWKs) from an OIDC
/// provider's JWKS endpoint.
///
/// Keys are cached per `kid`. A lookup that misses the cache performs at most
/// one refresh of the key set before reporting the key as unknown, so a
/// token referencing a rotated-in key is picked up without a retry storm
/// against the provider.
#[derive(Clone)]
pub struct JwksClient {
    // The client is internally ref-counted to allow for cheap cloning.
    inner: Arc<Inner>,
}

struct Inner {
    jwks_uri: Url,
    http_client: reqwest::Client,
    default_cache_ttl: Duration,
    // Cache stores `kid` -> `DecodingKey`, each entry carrying its own TTL.
    key_cache: Cache<String, CachedKey>,
    // Serializes key-set refreshes so concurrent misses share one fetch.
    refresh_lock: Mutex<()>,
}

#[derive(Clone)]
struct CachedKey {
    key: Arc<DecodingKey>,
    ttl: Duration,
}

struct PerKeyTtl;

impl Expiry<String, CachedKey> for PerKeyTtl {
    fn expire_after_create(
        &self,
        _kid: &String,
        entry: &CachedKey,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

impl JwksClient {
    /// Creates a new `JwksClient` bound to the given JWKS endpoint.
    pub(crate) fn new(
        jwks_uri: Url,
        http_client: reqwest::Client,
        default_cache_ttl: Duration,
    ) -> Self {
        let key_cache = Cache::builder()
            .max_capacity(100) // Max 100 keys, should be more than enough.
            .expire_after(PerKeyTtl)
            .build();
        Self {
            inner: Arc::new(Inner {
                jwks_uri,
                http_client,
                default_cache_ttl,
                key_cache,
                refresh_lock: Mutex::new(()),
            }),
        }
    }

    /// Retrieves a decoding key for the given Key ID (`kid`).
    ///
    /// It first checks the in-memory cache. On a miss it fetches the JWKS
    /// from the provider exactly once, repopulates the cache, and looks the
    /// key up again before declaring it unknown.
    #[instrument(skip(self), err)]
    pub async fn get_key(&self, kid: &str) -> Result<Arc<DecodingKey>, OidcBearerError> {
        if let Some(entry) = self.inner.key_cache.get(kid).await {
            debug!("JWK cache hit for kid: {}", kid);
            return Ok(entry.key);
        }

        let _refresh = self.inner.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock.
        if let Some(entry) = self.inner.key_cache.get(kid).await {
            return Ok(entry.key);
        }

        debug!("JWK cache miss for kid: {}. Fetching from provider.", kid);
        self.fetch_and_cache_keys().await?;

        self.inner
            .key_cache
            .get(kid)
            .await
            .map(|entry| entry.key)
            .ok_or_else(|| OidcBearerError::KeyNotFound(kid.to_string()))
    }

    /// Fetches the JWKS from the OIDC provider and populates the cache.
    async fn fetch_and_cache_keys(&self) -> Result<(), OidcBearerError> {
        let url = &self.inner.jwks_uri;
        let response = self
            .inner
            .http_client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| OidcBearerError::Http {
                url: url.clone(),
                source,
            })?;

        let cache_ttl = parse_cache_control(&response).unwrap_or(self.inner.default_cache_ttl);

        let jwks: JsonWebKeySet =
            response
                .json()
                .await
                .map_err(|source| OidcBearerError::Http {
                    url: url.clone(),
                    source,
                })?;

        debug!(
            "Fetched {} keys from {}. Caching with TTL: {:?}",
            jwks.keys.len(),
            url,
            cache_ttl
        );

        for jwk in jwks.keys {
            let Some(kid) = jwk.kid else {
                debug!("Skipping JWK without a kid");
                continue;
            };
            // Only RSA keys are supported, as they are the most common for OIDC.
            if jwk.kty != "RSA" {
                debug!("Skipping non-RSA JWK with kid: {}", kid);
                continue;
            }
            let (Some(n), Some(e)) = (&jwk.n, &jwk.e) else {
                warn!("Skipping RSA JWK with kid {} missing 'n' or 'e'", kid);
                continue;
            };
            let decoding_key = match DecodingKey::from_rsa_components(n, e) {
                Ok(key) => key,
                Err(err) => {
                    warn!("Skipping malformed RSA JWK with kid {}: {}", kid, err);
                    continue;
                }
            };
            self.inner
                .key_cache
                .insert(
                    kid,
                    CachedKey {
                        key: Arc::new(decoding_key),
                        ttl: cache_ttl,
                    },
                )
                .await;
        }

        Ok(())
    }
}

/// Parses the `Cache-Control` header to determine the key TTL.
fn parse_cache_control(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::CACHE_CONTROL)?
        .to_str()
        .ok()?
        .split(',')
        .find_map(|part| {
            part.trim()
                .strip_prefix("max-age=")?
                .parse::<u64>()
                .ok()
                .map(Duration::from_secs)
        })
}
