// src/provider.rs

use crate::client::JwksClient;
use crate::config::ProviderSettings;
use crate::error::OidcBearerError;
use crate::model::DiscoveryDocument;
use jsonwebtoken::{Algorithm, DecodingKey};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};
use url::Url;

/// The verification state resolved by a [`ConfigProvider`].
#[derive(Debug)]
pub enum Verification {
    /// A discovery URL was configured and the provider metadata was loaded.
    Enabled(OidcConfig),
    /// No discovery URL was configured: no token can be verified, and the
    /// verifier fails closed rather than letting requests through.
    Disabled,
}

impl Verification {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Verification::Enabled(_))
    }
}

/// Identity-provider metadata resolved from the discovery document.
///
/// Immutable once constructed. A reload means building a fresh
/// [`ConfigProvider`]; an instance handed to concurrent readers never
/// changes underneath them.
pub struct OidcConfig {
    signing_algorithms: Vec<Algorithm>,
    jwks_uri: Url,
    audience: String,
    keys: JwksClient,
}

impl std::fmt::Debug for OidcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcConfig")
            .field("signing_algorithms", &self.signing_algorithms)
            .field("jwks_uri", &self.jwks_uri.as_str())
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl OidcConfig {
    /// The signature algorithms accepted for bearer tokens, in the order the
    /// provider advertised them.
    pub fn signing_algorithms(&self) -> &[Algorithm] {
        &self.signing_algorithms
    }

    /// The JWKS endpoint the key resolver is bound to.
    pub fn jwks_uri(&self) -> &Url {
        &self.jwks_uri
    }

    /// The expected `aud` claim value.
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Resolves the public key for a token's `kid` header, fetching and
    /// caching remote key material as needed.
    pub async fn resolve_key(&self, kid: &str) -> Result<Arc<DecodingKey>, OidcBearerError> {
        self.keys.get_key(kid).await
    }
}

/// Resolves and caches the identity provider's discovery document.
///
/// The provider is constructed once by the service bootstrap and shared by
/// handle; cloning is cheap. The first [`load`](Self::load) fetches the
/// discovery document, and concurrent first callers await that same
/// in-flight fetch rather than issuing duplicates. Subsequent calls return
/// the cached state without locking.
#[derive(Clone)]
pub struct ConfigProvider {
    inner: Arc<Inner>,
}

struct Inner {
    settings: ProviderSettings,
    http_client: reqwest::Client,
    state: OnceCell<Verification>,
}

impl ConfigProvider {
    /// Creates a provider from the given settings.
    pub fn new(settings: ProviderSettings) -> Result<Self, OidcBearerError> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.fetch_timeout)
            .build()
            .map_err(OidcBearerError::HttpClient)?;
        Ok(Self {
            inner: Arc::new(Inner {
                settings,
                http_client,
                state: OnceCell::new(),
            }),
        })
    }

    /// Creates a provider from `OIDC_CONFIGURATION_URL` and `OIDC_AUDIENCE`.
    pub fn from_env() -> Result<Self, OidcBearerError> {
        Self::new(ProviderSettings::from_env()?)
    }

    /// Returns the verification state, loading it on first use.
    ///
    /// A failed load leaves nothing cached, so a later call may try again;
    /// this layer itself never retries.
    #[instrument(skip(self), err)]
    pub async fn load(&self) -> Result<&Verification, OidcBearerError> {
        self.inner
            .state
            .get_or_try_init(|| self.load_verification())
            .await
    }

    async fn load_verification(&self) -> Result<Verification, OidcBearerError> {
        let Some(discovery_url) = &self.inner.settings.discovery_url else {
            warn!(
                "{} is not set. No bearer-token verification will be performed.",
                crate::config::DISCOVERY_URL_ENV
            );
            return Ok(Verification::Disabled);
        };

        let audience = self
            .inner
            .settings
            .audience
            .clone()
            .ok_or(OidcBearerError::MissingConfiguration("audience"))?;

        let document = self.fetch_discovery(discovery_url).await?;

        let advertised = document
            .id_token_signing_alg_values_supported
            .unwrap_or_default();
        if advertised.is_empty() {
            return Err(OidcBearerError::DiscoveryFieldMissing {
                field: "id_token_signing_alg_values_supported",
                url: discovery_url.clone(),
            });
        }

        // Keep only algorithms the RSA-backed key resolver can actually
        // serve; providers routinely advertise HS*/ES* variants as well.
        let signing_algorithms: Vec<Algorithm> = advertised
            .iter()
            .filter_map(|name| name.parse::<Algorithm>().ok())
            .filter(is_rsa_algorithm)
            .collect();
        if signing_algorithms.is_empty() {
            return Err(OidcBearerError::InvalidConfiguration(format!(
                "none of the signing algorithms advertised at {} are supported: {:?}",
                discovery_url, advertised
            )));
        }

        let jwks_uri = document.jwks_uri.ok_or_else(|| {
            OidcBearerError::DiscoveryFieldMissing {
                field: "jwks_uri",
                url: discovery_url.clone(),
            }
        })?;
        let jwks_uri =
            Url::parse(&jwks_uri).map_err(|e| OidcBearerError::InvalidUrl(e.to_string()))?;

        let keys = JwksClient::new(
            jwks_uri.clone(),
            self.inner.http_client.clone(),
            self.inner.settings.jwks_cache_ttl,
        );

        debug!(
            "OIDC configuration loaded: algorithms {:?}, JWKS at {}",
            signing_algorithms, jwks_uri
        );
        Ok(Verification::Enabled(OidcConfig {
            signing_algorithms,
            jwks_uri,
            audience,
            keys,
        }))
    }

    async fn fetch_discovery(&self, url: &Url) -> Result<DiscoveryDocument, OidcBearerError> {
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
        response
            .json()
            .await
            .map_err(|source| OidcBearerError::Http {
                url: url.clone(),
                source,
            })
    }
}

fn is_rsa_algorithm(alg: &Algorithm) -> bool {
    matches!(
        alg,
        Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512
    )
}
