// src/config.rs

use crate::error::OidcBearerError;
use std::time::Duration;
use url::Url;

/// Environment variable holding the discovery-document URL. When it is unset
/// or empty, verification is disabled.
pub const DISCOVERY_URL_ENV: &str = "OIDC_CONFIGURATION_URL";

/// Environment variable holding the expected `aud` claim value.
pub const AUDIENCE_ENV: &str = "OIDC_AUDIENCE";

const DEFAULT_AUDIENCE: &str = "account";
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_JWKS_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// The process-level inputs for a [`ConfigProvider`](crate::provider::ConfigProvider).
///
/// These are consumed once at load time. Construct them with
/// [`ProviderSettings::builder`] or read them from the environment with
/// [`ProviderSettings::from_env`].
#[derive(Clone)]
pub struct ProviderSettings {
    /// URL of the provider's `.well-known/openid-configuration` document.
    /// `None` disables verification entirely.
    pub discovery_url: Option<Url>,
    /// The expected `aud` claim value. Mandatory whenever a discovery URL is
    /// configured.
    pub audience: Option<String>,
    /// Timeout applied to the discovery and JWKS fetches.
    pub fetch_timeout: Duration,
    /// Fallback TTL for cached JWKS keys when the endpoint sends no
    /// `Cache-Control` header.
    pub jwks_cache_ttl: Duration,
}

impl ProviderSettings {
    /// Creates a new [`SettingsBuilder`].
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Reads the settings from the process environment.
    ///
    /// `OIDC_CONFIGURATION_URL` unset or empty means verification is
    /// disabled. `OIDC_AUDIENCE` falls back to `"account"` when unset.
    pub fn from_env() -> Result<Self, OidcBearerError> {
        let mut builder = Self::builder();
        if let Some(url) = std::env::var(DISCOVERY_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            builder = builder.discovery_url(&url)?;
        }
        let audience = std::env::var(AUDIENCE_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUDIENCE.to_string());
        Ok(builder.audience(audience).build())
    }
}

/// A builder for [`ProviderSettings`].
#[derive(Default)]
pub struct SettingsBuilder {
    discovery_url: Option<Url>,
    audience: Option<String>,
    fetch_timeout: Option<Duration>,
    jwks_cache_ttl: Option<Duration>,
}

impl SettingsBuilder {
    /// Creates a new `SettingsBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the discovery-document URL. Leaving it unset disables
    /// verification.
    pub fn discovery_url(mut self, url: &str) -> Result<Self, OidcBearerError> {
        let parsed = Url::parse(url).map_err(|e| OidcBearerError::InvalidUrl(e.to_string()))?;
        self.discovery_url = Some(parsed);
        Ok(self)
    }

    /// Sets the expected `aud` claim value. Required whenever a discovery
    /// URL is configured.
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Sets the timeout for discovery and JWKS fetches.
    /// Defaults to 10 seconds.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Sets the fallback cache TTL for JWKS keys. This is optional.
    pub fn jwks_cache_ttl(mut self, ttl: Duration) -> Self {
        self.jwks_cache_ttl = Some(ttl);
        self
    }

    /// Consumes the builder and returns the settings.
    ///
    /// A missing audience is not rejected here: whether it is required
    /// depends on whether a discovery URL is present, which is checked when
    /// the provider loads.
    pub fn build(self) -> ProviderSettings {
        ProviderSettings {
            discovery_url: self.discovery_url,
            audience: self.audience,
            fetch_timeout: self.fetch_timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT),
            jwks_cache_ttl: self.jwks_cache_ttl.unwrap_or(DEFAULT_JWKS_CACHE_TTL),
        }
    }
}
