// src/error.rs

use thiserror::Error;
use url::Url;

/// The primary error type for the `oidc-bearer` library.
///
/// These are the detailed failures produced while loading provider
/// configuration and verifying tokens. At the verification boundary they are
/// collapsed into a [`Rejection`], which is what a request handler should see.
#[derive(Debug, Error)]
pub enum OidcBearerError {
    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A required configuration field is missing.
    #[error("A required configuration field is missing: {0}")]
    MissingConfiguration(&'static str),

    /// The discovery document was fetched but lacks a field the verifier
    /// cannot operate without.
    #[error("'{field}' not found in the OIDC configuration document at {url}")]
    DiscoveryFieldMissing { field: &'static str, url: Url },

    /// A configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The HTTP client itself could not be constructed.
    #[error("Failed to construct the HTTP client")]
    HttpClient(#[source] reqwest::Error),

    /// An HTTP request to the identity provider failed.
    #[error("Request to {url} failed")]
    Http {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    /// Errors originating from the `jsonwebtoken` crate during token validation.
    #[error("JWT validation error: {0}")]
    JwtValidation(#[from] jsonwebtoken::errors::Error),

    /// The token is signed with an algorithm outside the accepted set.
    #[error("Unsupported JWT algorithm: {0:?}")]
    UnsupportedAlgorithm(jsonwebtoken::Algorithm),

    /// The JWT header is missing the required 'kid' (Key ID) field.
    #[error("The JWT header is missing the 'kid' (Key ID) field")]
    MissingKeyId,

    /// A key with the specified 'kid' was not found in the JSON Web Key Set,
    /// even after refreshing it once.
    #[error("Key not found for kid: {0}")]
    KeyNotFound(String),

    /// No discovery URL was configured, so no verification can take place.
    #[error("Bearer-token verification is not configured")]
    VerificationDisabled,
}

/// The outcome of a failed verification, classified for the HTTP boundary.
///
/// [`Rejection::Expired`] and [`Rejection::Invalid`] are the caller's fault
/// and map to an unauthorized response; their `Display` output is the
/// human-readable reason to return. [`Rejection::Configuration`] is the
/// operator's fault and must surface as a server-side error instead.
#[derive(Debug, Error)]
pub enum Rejection {
    /// The token's `exp` claim is in the past.
    #[error("Bearer token has expired.")]
    Expired,

    /// The token failed verification for any other reason. Which specific
    /// check failed is deliberately not revealed.
    #[error("Bearer token is invalid.")]
    Invalid,

    /// Verification could not be attempted at all.
    #[error("Bearer-token verification is unavailable")]
    Configuration(#[from] OidcBearerError),
}

impl Rejection {
    /// Whether this rejection should surface as an unauthorized response.
    ///
    /// Configuration failures return `false`: they are a server-side fault,
    /// not something the caller can fix by presenting a different token.
    pub fn is_unauthorized(&self) -> bool {
        !matches!(self, Rejection::Configuration(_))
    }
}
