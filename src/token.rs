// src/token.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The claims of a successfully verified bearer token.
///
/// Produced only by [`Verifier`](crate::verifier::Verifier); the required
/// fields are guaranteed present and type-correct, because a token missing
/// any of them fails verification instead of yielding a half-filled record.
/// Claims outside the named set land in [`extra_claims`](Self::extra_claims).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// Issuer of the token.
    pub iss: String,
    /// Expiry, in seconds since the Unix epoch.
    pub exp: u64,
    /// The audience the token was issued for.
    pub aud: String,
    /// Subject (user identifier).
    pub sub: String,
    /// Issued-at, in seconds since the Unix epoch.
    pub iat: u64,
    /// Unique token identifier.
    pub jti: String,

    /// When the end user last authenticated, in seconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_time: Option<u64>,
    /// Authentication context class reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acr: Option<String>,
    /// Authentication method references, in the order asserted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amr: Option<Vec<String>>,

    /// Every claim not covered by a named field above.
    #[serde(flatten)]
    pub extra_claims: HashMap<String, serde_json::Value>,
}
