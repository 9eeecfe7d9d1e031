// src/model.rs

use serde::Deserialize;

/// The subset of an OIDC provider's discovery document this crate reads.
/// Found at the `.well-known/openid-configuration` endpoint.
///
/// Both fields are optional at the wire level so their absence can be
/// reported as a configuration error naming the missing field, rather than
/// as an opaque deserialization failure.
#[derive(Debug, Deserialize)]
pub struct DiscoveryDocument {
    #[serde(default)]
    pub id_token_signing_alg_values_supported: Option<Vec<String>>,
    #[serde(default)]
    pub jwks_uri: Option<String>,
}

/// A single JSON Web Key (JWK) as defined in RFC 7517.
#[derive(Debug, Deserialize)]
pub struct JsonWebKey {
    pub kid: Option<String>,
    pub kty: String,
    #[serde(rename = "use")]
    pub use_purpose: Option<String>,
    pub alg: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
}

/// A JSON Web Key Set (JWKS), which is a collection of JWKs.
#[derive(Debug, Deserialize)]
pub struct JsonWebKeySet {
    pub keys: Vec<JsonWebKey>,
}
