// src/verifier.rs

use crate::error::{OidcBearerError, Rejection};
use crate::provider::{ConfigProvider, OidcConfig, Verification};
use crate::token::AccessToken;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Validation};
use tracing::{debug, instrument};

/// Verifies bearer tokens against the provider state of a [`ConfigProvider`].
///
/// Create one at bootstrap and reuse it for all requests; cloning is cheap.
/// The verifier itself holds no mutable state.
#[derive(Clone)]
pub struct Verifier {
    provider: ConfigProvider,
}

impl Verifier {
    /// Creates a new `Verifier` backed by the given provider.
    pub fn new(provider: ConfigProvider) -> Self {
        Self { provider }
    }

    /// Verifies a bearer token, loading the provider configuration on first
    /// use.
    ///
    /// Returns the decoded [`AccessToken`] on success, or a [`Rejection`]
    /// classifying the failure for the HTTP boundary.
    pub async fn verify(&self, token: &str) -> Result<AccessToken, Rejection> {
        let verification = self.provider.load().await?;
        self.verify_with(token, verification).await
    }

    /// Verifies a bearer token against an already-loaded verification state.
    ///
    /// When verification is disabled the result is a configuration
    /// rejection, never a pass-through: a deployment without a configured
    /// provider must decide explicitly not to call this path.
    #[instrument(skip_all)]
    pub async fn verify_with(
        &self,
        token: &str,
        verification: &Verification,
    ) -> Result<AccessToken, Rejection> {
        let config = match verification {
            Verification::Enabled(config) => config,
            Verification::Disabled => {
                debug!("Rejecting bearer token: verification is disabled");
                return Err(Rejection::Configuration(
                    OidcBearerError::VerificationDisabled,
                ));
            }
        };

        match decode_token(token, config).await {
            Ok(access_token) => {
                debug!(
                    "Bearer token verified: jti={} iss={} sub={}",
                    access_token.jti, access_token.iss, access_token.sub
                );
                Ok(access_token)
            }
            Err(err) => {
                let rejection = classify(err);
                debug!("Bearer token rejected: {}", rejection);
                Err(rejection)
            }
        }
    }
}

/// Runs the verification pipeline; any failure short-circuits the rest.
async fn decode_token(
    token: &str,
    config: &OidcConfig,
) -> Result<AccessToken, OidcBearerError> {
    // 1. Decode the header without verifying the signature, to learn which
    //    key and algorithm the token claims to use.
    let header = decode_header(token)?;

    // 2. The algorithm must be one the provider advertised. `none` and other
    //    unknown names already fail header decoding above.
    if !config.signing_algorithms().contains(&header.alg) {
        return Err(OidcBearerError::UnsupportedAlgorithm(header.alg));
    }

    // 3. Resolve the signing key by kid.
    let kid = header.kid.ok_or(OidcBearerError::MissingKeyId)?;
    let decoding_key = config.resolve_key(&kid).await?;

    // 4. Verify signature, expiry, and audience. No clock-skew leeway: a
    //    token one second past `exp` is expired.
    let mut validation = Validation::new(header.alg);
    validation.leeway = 0;
    validation.set_audience(&[config.audience()]);
    validation.set_required_spec_claims(&["exp", "aud"]);

    // 5. Project the claims; a missing required claim fails deserialization.
    let token_data = decode::<AccessToken>(token, &decoding_key, &validation)?;
    Ok(token_data.claims)
}

/// Collapses a detailed failure into the classification the caller sees.
/// Expiry stays distinguishable; everything else becomes the same generic
/// rejection so the response does not leak which check failed.
fn classify(err: OidcBearerError) -> Rejection {
    match &err {
        OidcBearerError::JwtValidation(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
            Rejection::Expired
        }
        _ => Rejection::Invalid,
    }
}
