// src/lib.rs

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod token;
pub mod verifier;

/// The public prelude for the `oidc-bearer` crate.
///
/// This module re-exports the most commonly used types for convenience.
pub mod prelude {
    pub use crate::config::{ProviderSettings, SettingsBuilder};
    pub use crate::error::{OidcBearerError, Rejection};
    pub use crate::provider::{ConfigProvider, OidcConfig, Verification};
    pub use crate::token::AccessToken;
    pub use crate::verifier::Verifier;
    pub use jsonwebtoken::Algorithm;
}
