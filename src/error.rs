//! Configuration error types.
//!
//! Errors produced while validating client construction inputs. Request and
//! response failures use the taxonomy in [`crate::client::ClientError`].

use thiserror::Error;

/// Errors that can occur while validating client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Shop domain is invalid.
    #[error("Invalid shop domain '{domain}'. Expected format: 'shop-name' or 'shop-name.myshopify.com'.")]
    InvalidShopDomain {
        /// The invalid domain that was provided.
        domain: String,
    },

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'YYYY-MM' (e.g., '2024-01'), 'unstable', or 'stable'.")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },
}
