//! Configuration types for the Shopify Admin client.
//!
//! The main types in this module are:
//!
//! - [`ShopDomain`]: a validated shop domain, the unit of base-URL resolution
//! - [`ApiVersion`]: the Admin API version a client addresses
//!
//! Client-level settings (auth mode, retries, logging budget, delay function)
//! live on [`crate::client::ClientBuilder`].

mod newtypes;
mod version;

pub use newtypes::ShopDomain;
pub use version::ApiVersion;
