//! An async client for the Shopify Admin API.
//!
//! All REST and GraphQL calls share one execution engine that normalizes
//! Shopify's error shapes, honors rate limits with automatic retries, and
//! extracts cursor pagination from `Link` headers.
//!
//! # Getting started
//!
//! ```rust,ignore
//! use shopify_admin::{ApiVersion, Client, ShopDomain};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::builder(ShopDomain::new("my-shop")?)
//!         .access_token(std::env::var("SHOPIFY_ACCESS_TOKEN")?)
//!         .api_version(ApiVersion::release("2024-01")?)
//!         .retries(3)
//!         .build();
//!
//!     let shop = client.shop().get().await?;
//!     println!("{}", shop.name.unwrap_or_default());
//!
//!     let (payouts, pagination) = client.payouts().list_with_pagination(None).await?;
//!     println!("{} payouts, more: {}", payouts.len(), pagination.next_page_options.is_some());
//!     Ok(())
//! }
//! ```
//!
//! # Authentication
//!
//! Private and custom apps authenticate with an access token. Public apps
//! use [`App`] to run the OAuth flow and verify Shopify's HMAC signatures on
//! callbacks, webhooks, and app proxy requests.

pub mod auth;
pub mod client;
pub mod config;
mod error;
pub mod graphql;
pub mod resources;

pub use auth::App;
pub use client::{
    Client, ClientBuilder, ClientError, PageOptions, Pagination, RateLimitError, RateLimitInfo,
    RequestBuildError, ResponseDecodingError, ResponseError, SleepFuture, Sleeper,
};
pub use config::{ApiVersion, ShopDomain};
pub use error::ConfigError;
pub use graphql::{GraphqlCost, GraphqlService, ThrottleStatus};
pub use resources::{
    Article, ArticleService, CountOptions, CountryHarmonizedSystemCode, InventoryItem,
    InventoryItemService, ListOptions, Payout, PayoutListOptions, PayoutService, PayoutStatus,
    Rule, Shop, ShopService, SmartCollection, SmartCollectionService,
};
