//! Rate-limit bookkeeping.
//!
//! Shopify reports REST bucket usage in the `X-Shopify-Shop-Api-Call-Limit`
//! header as `used/total`, and GraphQL cost in response extensions. The
//! client records the most recent snapshot after each successful call.

use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::graphql::GraphqlCost;

const CALL_LIMIT_HEADER: &str = "X-Shopify-Shop-Api-Call-Limit";

/// A snapshot of the shop's rate-limit state as of the last response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateLimitInfo {
    /// Requests used in the current bucket.
    pub request_count: u32,
    /// Total bucket size.
    pub bucket_size: u32,
    /// Seconds advertised by the last `Retry-After` header, zero when absent.
    pub retry_after_seconds: f64,
    /// GraphQL cost reported by the last GraphQL response, if any.
    pub graphql_cost: Option<GraphqlCost>,
}

impl RateLimitInfo {
    /// Record the call-limit and retry-after headers from a response.
    /// `Retry-After` is applied unconditionally so a response without the
    /// header clears a stale value.
    pub(crate) fn update_from_headers(&mut self, headers: &HeaderMap) {
        if let Some((used, total)) = headers
            .get(CALL_LIMIT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_call_limit)
        {
            self.request_count = used;
            self.bucket_size = total;
        }

        self.retry_after_seconds = headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0);
    }
}

/// Parse a `used/total` call-limit value. Returns `None` for anything
/// that does not split into two integers.
fn parse_call_limit(value: &str) -> Option<(u32, u32)> {
    let (used, total) = value.split_once('/')?;
    Some((used.trim().parse().ok()?, total.trim().parse().ok()?))
}
