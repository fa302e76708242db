//! REST Admin API resources.
//!
//! Each resource gets a small service borrowing the client, reached through
//! an accessor method, for example `client.payouts().list(None).await`.
//! Resource payloads travel inside single-key envelopes (`{"payout": ...}`),
//! which stay private to each module.

mod article;
mod inventory_item;
mod payout;
mod shop;
mod smart_collection;

pub use article::{Article, ArticleService};
pub use inventory_item::{CountryHarmonizedSystemCode, InventoryItem, InventoryItemService};
pub use payout::{Payout, PayoutListOptions, PayoutService, PayoutStatus};
pub use shop::{Shop, ShopService};
pub use smart_collection::{Rule, SmartCollection, SmartCollectionService};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::client::Client;

/// General listing options accepted by most collection endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListOptions {
    /// Cursor from a previous page's `Link` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at_min: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at_max: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at_min: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at_max: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    /// Comma-separated field names to include in the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    /// Restrict to these ids, sent as a single comma-joined parameter.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "comma_separated"
    )]
    pub ids: Option<Vec<u64>>,
}

/// General options accepted by most count endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CountOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at_min: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at_max: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at_min: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at_max: Option<DateTime<Utc>>,
}

fn comma_separated<S: Serializer>(ids: &Option<Vec<u64>>, serializer: S) -> Result<S::Ok, S::Error> {
    let joined = ids
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    serializer.serialize_str(&joined)
}

impl Client {
    /// Shop resource service.
    #[must_use]
    pub const fn shop(&self) -> ShopService<'_> {
        ShopService { client: self }
    }

    /// Shopify Payments payouts service.
    #[must_use]
    pub const fn payouts(&self) -> PayoutService<'_> {
        PayoutService { client: self }
    }

    /// Blog articles service.
    #[must_use]
    pub const fn articles(&self) -> ArticleService<'_> {
        ArticleService { client: self }
    }

    /// Inventory items service.
    #[must_use]
    pub const fn inventory_items(&self) -> InventoryItemService<'_> {
        InventoryItemService { client: self }
    }

    /// Smart collections service.
    #[must_use]
    pub const fn smart_collections(&self) -> SmartCollectionService<'_> {
        SmartCollectionService { client: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_options_skip_unset_fields() {
        let options = ListOptions {
            limit: Some(10),
            ..ListOptions::default()
        };
        let encoded = serde_urlencoded::to_string(&options).unwrap();
        assert_eq!(encoded, "limit=10");
    }

    #[test]
    fn test_list_options_ids_comma_joined() {
        let options = ListOptions {
            ids: Some(vec![1, 2, 3]),
            ..ListOptions::default()
        };
        let encoded = serde_urlencoded::to_string(&options).unwrap();
        assert_eq!(encoded, "ids=1%2C2%2C3");
    }

    #[test]
    fn test_count_options_timestamps_are_rfc3339() {
        let options = CountOptions {
            created_at_min: Some(
                DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            ),
            ..CountOptions::default()
        };
        let encoded = serde_urlencoded::to_string(&options).unwrap();
        assert!(encoded.starts_with("created_at_min=2024-01-01T00"));
    }
}
