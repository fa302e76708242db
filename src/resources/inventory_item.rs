//! Inventory items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{Client, ClientError};

use super::ListOptions;

const INVENTORY_ITEMS_BASE_PATH: &str = "inventory_items";

/// A harmonized system code for a specific destination country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryHarmonizedSystemCode {
    pub harmonized_system_code: String,
    pub country_code: String,
}

/// An inventory item, the stock-keeping side of a product variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_shipping: Option<bool>,
    /// Unit cost as the decimal string Shopify sends, preserved verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code_of_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_code_of_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub harmonized_system_code: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_harmonized_system_codes: Option<Vec<CountryHarmonizedSystemCode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_graphql_api_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct InventoryItemEnvelope {
    inventory_item: InventoryItem,
}

#[derive(Deserialize)]
struct InventoryItemsEnvelope {
    inventory_items: Vec<InventoryItem>,
}

/// Service for the inventory item endpoints.
pub struct InventoryItemService<'a> {
    pub(crate) client: &'a Client,
}

impl InventoryItemService<'_> {
    /// List inventory items. The API requires the `ids` filter in options.
    pub async fn list(
        &self,
        options: Option<&ListOptions>,
    ) -> Result<Vec<InventoryItem>, ClientError> {
        let envelope: InventoryItemsEnvelope = self
            .client
            .get(&format!("{INVENTORY_ITEMS_BASE_PATH}.json"), options)
            .await?;
        Ok(envelope.inventory_items)
    }

    /// Fetch a single inventory item.
    pub async fn get(&self, item_id: u64) -> Result<InventoryItem, ClientError> {
        let envelope: InventoryItemEnvelope = self
            .client
            .get(
                &format!("{INVENTORY_ITEMS_BASE_PATH}/{item_id}.json"),
                None::<&()>,
            )
            .await?;
        Ok(envelope.inventory_item)
    }

    /// Update an inventory item. The item's `id` selects the record.
    pub async fn update(&self, item: InventoryItem) -> Result<InventoryItem, ClientError> {
        let item_id = item.id.unwrap_or_default();
        let envelope: InventoryItemEnvelope = self
            .client
            .put(
                &format!("{INVENTORY_ITEMS_BASE_PATH}/{item_id}.json"),
                &InventoryItemEnvelope {
                    inventory_item: item,
                },
            )
            .await?;
        Ok(envelope.inventory_item)
    }
}
