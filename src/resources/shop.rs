//! The shop resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{Client, ClientError};

/// A Shopify shop. Fields absent from the response deserialize as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub shop_owner: Option<String>,
    pub email: Option<String>,
    pub customer_email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub currency: Option<String>,
    pub domain: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub province: Option<String>,
    pub province_code: Option<String>,
    pub zip: Option<String>,
    pub money_format: Option<String>,
    pub money_with_currency_format: Option<String>,
    pub weight_unit: Option<String>,
    pub myshopify_domain: Option<String>,
    pub plan_name: Option<String>,
    pub plan_display_name: Option<String>,
    pub password_enabled: Option<bool>,
    pub primary_locale: Option<String>,
    pub primary_location_id: Option<u64>,
    pub timezone: Option<String>,
    pub iana_timezone: Option<String>,
    pub taxes_included: Option<bool>,
    pub tax_shipping: Option<bool>,
    pub county_taxes: Option<bool>,
    pub has_storefront: Option<bool>,
    pub has_discounts: Option<bool>,
    pub has_gift_cards: Option<bool>,
    pub setup_required: Option<bool>,
    pub checkout_api_supported: Option<bool>,
    pub eligible_for_payments: Option<bool>,
    pub pre_launch_enabled: Option<bool>,
}

#[derive(Deserialize)]
struct ShopEnvelope {
    shop: Shop,
}

/// Service for the shop endpoint.
pub struct ShopService<'a> {
    pub(crate) client: &'a Client,
}

impl ShopService<'_> {
    /// Fetch the shop's details.
    pub async fn get(&self) -> Result<Shop, ClientError> {
        let envelope: ShopEnvelope = self.client.get("shop.json", None::<&()>).await?;
        Ok(envelope.shop)
    }
}
