//! Shopify Payments payouts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{Client, ClientError, Pagination};

const PAYOUTS_BASE_PATH: &str = "shopify_payments/payouts";

/// Lifecycle state of a payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Scheduled,
    InTransit,
    Paid,
    Failed,
    #[serde(rename = "canceled")]
    Cancelled,
}

/// A Shopify Payments payout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub id: Option<u64>,
    pub date: Option<NaiveDate>,
    pub currency: Option<String>,
    /// Monetary amount as the decimal string Shopify sends, preserved
    /// verbatim.
    pub amount: Option<String>,
    pub status: Option<PayoutStatus>,
}

/// Options for filtering payout listings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PayoutListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PayoutStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_min: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_max: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct PayoutEnvelope {
    payout: Payout,
}

#[derive(Deserialize)]
struct PayoutsEnvelope {
    payouts: Vec<Payout>,
}

/// Service for the payout endpoints.
pub struct PayoutService<'a> {
    pub(crate) client: &'a Client,
}

impl PayoutService<'_> {
    /// List payouts.
    pub async fn list(
        &self,
        options: Option<&PayoutListOptions>,
    ) -> Result<Vec<Payout>, ClientError> {
        let (payouts, _) = self.list_with_pagination(options).await?;
        Ok(payouts)
    }

    /// List payouts along with pagination cursors.
    pub async fn list_with_pagination(
        &self,
        options: Option<&PayoutListOptions>,
    ) -> Result<(Vec<Payout>, Pagination), ClientError> {
        let (envelope, pagination): (PayoutsEnvelope, _) = self
            .client
            .list_with_pagination(&format!("{PAYOUTS_BASE_PATH}.json"), options)
            .await?;
        Ok((envelope.payouts, pagination))
    }

    /// Fetch a single payout.
    pub async fn get(&self, payout_id: u64) -> Result<Payout, ClientError> {
        let envelope: PayoutEnvelope = self
            .client
            .get(&format!("{PAYOUTS_BASE_PATH}/{payout_id}.json"), None::<&()>)
            .await?;
        Ok(envelope.payout)
    }
}
