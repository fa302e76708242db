//! Smart collections, rule-driven product groupings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{Client, ClientError};

use super::{CountOptions, ListOptions};

const SMART_COLLECTIONS_BASE_PATH: &str = "smart_collections";

/// A membership rule. Products matching the rule (or all rules, depending on
/// the collection's `disjunctive` flag) belong to the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub column: String,
    pub relation: String,
    pub condition: String,
}

/// A smart collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmartCollection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disjunctive: Option<bool>,
}

#[derive(Serialize, Deserialize)]
struct SmartCollectionEnvelope {
    smart_collection: SmartCollection,
}

#[derive(Deserialize)]
struct SmartCollectionsEnvelope {
    smart_collections: Vec<SmartCollection>,
}

/// Service for the smart collection endpoints.
pub struct SmartCollectionService<'a> {
    pub(crate) client: &'a Client,
}

impl SmartCollectionService<'_> {
    /// List smart collections.
    pub async fn list(
        &self,
        options: Option<&ListOptions>,
    ) -> Result<Vec<SmartCollection>, ClientError> {
        let envelope: SmartCollectionsEnvelope = self
            .client
            .get(&format!("{SMART_COLLECTIONS_BASE_PATH}.json"), options)
            .await?;
        Ok(envelope.smart_collections)
    }

    /// Count smart collections.
    pub async fn count(&self, options: Option<&CountOptions>) -> Result<u64, ClientError> {
        self.client
            .count(&format!("{SMART_COLLECTIONS_BASE_PATH}/count.json"), options)
            .await
    }

    /// Fetch a single smart collection.
    pub async fn get(&self, collection_id: u64) -> Result<SmartCollection, ClientError> {
        let envelope: SmartCollectionEnvelope = self
            .client
            .get(
                &format!("{SMART_COLLECTIONS_BASE_PATH}/{collection_id}.json"),
                None::<&()>,
            )
            .await?;
        Ok(envelope.smart_collection)
    }

    /// Create a smart collection.
    pub async fn create(
        &self,
        collection: SmartCollection,
    ) -> Result<SmartCollection, ClientError> {
        let envelope: SmartCollectionEnvelope = self
            .client
            .post(
                &format!("{SMART_COLLECTIONS_BASE_PATH}.json"),
                &SmartCollectionEnvelope {
                    smart_collection: collection,
                },
            )
            .await?;
        Ok(envelope.smart_collection)
    }

    /// Update a smart collection. The collection's `id` selects the record.
    pub async fn update(
        &self,
        collection: SmartCollection,
    ) -> Result<SmartCollection, ClientError> {
        let collection_id = collection.id.unwrap_or_default();
        let envelope: SmartCollectionEnvelope = self
            .client
            .put(
                &format!("{SMART_COLLECTIONS_BASE_PATH}/{collection_id}.json"),
                &SmartCollectionEnvelope {
                    smart_collection: collection,
                },
            )
            .await?;
        Ok(envelope.smart_collection)
    }

    /// Delete a smart collection.
    pub async fn delete(&self, collection_id: u64) -> Result<(), ClientError> {
        self.client
            .delete(&format!("{SMART_COLLECTIONS_BASE_PATH}/{collection_id}.json"))
            .await
    }
}
