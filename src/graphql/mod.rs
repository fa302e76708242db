//! GraphQL Admin API support with cost-aware throttling.
//!
//! GraphQL rate limiting works on query cost rather than request count:
//! a throttled response reports the query's cost alongside the bucket's
//! current capacity and restore rate in `extensions.cost`. The service
//! computes how long the bucket needs to refill and retries within the
//! client's attempt budget.

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::{
    Client, ClientError, RateLimitError, ResponseDecodingError, ResponseError,
};

const THROTTLED_CODE: &str = "THROTTLED";

/// Query cost reported in a GraphQL response's extensions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlCost {
    /// Cost estimated before execution.
    pub requested_query_cost: f64,
    /// Cost actually consumed. Absent on throttled responses, since the
    /// query never ran.
    #[serde(default)]
    pub actual_query_cost: Option<f64>,
    /// State of the cost bucket.
    pub throttle_status: ThrottleStatus,
}

/// The cost bucket's state at response time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottleStatus {
    pub maximum_available: f64,
    pub currently_available: f64,
    /// Points restored per second.
    pub restore_rate: f64,
}

impl GraphqlCost {
    /// Seconds until the bucket holds enough points to run the query, zero
    /// when it already does.
    #[must_use]
    pub fn retry_after_seconds(&self) -> f64 {
        let cost = self
            .actual_query_cost
            .unwrap_or(self.requested_query_cost);
        let deficit = self.throttle_status.currently_available - cost;
        if deficit >= 0.0 || self.throttle_status.restore_rate <= 0.0 {
            0.0
        } else {
            -deficit / self.throttle_status.restore_rate
        }
    }
}

#[derive(Serialize)]
struct GraphqlRequest<'a, V: Serialize> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<&'a V>,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<QueryError>,
    extensions: Option<ResponseExtensions>,
}

#[derive(Deserialize)]
struct ResponseExtensions {
    cost: Option<GraphqlCost>,
}

#[derive(Debug, Clone, Deserialize)]
struct QueryError {
    message: String,
    extensions: Option<QueryErrorExtensions>,
}

#[derive(Debug, Clone, Deserialize)]
struct QueryErrorExtensions {
    code: Option<String>,
}

impl QueryError {
    fn is_throttled(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|e| e.code.as_deref())
            .is_some_and(|code| code == THROTTLED_CODE)
    }
}

/// Service for the GraphQL Admin API endpoint.
pub struct GraphqlService<'a> {
    client: &'a Client,
}

impl Client {
    /// GraphQL Admin API service.
    #[must_use]
    pub const fn graphql(&self) -> GraphqlService<'_> {
        GraphqlService { client: self }
    }
}

impl GraphqlService<'_> {
    /// Execute a query without variables and decode `data` into `T`.
    pub async fn query<T>(&self, query: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        self.query_with_variables(query, None::<&()>).await
    }

    /// Execute a query, retrying throttled responses until the cost bucket
    /// refills or the attempt budget is exhausted. HTTP-level retries made
    /// by the transport count against the same budget.
    pub async fn query_with_variables<T, V>(
        &self,
        query: &str,
        variables: Option<&V>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        V: Serialize,
    {
        let body = GraphqlRequest { query, variables };
        let budget = self.client.retry_budget();
        let mut attempts = 0u32;

        loop {
            let executed = self
                .client
                .create_and_send::<_, ()>(Method::POST, "graphql.json", Some(&body), None)
                .await?;
            attempts += executed.attempts;

            let response: GraphqlResponse<T> = self.client.decode(&executed)?;

            let cost = response.extensions.and_then(|e| e.cost);
            if let Some(cost) = &cost {
                self.client.record_graphql_cost(cost.clone());
            }

            if response.errors.is_empty() {
                return response.data.ok_or_else(|| {
                    ResponseDecodingError {
                        body: executed.body.clone(),
                        message: "response contains neither data nor errors".to_string(),
                        status: executed.status,
                    }
                    .into()
                });
            }

            let messages: Vec<String> =
                response.errors.iter().map(|e| e.message.clone()).collect();
            let throttled = response.errors.iter().any(QueryError::is_throttled);

            if !throttled {
                return Err(ResponseError {
                    status: executed.status,
                    message: String::new(),
                    errors: messages,
                }
                .into());
            }

            let retry_after = cost.map_or(0.0, |c| c.retry_after_seconds());
            if attempts >= budget {
                // Whole seconds, truncated like the rate-limit header path.
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                return Err(RateLimitError {
                    error: ResponseError {
                        status: executed.status,
                        message: String::new(),
                        errors: messages,
                    },
                    retry_after: retry_after as u64,
                }
                .into());
            }

            tracing::warn!(retry_after, "query throttled, waiting for cost bucket");
            self.client
                .sleep(Duration::from_secs_f64(retry_after))
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost(currently_available: f64, restore_rate: f64) -> GraphqlCost {
        GraphqlCost {
            requested_query_cost: 200.0,
            actual_query_cost: None,
            throttle_status: ThrottleStatus {
                maximum_available: 1000.0,
                currently_available,
                restore_rate,
            },
        }
    }

    #[test]
    fn test_retry_after_uses_requested_cost_when_actual_absent() {
        // Need 200 points, have 100, restore 50/s: short 100 points -> 2s.
        let c = cost(100.0, 50.0);
        assert!((c.retry_after_seconds() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_retry_after_prefers_actual_cost() {
        let mut c = cost(100.0, 50.0);
        c.actual_query_cost = Some(150.0);
        assert!((c.retry_after_seconds() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_retry_after_is_zero_when_bucket_suffices() {
        let c = cost(500.0, 50.0);
        assert!((c.retry_after_seconds()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_retry_after_handles_zero_restore_rate() {
        let c = cost(100.0, 0.0);
        assert!((c.retry_after_seconds()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cost_extension_deserializes_camel_case() {
        let json = r#"{
            "requestedQueryCost": 101,
            "actualQueryCost": 46,
            "throttleStatus": {
                "maximumAvailable": 1000.0,
                "currentlyAvailable": 954,
                "restoreRate": 50.0
            }
        }"#;
        let c: GraphqlCost = serde_json::from_str(json).unwrap();
        assert!((c.requested_query_cost - 101.0).abs() < f64::EPSILON);
        assert_eq!(c.actual_query_cost, Some(46.0));
        assert!((c.throttle_status.restore_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_throttled_code_detection() {
        let error = QueryError {
            message: "Throttled".to_string(),
            extensions: Some(QueryErrorExtensions {
                code: Some("THROTTLED".to_string()),
            }),
        };
        assert!(error.is_throttled());

        let other = QueryError {
            message: "Field does not exist".to_string(),
            extensions: Some(QueryErrorExtensions {
                code: Some("undefinedField".to_string()),
            }),
        };
        assert!(!other.is_throttled());

        let bare = QueryError {
            message: "oops".to_string(),
            extensions: None,
        };
        assert!(!bare.is_throttled());
    }
}
