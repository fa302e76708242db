//! End-to-end tests for the request execution engine against a mock server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopify_admin::{
    ApiVersion, Client, ClientError, ShopDomain, SleepFuture, Sleeper,
};

fn recording_sleeper() -> (Sleeper, Arc<Mutex<Vec<Duration>>>) {
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&recorded);
    let sleeper: Sleeper = Arc::new(move |duration| {
        log.lock().unwrap().push(duration);
        let done: SleepFuture = Box::pin(async {});
        done
    });
    (sleeper, recorded)
}

fn client_for(server: &MockServer) -> Client {
    Client::builder(ShopDomain::new("fooshop").unwrap())
        .access_token("footoken")
        .base_url(Url::parse(&server.uri()).unwrap())
        .build()
}

#[tokio::test]
async fn sends_token_and_json_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/shop.json"))
        .and(header("X-Shopify-Access-Token", "footoken"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"shop": {"name": "Foo"}})))
        .expect(1)
        .mount(&server)
        .await;

    let shop = client_for(&server).shop().get().await.unwrap();
    assert_eq!(shop.name.as_deref(), Some("Foo"));
}

#[tokio::test]
async fn basic_auth_is_sent_when_configured() {
    let server = MockServer::start().await;
    // "apikey:hush" base64-encoded.
    Mock::given(method("GET"))
        .and(path("/admin/shop.json"))
        .and(header("Authorization", "Basic YXBpa2V5Omh1c2g="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"shop": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder(ShopDomain::new("fooshop").unwrap())
        .basic_auth("apikey", "hush")
        .base_url(Url::parse(&server.uri()).unwrap())
        .build();
    client.shop().get().await.unwrap();
}

#[tokio::test]
async fn pinned_version_prefixes_the_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-01/shop.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"shop": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder(ShopDomain::new("fooshop").unwrap())
        .api_version(ApiVersion::release("2024-01").unwrap())
        .base_url(Url::parse(&server.uri()).unwrap())
        .build();
    client.shop().get().await.unwrap();
}

#[tokio::test]
async fn rate_limited_call_waits_the_advertised_time_then_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/shop.json"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "2.0")
                .set_body_json(json!({"errors": "Exceeded 2 calls per second for api client"})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/shop.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"shop": {"name": "Foo"}})))
        .expect(1)
        .mount(&server)
        .await;

    let (sleeper, recorded) = recording_sleeper();
    let client = Client::builder(ShopDomain::new("fooshop").unwrap())
        .retries(2)
        .sleeper(sleeper)
        .base_url(Url::parse(&server.uri()).unwrap())
        .build();

    let shop = client.shop().get().await.unwrap();
    assert_eq!(shop.name.as_deref(), Some("Foo"));
    assert_eq!(*recorded.lock().unwrap(), vec![Duration::from_secs(2)]);
}

#[tokio::test]
async fn default_budget_makes_rate_limit_fatal_without_waiting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/shop.json"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "2.0")
                .set_body_json(json!({"errors": "throttled"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (sleeper, recorded) = recording_sleeper();
    let client = Client::builder(ShopDomain::new("fooshop").unwrap())
        .sleeper(sleeper)
        .base_url(Url::parse(&server.uri()).unwrap())
        .build();

    let err = client.shop().get().await.unwrap_err();
    let ClientError::RateLimit(rate) = err else {
        panic!("expected RateLimit error, got {err:?}");
    };
    assert_eq!(rate.retry_after, 2);
    assert!(recorded.lock().unwrap().is_empty());
}

#[tokio::test]
async fn service_unavailable_retries_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/shop.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/shop.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"shop": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let (sleeper, recorded) = recording_sleeper();
    let client = Client::builder(ShopDomain::new("fooshop").unwrap())
        .retries(2)
        .sleeper(sleeper)
        .base_url(Url::parse(&server.uri()).unwrap())
        .build();

    client.shop().get().await.unwrap();
    assert!(recorded.lock().unwrap().is_empty());
}

#[tokio::test]
async fn retried_post_resends_identical_body() {
    let server = MockServer::start().await;
    let expected_body = json!({"article": {"title": "Soap", "body_html": "<p>suds</p>"}});

    Mock::given(method("POST"))
        .and(path("/admin/blogs/1/articles.json"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/blogs/1/articles.json"))
        .and(body_json(&expected_body))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"article": {"id": 5, "title": "Soap"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (sleeper, _) = recording_sleeper();
    let client = Client::builder(ShopDomain::new("fooshop").unwrap())
        .retries(2)
        .sleeper(sleeper)
        .base_url(Url::parse(&server.uri()).unwrap())
        .build();

    let article = shopify_admin::Article {
        title: Some("Soap".to_string()),
        body_html: Some("<p>suds</p>".to_string()),
        ..shopify_admin::Article::default()
    };
    let created = client.articles().create(1, article).await.unwrap();
    assert_eq!(created.id, Some(5));
}

#[tokio::test]
async fn non_retryable_error_is_returned_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/shop.json"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "Not Found"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder(ShopDomain::new("fooshop").unwrap())
        .retries(5)
        .base_url(Url::parse(&server.uri()).unwrap())
        .build();

    let err = client.shop().get().await.unwrap_err();
    let ClientError::Api(api) = err else {
        panic!("expected Api error, got {err:?}");
    };
    assert_eq!(api.status, 404);
    assert_eq!(api.to_string(), "Not Found");
}

#[tokio::test]
async fn unpinned_client_latches_the_negotiated_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/shop.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Shopify-API-Version", "2024-01")
                .set_body_json(json!({"shop": {}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.api_version(), "stable");
    client.shop().get().await.unwrap();
    assert_eq!(client.api_version(), "2024-01");
}

#[tokio::test]
async fn successful_calls_record_the_rate_limit_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/shop.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Shopify-Shop-Api-Call-Limit", "12/40")
                .set_body_json(json!({"shop": {}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.shop().get().await.unwrap();
    let limits = client.rate_limits();
    assert_eq!(limits.request_count, 12);
    assert_eq!(limits.bucket_size, 40);
}

#[tokio::test]
async fn options_are_appended_after_path_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/smart_collections.json"))
        .and(query_param("limit", "3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"smart_collections": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let options = shopify_admin::ListOptions {
        limit: Some(3),
        ..shopify_admin::ListOptions::default()
    };
    let collections = client_for(&server)
        .smart_collections()
        .list(Some(&options))
        .await
        .unwrap();
    assert!(collections.is_empty());
}

#[tokio::test]
async fn listing_exposes_pagination_from_the_link_header() {
    let server = MockServer::start().await;
    let link = concat!(
        r#"<https://fooshop.myshopify.com/admin/shopify_payments/payouts.json?page_info=before&limit=3>; rel="previous", "#,
        r#"<https://fooshop.myshopify.com/admin/shopify_payments/payouts.json?page_info=after&limit=3>; rel="next""#,
    );
    Mock::given(method("GET"))
        .and(path("/admin/shopify_payments/payouts.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", link)
                .set_body_json(json!({"payouts": [{"id": 1, "status": "paid"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (payouts, pagination) = client_for(&server)
        .payouts()
        .list_with_pagination(None)
        .await
        .unwrap();
    assert_eq!(payouts.len(), 1);
    assert_eq!(pagination.next_page_options.unwrap().page_info, "after");
    assert_eq!(
        pagination.previous_page_options.unwrap().page_info,
        "before"
    );
}

#[tokio::test]
async fn missing_link_header_means_no_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/shopify_payments/payouts.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payouts": []})))
        .expect(1)
        .mount(&server)
        .await;

    let (_, pagination) = client_for(&server)
        .payouts()
        .list_with_pagination(None)
        .await
        .unwrap();
    assert!(pagination.next_page_options.is_none());
    assert!(pagination.previous_page_options.is_none());
}
