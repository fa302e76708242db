//! OAuth support for public Shopify apps.
//!
//! [`App`] holds the app's credentials and implements the authorization-code
//! grant plus the three HMAC verification schemes Shopify uses: base64 HMAC
//! for webhook payloads, hex HMAC for OAuth callback URLs, and hex HMAC over
//! a differently assembled message for app proxy requests.
//!
//! The verification rules and reference digests follow the Shopify
//! documentation:
//! <https://shopify.dev/docs/api/admin-rest/latest/resources/oauth#verification>

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use url::Url;

use crate::client::{Client, ClientError};
use crate::config::ShopDomain;

type HmacSha256 = Hmac<Sha256>;

const ACCESS_TOKEN_PATH: &str = "admin/oauth/access_token";

/// Credentials and settings of a public app.
#[derive(Debug, Clone)]
pub struct App {
    /// The app's API key, used as the OAuth client id.
    pub api_key: String,
    /// The app's shared secret, used as the OAuth client secret and as the
    /// HMAC key for all verification.
    pub api_secret: String,
    /// Where Shopify redirects after the merchant grants access.
    pub redirect_url: String,
    /// Comma-separated access scopes to request.
    pub scope: String,
}

#[derive(Serialize)]
struct AccessTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

impl App {
    /// The URL to send a merchant to so they can authorize the app. `state`
    /// is the nonce echoed back in the callback; pass an empty string to
    /// omit it.
    #[must_use]
    pub fn authorize_url(&self, shop: &ShopDomain, state: &str) -> Url {
        let mut url = shop.base_url();
        url.set_path("admin/oauth/authorize");
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("client_id", &self.api_key);
            pairs.append_pair("redirect_uri", &self.redirect_url);
            pairs.append_pair("scope", &self.scope);
            if !state.is_empty() {
                pairs.append_pair("state", state);
            }
        }
        url
    }

    /// Exchange an authorization code for a permanent access token.
    pub async fn get_access_token(
        &self,
        client: &Client,
        code: &str,
    ) -> Result<String, ClientError> {
        let body = AccessTokenRequest {
            client_id: &self.api_key,
            client_secret: &self.api_secret,
            code,
        };
        let executed = client
            .send_unprefixed::<_, ()>(Method::POST, ACCESS_TOKEN_PATH, Some(&body), None)
            .await?;
        let response: AccessTokenResponse = client.decode(&executed)?;
        Ok(response.access_token)
    }

    /// Verify a webhook payload against its `X-Shopify-Hmac-Sha256` header,
    /// a base64-encoded HMAC of the raw body.
    #[must_use]
    pub fn verify_webhook(&self, body: &[u8], hmac_header: &str) -> bool {
        let Ok(provided) = BASE64.decode(hmac_header) else {
            return false;
        };
        if provided.len() != 32 {
            return false;
        }
        let computed = self.mac(body);
        provided.ct_eq(&computed).into()
    }

    /// Verify the `hmac` parameter of an OAuth callback URL. The signed
    /// message is every query parameter except `hmac` and `signature`,
    /// sorted by name and joined as `key=value` pairs with `&`.
    #[must_use]
    pub fn verify_authorization_url(&self, url: &Url) -> bool {
        let Some((_, provided)) = url.query_pairs().find(|(k, _)| k == "hmac") else {
            return false;
        };

        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "hmac" && k != "signature")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        pairs.sort();

        let message = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        self.verify_hex_mac(&message, &provided)
    }

    /// Verify the `signature` parameter of an app proxy request URL. The
    /// signed message groups repeated parameters, joins their values with
    /// commas, and concatenates the sorted `key=value` pairs with no
    /// separator.
    #[must_use]
    pub fn verify_signature(&self, url: &Url) -> bool {
        let Some((_, provided)) = url.query_pairs().find(|(k, _)| k == "signature") else {
            return false;
        };

        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in url.query_pairs() {
            if key != "signature" {
                grouped.entry(key.into_owned()).or_default().push(value.into_owned());
            }
        }

        let message: String = grouped
            .iter()
            .map(|(key, values)| format!("{key}={}", values.join(",")))
            .collect();

        self.verify_hex_mac(&message, &provided)
    }

    fn verify_hex_mac(&self, message: &str, provided_hex: &str) -> bool {
        let Some(provided) = decode_hex(provided_hex) else {
            return false;
        };
        let computed = self.mac(message.as_bytes());
        provided.ct_eq(&computed).into()
    }

    fn mac(&self, message: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("hmac accepts keys of any length");
        mac.update(message);
        mac.finalize().into_bytes().to_vec()
    }
}

// Works on raw bytes: the input comes from attacker-controlled query
// parameters, so decoding must reject arbitrary UTF-8 rather than assume
// ASCII.
fn decode_hex(input: &str) -> Option<Vec<u8>> {
    let bytes = input.as_bytes();
    if bytes.len() % 2 != 0 {
        return None;
    }
    bytes
        .chunks_exact(2)
        .map(|pair| {
            let hi = char::from(pair[0]).to_digit(16)?;
            let lo = char::from(pair[1]).to_digit(16)?;
            Some((hi << 4 | lo) as u8)
        })
        .collect()
}
