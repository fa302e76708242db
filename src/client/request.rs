//! Request construction.
//!
//! Resolves relative paths against the shop base URL, serializes bodies to
//! JSON, and appends encoded option structs to the query string. Because
//! option pairs are appended after any parameters already embedded in the
//! path, path parameters take precedence on duplicate keys.

use reqwest::Method;
use serde::Serialize;
use url::Url;

use super::errors::RequestBuildError;

/// A fully constructed request, ready to execute. The body is buffered so
/// retries can resend identical bytes.
#[derive(Debug, Clone)]
pub struct BuiltRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Vec<u8>>,
}

/// Build a request from a relative path, an optional JSON body, and an
/// optional options struct encoded as query parameters.
pub fn build_request<B, O>(
    base_url: &Url,
    method: Method,
    rel_path: &str,
    body: Option<&B>,
    options: Option<&O>,
) -> Result<BuiltRequest, RequestBuildError>
where
    B: Serialize + ?Sized,
    O: Serialize + ?Sized,
{
    let mut url = base_url
        .join(rel_path)
        .map_err(|source| RequestBuildError::InvalidPath {
            path: rel_path.to_string(),
            source,
        })?;

    if let Some(options) = options {
        let encoded = serde_urlencoded::to_string(options)?;
        if !encoded.is_empty() {
            let pairs: Vec<(String, String)> = serde_urlencoded::from_str(&encoded)
                .map_err(|_| serde_urlencoded::ser::Error::Custom("unencodable options".into()))?;
            let mut editor = url.query_pairs_mut();
            for (key, value) in pairs {
                editor.append_pair(&key, &value);
            }
        }
    }

    let body = body.map(serde_json::to_vec).transpose()?;

    Ok(BuiltRequest { method, url, body })
}
