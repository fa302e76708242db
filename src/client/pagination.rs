//! Cursor pagination extracted from the `Link` response header.
//!
//! List endpoints advertise next and previous pages as RFC 5988 links:
//!
//! ```text
//! <https://shop.myshopify.com/admin/api/2024-01/products.json?page_info=abc&limit=3>; rel="next"
//! ```
//!
//! [`extract_pagination`] parses the header into ready-to-use page options.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::{ClientError, ResponseDecodingError};

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(.*)>; rel="(previous|next)""#).expect("link header pattern is valid")
});

/// Options for requesting an adjacent page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOptions {
    /// Opaque cursor identifying the page.
    pub page_info: String,
    /// Page size, when the link carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Next and previous page cursors extracted from a listing response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Options for the next page, if the response advertised one.
    pub next_page_options: Option<PageOptions>,
    /// Options for the previous page, if the response advertised one.
    pub previous_page_options: Option<PageOptions>,
}

fn malformed(message: &str) -> ClientError {
    ResponseDecodingError {
        body: Vec::new(),
        message: message.to_string(),
        status: 0,
    }
    .into()
}

/// Parse a `Link` header into [`Pagination`]. An empty header yields an
/// empty `Pagination`. When the same relation appears more than once the
/// last occurrence wins.
///
/// # Errors
///
/// Returns a decoding error when a link segment does not match the expected
/// form, its URL does not parse, the `page_info` parameter is absent, or a
/// `limit` parameter is not numeric.
pub fn extract_pagination(link_header: &str) -> Result<Pagination, ClientError> {
    let mut pagination = Pagination::default();
    if link_header.is_empty() {
        return Ok(pagination);
    }

    for segment in link_header.split(',') {
        let captures = LINK_RE
            .captures(segment.trim())
            .ok_or_else(|| malformed("could not extract pagination link header"))?;

        let url = Url::parse(&captures[1])
            .map_err(|_| malformed("pagination does not contain a valid URL"))?;

        let mut page_info = None;
        let mut limit = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "page_info" => page_info = Some(value.into_owned()),
                "limit" => {
                    limit = Some(value.parse::<u32>().map_err(|e| {
                        malformed(&format!("invalid limit in pagination link: {e}"))
                    })?);
                }
                _ => {}
            }
        }

        let options = PageOptions {
            page_info: page_info.ok_or_else(|| malformed("page_info is missing"))?,
            limit,
        };

        match &captures[2] {
            "next" => pagination.next_page_options = Some(options),
            _ => pagination.previous_page_options = Some(options),
        }
    }

    Ok(pagination)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<Pagination, ClientError>) -> String {
        match result.unwrap_err() {
            ClientError::Decoding(e) => e.message,
            other => panic!("expected Decoding error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_header_yields_empty_pagination() {
        let pagination = extract_pagination("").unwrap();
        assert_eq!(pagination, Pagination::default());
    }

    #[test]
    fn test_next_and_previous_links() {
        let header = concat!(
            r#"<https://shop.myshopify.com/admin/api/2024-01/products.json?page_info=before&limit=3>; rel="previous", "#,
            r#"<https://shop.myshopify.com/admin/api/2024-01/products.json?page_info=after&limit=3>; rel="next""#,
        );
        let pagination = extract_pagination(header).unwrap();
        assert_eq!(
            pagination.previous_page_options,
            Some(PageOptions {
                page_info: "before".to_string(),
                limit: Some(3),
            })
        );
        assert_eq!(
            pagination.next_page_options,
            Some(PageOptions {
                page_info: "after".to_string(),
                limit: Some(3),
            })
        );
    }

    #[test]
    fn test_link_without_limit() {
        let header = r#"<https://shop.myshopify.com/admin/products.json?page_info=abc>; rel="next""#;
        let pagination = extract_pagination(header).unwrap();
        let next = pagination.next_page_options.unwrap();
        assert_eq!(next.page_info, "abc");
        assert_eq!(next.limit, None);
    }

    #[test]
    fn test_malformed_segment() {
        let result = extract_pagination("no links here");
        assert_eq!(message(result), "could not extract pagination link header");
    }

    #[test]
    fn test_invalid_url() {
        let result = extract_pagination(r#"<not a url>; rel="next""#);
        assert_eq!(message(result), "pagination does not contain a valid URL");
    }

    #[test]
    fn test_missing_page_info() {
        let result = extract_pagination(
            r#"<https://shop.myshopify.com/admin/products.json?limit=3>; rel="next""#,
        );
        assert_eq!(message(result), "page_info is missing");
    }

    #[test]
    fn test_non_numeric_limit() {
        let result = extract_pagination(
            r#"<https://shop.myshopify.com/admin/products.json?page_info=abc&limit=three>; rel="next""#,
        );
        assert!(message(result).starts_with("invalid limit in pagination link:"));
    }

    #[test]
    fn test_repeated_relation_last_one_wins() {
        let header = concat!(
            r#"<https://shop.myshopify.com/admin/products.json?page_info=first>; rel="next", "#,
            r#"<https://shop.myshopify.com/admin/products.json?page_info=second>; rel="next""#,
        );
        let pagination = extract_pagination(header).unwrap();
        assert_eq!(pagination.next_page_options.unwrap().page_info, "second");
    }
}
