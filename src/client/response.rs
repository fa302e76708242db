//! Response classification.
//!
//! Maps an HTTP status code plus raw body bytes into either success or one of
//! the error kinds in [`crate::client::errors`]. Shopify error bodies come in
//! several shapes which are all normalized here.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Deserialize;
use serde_json::Value;

use super::errors::{ClientError, RateLimitError, ResponseDecodingError, ResponseError};

/// The error envelope Shopify uses across endpoints. Either an `error` string
/// or an `errors` field whose shape varies by endpoint.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    errors: Option<ErrorsField>,
}

/// The `errors` field is a string, an array, or an object keyed by field
/// name, depending on the endpoint. Untagged deserialization tries each shape
/// in order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorsField {
    Message(String),
    List(Vec<Value>),
    Map(serde_json::Map<String, Value>),
    Other(Value),
}

/// Render a JSON value the way it reads in an error message: strings without
/// quotes, everything else in its JSON form.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Classify a response. Any 2xx status is success; everything else is
/// normalized into an error.
///
/// # Errors
///
/// - An empty non-2xx body yields a bare [`ResponseError`] carrying only the
///   status.
/// - A non-JSON body yields a [`ResponseDecodingError`] with the raw bytes.
/// - A JSON error envelope yields a [`ResponseError`] with its messages
///   flattened, upgraded to [`RateLimitError`] for 429 responses.
pub fn check_response_error(
    status: u16,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), ClientError> {
    if (200..300).contains(&status) {
        return Ok(());
    }

    if body.is_empty() {
        return Err(wrap_status_specific(
            ResponseError {
                status,
                ..ResponseError::default()
            },
            headers,
        ));
    }

    let envelope: ErrorEnvelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            return Err(ResponseDecodingError {
                body: body.to_vec(),
                message: e.to_string(),
                status,
            }
            .into());
        }
    };

    let mut error = ResponseError {
        status,
        ..ResponseError::default()
    };

    if let Some(message) = envelope.error {
        error.message = message;
    }

    match envelope.errors {
        Some(ErrorsField::Message(message)) => {
            error.message = message;
        }
        Some(ErrorsField::List(values)) => {
            error.errors = values.iter().map(render).collect();
            error.message = error.errors.join(", ");
        }
        Some(ErrorsField::Map(map)) => {
            for (key, value) in &map {
                match value {
                    Value::Array(elements) => {
                        for element in elements {
                            error.errors.push(format!("{key}: {}", render(element)));
                        }
                    }
                    other => {
                        error.errors.push(format!("{key}: {}", render(other)));
                    }
                }
            }
            if error.message.is_empty() {
                if let Some(first) = error.errors.first() {
                    error.message.clone_from(first);
                }
            }
        }
        // Shapes we do not recognize carry no extractable message.
        Some(ErrorsField::Other(_)) | None => {}
    }

    Err(wrap_status_specific(error, headers))
}

/// Apply status-specific handling: 429 becomes a rate-limit error with the
/// advertised wait, and 406 gets its canonical reason text since Shopify
/// sends it with an empty body.
fn wrap_status_specific(mut error: ResponseError, headers: &HeaderMap) -> ClientError {
    match error.status {
        429 => {
            let advertised = headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(0.0);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let retry_after = advertised as u64;
            RateLimitError { error, retry_after }.into()
        }
        406 => {
            error.message = "Not Acceptable".to_string();
            error.into()
        }
        _ => error.into(),
    }
}
