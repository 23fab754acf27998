use std::collections::HashMap;

use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::Uri;
use hyper::body::Body;
use hyper::header::{CONTENT_TYPE, HeaderMap};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ApiError;

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Extract a header value as a string
pub fn get_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(|s| {
        debug!("Retrieved header: {}", name);
        s.to_string()
    })
}

/// Decoded query-string parameters.  A repeated key keeps its last value.
pub fn query_params(uri: &Uri) -> HashMap<String, String> {
    uri.query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Collect a request body, refusing anything over [`MAX_BODY_BYTES`].
pub async fn read_body<B>(body: B) -> Result<Bytes, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) => {
            warn!("Failed to read request body: {}", e);
            Err(ApiError::BadRequest(
                "Request body is unreadable or too large".to_string(),
            ))
        }
    }
}

/// Parse a JSON request body.  The content type, when given, must be JSON.
pub fn parse_json_body<T: DeserializeOwned>(
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<T, ApiError> {
    if let Some(content_type) = get_header_value(headers, CONTENT_TYPE.as_str()) {
        if !content_type.starts_with("application/json") {
            return Err(ApiError::BadRequest(format!(
                "Unsupported content type: {}",
                content_type
            )));
        }
    }

    if body.is_empty() {
        return Err(ApiError::BadRequest("Request body is required".to_string()));
    }

    serde_json::from_slice(body).map_err(|e| ApiError::Validation(vec![e.to_string()]))
}
