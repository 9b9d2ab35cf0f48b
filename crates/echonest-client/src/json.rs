// SPDX-License-Identifier: GPL-3.0-or-later

//! Response decoding and navigation of untyped JSON trees.

use crate::error::{EchoNestError, Result};
use crate::models::{ResponseEnvelope, StatusOnly};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

/// Decode a response body into an untyped JSON tree.
///
/// With an HTTP status of 400 or above a [`EchoNestError::Status`] carrying
/// the API status block (when the body has one) is returned instead.
pub async fn generic_unmarshal(response: Response) -> Result<Value> {
    custom_unmarshal(response).await
}

/// Decode a response body into `T`.
///
/// Same status rule as [`generic_unmarshal`].
pub async fn custom_unmarshal<T: DeserializeOwned>(response: Response) -> Result<T> {
    let http_status = response.status();
    let body = response.text().await?;
    trace!(target: "echonest", %http_status, "response body: {}", body);
    decode_body(http_status.as_u16(), &body)
}

pub(crate) fn decode_body<T: DeserializeOwned>(http_status: u16, body: &str) -> Result<T> {
    if http_status >= 400 {
        return Err(EchoNestError::Status {
            http_status,
            status: api_status(body),
        });
    }
    Ok(serde_json::from_str(body)?)
}

/// Status block of an Echo Nest envelope, if `body` is one.
pub(crate) fn api_status(body: &str) -> Option<crate::models::Status> {
    serde_json::from_str::<ResponseEnvelope<StatusOnly>>(body)
        .ok()
        .map(|envelope| envelope.response.status)
}

/// One step of a [`dig`] path: an object key or an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for Step<'a> {
    fn from(key: &'a str) -> Self {
        Step::Key(key)
    }
}

impl From<usize> for Step<'_> {
    fn from(index: usize) -> Self {
        Step::Index(index)
    }
}

/// Follow `path` into `value`.
///
/// Keys index objects and indices index arrays; any mismatch, missing key or
/// out-of-range index yields `None`. An empty path returns `value`.
///
/// ```
/// # use echonest_client::{dig, Step};
/// let v = serde_json::json!({"response": {"songs": [{"title": "Karma Police"}]}});
/// let title = dig(&v, [Step::from("response"), "songs".into(), 0.into(), "title".into()]);
/// assert_eq!(title.and_then(|t| t.as_str()), Some("Karma Police"));
/// ```
pub fn dig<'v, 'p, I>(value: &'v Value, path: I) -> Option<&'v Value>
where
    I: IntoIterator<Item = Step<'p>>,
{
    path.into_iter().try_fold(value, |current, step| {
        let next = match (step, current) {
            (Step::Key(key), Value::Object(map)) => map.get(key),
            (Step::Index(index), Value::Array(items)) => items.get(index),
            _ => None,
        };
        if next.is_none() {
            trace!(target: "echonest", ?step, "dig: not found");
        }
        next
    })
}

/// [`dig`] with a mixed list of keys and indices.
///
/// ```
/// # use echonest_client::dig;
/// let v = serde_json::json!({"list": [0, 1, 2]});
/// assert_eq!(dig!(&v, "list", 2), Some(&serde_json::json!(2)));
/// ```
#[macro_export]
macro_rules! dig {
    ($value:expr $(, $step:expr)* $(,)?) => {
        {
            let path: &[$crate::json::Step] = &[$($crate::json::Step::from($step)),*];
            $crate::json::dig($value, path.iter().copied())
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde::Deserialize;
    use serde_json::json;

    const PROFILE: &str = r#"
{"response": {"status": {"version": "4.2", "code": 0, "message": "Success"}, "artist": {"hotttnesss": 0.863645, "id": "ARH6W4X1187B99274F", "name": "Radiohead"}}}"#;

    #[test]
    fn test_generic_decode() {
        let value: Value = decode_body(200, PROFILE).unwrap();
        assert_eq!(
            dig!(&value, "response", "status", "code").and_then(Value::as_i64),
            Some(0)
        );
        assert_eq!(
            dig!(&value, "response", "artist", "id").and_then(Value::as_str),
            Some("ARH6W4X1187B99274F")
        );
        assert!(dig!(&value, "response", "artist", "hotttnesss")
            .map(Value::is_f64)
            .unwrap_or(false));
    }

    #[test]
    fn test_malformed_body_is_error() {
        let broken = r#"{"response": "status": {"version": "4.2"}}}"#;
        let result: Result<Value> = decode_body(200, broken);
        assert!(matches!(result, Err(EchoNestError::SerializationError(_))));
    }

    #[test]
    fn test_custom_decode() {
        #[derive(Deserialize)]
        struct Body {
            response: Inner,
        }
        #[derive(Deserialize)]
        struct Inner {
            status: crate::models::Status,
            artist: crate::models::Artist,
        }

        let body: Body = decode_body(200, PROFILE).unwrap();
        assert_eq!(body.response.status.code, 0);
        assert_eq!(body.response.artist.name, "Radiohead");
    }

    #[test]
    fn test_http_error_status_surfaces_api_status() {
        let body = r#"{"response": {"status": {"version": "4.2", "code": 1, "message": "1|Invalid key: Unknown"}}}"#;
        let err = decode_body::<Value>(400, body).unwrap_err();
        match &err {
            EchoNestError::Status {
                http_status,
                status: Some(status),
            } => {
                assert_eq!(*http_status, 400);
                assert_eq!(status.message, "1|Invalid key: Unknown");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.error_code(), Some(ErrorCode::InvalidKey));
    }

    #[test]
    fn test_dig() {
        let m = json!({"list": [0, 1, 2], "object": {"foo": "bar", "bazzznesss": 0.12312}});
        assert_eq!(dig!(&m, "list", 2), Some(&json!(2)));
        assert_eq!(dig!(&m, "object", "foo"), Some(&json!("bar")));
        assert_eq!(dig!(&m), Some(&m));
        assert_eq!(dig!(&m, "list", 3), None);
        assert_eq!(dig!(&m, "list", "foo"), None);
        assert_eq!(dig!(&m, "object", 0), None);
        assert_eq!(dig!(&m, "missing", "foo"), None);
        assert_eq!(dig!(&m, "object", "foo", "deeper"), None);
    }
}
