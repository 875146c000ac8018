//! Request shape seen by the user resource.

use axum::body::Bytes;
use axum::http::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// A path segment could not be percent-decoded.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid path segment '{segment}'")]
pub struct SuffixError {
    pub segment: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BodyError {
    /// Body missing or not valid JSON.
    #[error("Request body is not valid JSON")]
    Corrupted,

    /// Valid JSON, but not the expected object shape.
    #[error("Invalid request body: {0}")]
    Shape(String),
}

#[derive(Debug, Clone)]
pub struct ResourceRequest {
    pub method: Method,
    /// Decoded path segments after the resource root.
    pub suffix: Vec<String>,
    pub body: Bytes,
}

impl ResourceRequest {
    pub fn new(method: Method, suffix: Vec<String>, body: Bytes) -> Self {
        Self {
            method,
            suffix,
            body,
        }
    }

    /// Builds a request from a full path under `root`.
    ///
    /// Empty segments are dropped, so `/_api/user/` and `/_api/user` both
    /// have an empty suffix.
    pub fn from_path(
        method: Method,
        path: &str,
        root: &str,
        body: Bytes,
    ) -> Result<Self, SuffixError> {
        let rest = path.strip_prefix(root).unwrap_or(path);
        let suffix = rest
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                urlencoding::decode(segment)
                    .map(|decoded| decoded.into_owned())
                    .map_err(|_| SuffixError {
                        segment: segment.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(method, suffix, body))
    }

    /// Parses the body as a JSON object into `T`.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Err(BodyError::Corrupted);
        }

        let value: Value = serde_json::from_slice(&self.body).map_err(|_| BodyError::Corrupted)?;
        if !value.is_object() {
            return Err(BodyError::Shape("expecting a JSON object".to_string()));
        }

        serde_json::from_value(value).map_err(|e| BodyError::Shape(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    const ROOT: &str = "/_api/user";

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        passwd: Option<String>,
    }

    fn request(body: &'static str) -> ResourceRequest {
        ResourceRequest::new(Method::POST, vec![], Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn test_suffix_segments() {
        let parse = |path| {
            ResourceRequest::from_path(Method::GET, path, ROOT, Bytes::new())
                .unwrap()
                .suffix
        };

        assert!(parse("/_api/user").is_empty());
        assert!(parse("/_api/user/").is_empty());
        assert_eq!(parse("/_api/user/alice"), vec!["alice"]);
        assert_eq!(parse("/_api/user/alice/extra"), vec!["alice", "extra"]);
        assert_eq!(parse("/_api/user/j%C3%BCrgen%20k"), vec!["jürgen k"]);
        assert_eq!(parse("/_api/user/a%2Fb"), vec!["a/b"]);
    }

    #[test]
    fn test_undecodable_segment() {
        let err = ResourceRequest::from_path(Method::GET, "/_api/user/%FF", ROOT, Bytes::new())
            .unwrap_err();
        assert_eq!(err.segment, "%FF");
    }

    #[test]
    fn test_json_body() {
        assert_eq!(
            request(r#"{"passwd": "x"}"#).json_body::<Probe>().unwrap(),
            Probe {
                passwd: Some("x".into())
            }
        );
        assert_eq!(request("").json_body::<Probe>(), Err(BodyError::Corrupted));
        assert_eq!(request("{oops").json_body::<Probe>(), Err(BodyError::Corrupted));
        assert!(matches!(
            request("[1]").json_body::<Probe>(),
            Err(BodyError::Shape(_))
        ));
        assert!(matches!(
            request(r#"{"passwd": 12}"#).json_body::<Probe>(),
            Err(BodyError::Shape(_))
        ));
    }
}
