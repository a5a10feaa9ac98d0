//! Browser upload policy documents.
//!
//! A policy is received verbatim from the client and is only ever inspected,
//! never rewritten. The submitted JSON object is retained so that the text
//! that gets base64-encoded and signed is exactly what the client submitted,
//! member order included.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::DateTime;
use serde_json::{Map, Value};

use crate::error::SignerError;

/// Condition field naming the target bucket.
const BUCKET_FIELD: &str = "bucket";

/// Condition field carrying the SigV4 credential.
const CREDENTIAL_FIELD: &str = "x-amz-credential";

/// Tuple condition name bounding the object size.
const CONTENT_LENGTH_RANGE: &str = "content-length-range";

/// One entry of a policy's `conditions` array.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// An exact-match condition such as `{"bucket": "uploads"}`.
    Field(Map<String, Value>),
    /// An array condition such as `["content-length-range", "0", "1000"]`.
    Tuple(Vec<Value>),
}

impl Condition {
    fn from_value(value: &Value) -> Result<Self, SignerError> {
        match value {
            Value::Object(map) => Ok(Self::Field(map.clone())),
            Value::Array(items) => Ok(Self::Tuple(items.clone())),
            other => Err(SignerError::MalformedPolicy(format!(
                "condition must be an object or an array, got {other}"
            ))),
        }
    }

    /// The string value of a named field, if this is a field condition
    /// carrying one.
    #[must_use]
    pub fn field_str(&self, name: &str) -> Option<&str> {
        match self {
            Self::Field(map) => map.get(name).and_then(Value::as_str),
            Self::Tuple(_) => None,
        }
    }

    /// The raw value of a named field, if this is a field condition carrying one.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Field(map) => map.get(name),
            Self::Tuple(_) => None,
        }
    }

    /// The `(min, max)` of a `content-length-range` tuple.
    ///
    /// Bounds are only recognized as JSON strings; any other type yields `None`
    /// for that bound, which never matches a configured size.
    #[must_use]
    pub fn content_length_range(&self) -> Option<(Option<&str>, Option<&str>)> {
        match self {
            Self::Tuple(items)
                if items.first().and_then(Value::as_str) == Some(CONTENT_LENGTH_RANGE) =>
            {
                Some((
                    items.get(1).and_then(Value::as_str),
                    items.get(2).and_then(Value::as_str),
                ))
            }
            _ => None,
        }
    }
}

/// A client-submitted upload policy.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDocument {
    source: Map<String, Value>,
    expiration: String,
    conditions: Vec<Condition>,
}

impl PolicyDocument {
    /// Parse a policy from its JSON object form.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::MalformedPolicy`] if `expiration` is missing or
    /// not an ISO 8601 timestamp, or `conditions` is missing or not an array
    /// of objects and arrays.
    pub fn from_json(source: Map<String, Value>) -> Result<Self, SignerError> {
        let expiration = source
            .get("expiration")
            .and_then(Value::as_str)
            .ok_or_else(|| SignerError::MalformedPolicy("missing expiration".to_owned()))?
            .to_owned();
        DateTime::parse_from_rfc3339(&expiration).map_err(|e| {
            SignerError::MalformedPolicy(format!("invalid expiration {expiration:?}: {e}"))
        })?;

        let conditions = source
            .get("conditions")
            .and_then(Value::as_array)
            .ok_or_else(|| SignerError::MalformedPolicy("missing conditions array".to_owned()))?
            .iter()
            .map(Condition::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source,
            expiration,
            conditions,
        })
    }

    /// The policy's expiration timestamp, as submitted.
    #[must_use]
    pub fn expiration(&self) -> &str {
        &self.expiration
    }

    /// The policy's conditions, in submission order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The compact JSON text that gets encoded and signed.
    #[must_use]
    pub fn canonical_text(&self) -> String {
        Value::Object(self.source.clone()).to_string()
    }

    /// Base64 of [`PolicyDocument::canonical_text`].
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.canonical_text())
    }

    /// The bucket named by the policy.
    ///
    /// The last `bucket` condition whose value is set wins, whatever its type.
    /// A later `{"bucket": 123}` therefore shadows an earlier string and the
    /// policy names no usable bucket. `null`, `false`, `0` and `""` are unset.
    #[must_use]
    pub fn bucket(&self) -> Option<&Value> {
        self.conditions
            .iter()
            .rev()
            .filter_map(|c| c.field(BUCKET_FIELD))
            .find(|v| is_set(v))
    }

    /// The declared `content-length-range` bounds. The last such condition wins.
    #[must_use]
    pub fn content_length_range(&self) -> Option<(Option<&str>, Option<&str>)> {
        self.conditions
            .iter()
            .rev()
            .find_map(Condition::content_length_range)
    }

    /// The first `x-amz-credential` value, if any.
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.conditions
            .iter()
            .find_map(|c| c.field_str(CREDENTIAL_FIELD))
    }
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn policy(value: Value) -> Result<PolicyDocument, SignerError> {
        match value {
            Value::Object(map) => PolicyDocument::from_json(map),
            _ => panic!("test policy must be an object"),
        }
    }

    #[test]
    fn test_should_extract_bucket_range_and_credential() {
        let doc = policy(json!({
            "expiration": "2030-01-01T00:00:00.000Z",
            "conditions": [
                {"acl": "private"},
                {"bucket": "uploads"},
                {"Content-Type": "image/png"},
                ["content-length-range", "0", "1000"],
                {"x-amz-credential": "AKIDEXAMPLE/20130524/us-east-1/s3/aws4_request"}
            ]
        }))
        .unwrap();

        assert_eq!(doc.bucket(), Some(&json!("uploads")));
        assert_eq!(doc.content_length_range(), Some((Some("0"), Some("1000"))));
        assert_eq!(
            doc.credential(),
            Some("AKIDEXAMPLE/20130524/us-east-1/s3/aws4_request")
        );
        assert_eq!(doc.conditions().len(), 5);
        assert_eq!(doc.expiration(), "2030-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_should_preserve_member_order_in_canonical_text() {
        let doc = policy(json!({
            "expiration": "2030-01-01T00:00:00Z",
            "conditions": [{"key": "a.png"}, {"bucket": "uploads"}]
        }))
        .unwrap();

        assert_eq!(
            doc.canonical_text(),
            r#"{"expiration":"2030-01-01T00:00:00Z","conditions":[{"key":"a.png"},{"bucket":"uploads"}]}"#
        );
        assert_eq!(doc.to_base64(), BASE64.encode(doc.canonical_text()));
    }

    #[test]
    fn test_should_ignore_non_string_range_bounds() {
        let doc = policy(json!({
            "expiration": "2030-01-01T00:00:00Z",
            "conditions": [["content-length-range", 0, "1000"]]
        }))
        .unwrap();
        assert_eq!(doc.content_length_range(), Some((None, Some("1000"))));
    }

    #[test]
    fn test_should_let_last_bucket_condition_win() {
        let doc = policy(json!({
            "expiration": "2030-01-01T00:00:00Z",
            "conditions": [{"bucket": "uploads"}, {"bucket": ""}, {"bucket": "other"}]
        }))
        .unwrap();
        assert_eq!(doc.bucket(), Some(&json!("other")));
    }

    #[test]
    fn test_should_let_non_string_bucket_shadow_earlier_one() {
        let doc = policy(json!({
            "expiration": "2030-01-01T00:00:00Z",
            "conditions": [{"bucket": "uploads"}, {"bucket": 123}, {"bucket": null}, {"bucket": false}]
        }))
        .unwrap();
        assert_eq!(doc.bucket(), Some(&json!(123)));
    }

    #[test]
    fn test_should_reject_missing_conditions() {
        let err = policy(json!({"expiration": "2030-01-01T00:00:00Z"})).unwrap_err();
        assert!(matches!(err, SignerError::MalformedPolicy(_)));
    }

    #[test]
    fn test_should_reject_invalid_expiration() {
        let err = policy(json!({"expiration": "tomorrow", "conditions": []})).unwrap_err();
        assert!(matches!(err, SignerError::MalformedPolicy(_)));
    }

    #[test]
    fn test_should_reject_scalar_condition() {
        let err = policy(json!({
            "expiration": "2030-01-01T00:00:00Z",
            "conditions": ["bucket"]
        }))
        .unwrap_err();
        assert!(matches!(err, SignerError::MalformedPolicy(_)));
    }
}
