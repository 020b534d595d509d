//! Request and response field containers
//!
//! The vendor API is field-name driven in both directions: requests are flat
//! name/value sets and responses are positional values named by a fixed key
//! list per method.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Auth field carrying the merchant's numeric client id
pub const CLIENT_ID_FIELD: &str = "Client_ID";
/// Auth field carrying the system generated API password
pub const API_PASSWORD_FIELD: &str = "ApiPassword";
/// Asks the API to answer with a delimited string
pub const DELIM_DATA_FIELD: &str = "x_delim_data";
/// Delimiter character for delimited answers
pub const DELIM_CHAR_FIELD: &str = "x_delim_char";
/// Base64 JPEG payload of the signature methods
pub const IMAGE_DATA_FIELD: &str = "ImageData";

/// Ordered set of request fields.
///
/// Names are unique; setting an existing name replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestFields(Vec<(String, String)>);

impl RequestFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`RequestFields::set`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Prepend the auth pair, keeping any caller supplied values
    pub fn with_auth(mut self, client_id: &str, api_password: &str) -> Self {
        if !self.contains(API_PASSWORD_FIELD) {
            self.0
                .insert(0, (API_PASSWORD_FIELD.to_string(), api_password.to_string()));
        }
        if !self.contains(CLIENT_ID_FIELD) {
            self.0
                .insert(0, (CLIENT_ID_FIELD.to_string(), client_id.to_string()));
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy safe to put in logs and error messages: the API password is
    /// masked and image data is replaced by its length.
    pub fn redacted(&self) -> Self {
        let pairs = self
            .0
            .iter()
            .map(|(name, value)| {
                let value = match name.as_str() {
                    API_PASSWORD_FIELD if !value.is_empty() => "********".to_string(),
                    IMAGE_DATA_FIELD => format!("[{} base64 chars]", value.len()),
                    _ => value.clone(),
                };
                (name.clone(), value)
            })
            .collect();
        Self(pairs)
    }

    /// URL-encoded form body
    pub fn to_form_body(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(&self.0)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (name, value) in iter {
            fields.set(name, value);
        }
        fields
    }
}

/// How the caller wants the answer back
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResponseFormat {
    /// Return the raw delimited string instead of named fields
    pub delimited: bool,
    /// Delimiter used on the wire, and for joining SOAP values
    pub delimiter: char,
}

impl ResponseFormat {
    pub const DEFAULT_DELIMITER: char = ',';

    /// Named fields, comma delimited on the wire
    pub fn fields() -> Self {
        Self {
            delimited: false,
            delimiter: Self::DEFAULT_DELIMITER,
        }
    }

    /// Raw delimited string
    pub fn delimited() -> Self {
        Self {
            delimited: true,
            delimiter: Self::DEFAULT_DELIMITER,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Default for ResponseFormat {
    fn default() -> Self {
        Self::fields()
    }
}

/// What to do when a delimited answer does not carry one token per key
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldParsing {
    /// Token count must match the key count
    #[default]
    Strict,
    /// Extra tokens are dropped and missing keys are left out
    Lenient,
}

impl FieldParsing {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "strict" => Some(FieldParsing::Strict),
            "lenient" | "loose" => Some(FieldParsing::Lenient),
            _ => None,
        }
    }
}

/// Named result values in the order the API documents them
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultFields(Vec<(String, String)>);

impl ResultFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values joined by `delimiter`, in key order
    pub fn join(&self, delimiter: char) -> String {
        let mut buf = [0u8; 4];
        let separator: &str = delimiter.encode_utf8(&mut buf);
        self.values().collect::<Vec<_>>().join(separator)
    }

    pub fn into_inner(self) -> Vec<(String, String)> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResultFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for ResultFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Successful answer from a gateway call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiResponse {
    Fields(ResultFields),
    /// Response body exactly as received
    Delimited(Vec<u8>),
}

impl ApiResponse {
    pub fn fields(&self) -> Option<&ResultFields> {
        match self {
            ApiResponse::Fields(fields) => Some(fields),
            ApiResponse::Delimited(_) => None,
        }
    }

    pub fn delimited(&self) -> Option<&[u8]> {
        match self {
            ApiResponse::Fields(_) => None,
            ApiResponse::Delimited(raw) => Some(raw),
        }
    }

    /// Shortcut for a named field
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields().and_then(|f| f.get(key))
    }

    /// The vendor's `Result` code
    pub fn result_code(&self) -> Option<&str> {
        self.get("Result")
    }

    /// `Result` of 0 means the vendor accepted the operation
    pub fn is_approved(&self) -> bool {
        self.result_code() == Some("0")
    }
}

impl Serialize for ApiResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ApiResponse::Fields(fields) => fields.serialize(serializer),
            ApiResponse::Delimited(raw) => serializer.serialize_str(&String::from_utf8_lossy(raw)),
        }
    }
}

impl fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiResponse::Delimited(raw) => write!(f, "{}", String::from_utf8_lossy(raw)),
            ApiResponse::Fields(fields) => {
                for (k, v) in fields.iter() {
                    writeln!(f, "{k}: {v}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut fields = RequestFields::new().with("A", "1").with("B", "2");
        fields.set("A", "3");
        let pairs: Vec<_> = fields.iter().collect();
        assert_eq!(pairs, vec![("A", "3"), ("B", "2")]);
    }

    #[test]
    fn test_with_auth_prepends_defaults() {
        let fields = RequestFields::new()
            .with("Check_ID", "12322")
            .with_auth("123", "pw");
        let names: Vec<_> = fields.names().collect();
        assert_eq!(names, vec!["Client_ID", "ApiPassword", "Check_ID"]);
    }

    #[test]
    fn test_with_auth_keeps_caller_values() {
        let fields = RequestFields::new()
            .with("ApiPassword", "override")
            .with("Client_ID", "999")
            .with_auth("123", "pw");
        assert_eq!(fields.get("Client_ID"), Some("999"));
        assert_eq!(fields.get("ApiPassword"), Some("override"));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let fields = RequestFields::new()
            .with("Check_ID", "5")
            .with("ImageData", "QUJD")
            .with_auth("123", "pw")
            .redacted();
        assert_eq!(fields.get("Client_ID"), Some("123"));
        assert_eq!(fields.get("ApiPassword"), Some("********"));
        assert_eq!(fields.get("ImageData"), Some("[4 base64 chars]"));
        assert_eq!(fields.get("Check_ID"), Some("5"));
    }

    #[test]
    fn test_form_body_encoding() {
        let fields = RequestFields::new()
            .with("Name", "Jane Doe")
            .with("x_delim_char", ",");
        assert_eq!(
            fields.to_form_body().unwrap(),
            "Name=Jane+Doe&x_delim_char=%2C"
        );
    }

    #[test]
    fn test_result_fields_json_keeps_order() {
        let fields: ResultFields = [("Result", "0"), ("ResultDescription", "OK"), ("Check_ID", "7")]
            .into_iter()
            .collect();
        assert_eq!(
            serde_json::to_string(&fields).unwrap(),
            r#"{"Result":"0","ResultDescription":"OK","Check_ID":"7"}"#
        );
        assert_eq!(fields.join('|'), "0|OK|7");
    }

    #[test]
    fn test_api_response_helpers() {
        let fields: ResultFields = [("Result", "0"), ("ResultDescription", "OK")]
            .into_iter()
            .collect();
        let response = ApiResponse::Fields(fields);
        assert!(response.is_approved());
        assert_eq!(response.get("ResultDescription"), Some("OK"));

        let raw = ApiResponse::Delimited(b"0,OK".to_vec());
        assert_eq!(raw.delimited(), Some(&b"0,OK"[..]));
        assert!(!raw.is_approved());
        assert_eq!(raw.to_string(), "0,OK");

        let latin1 = ApiResponse::Delimited(b"0,Jos\xe9".to_vec());
        assert_eq!(latin1.to_string(), "0,Jos\u{fffd}");
        assert_eq!(serde_json::to_string(&latin1).unwrap(), "\"0,Jos\u{fffd}\"");
    }

    #[test]
    fn test_field_parsing_from_str() {
        assert_eq!(FieldParsing::from_str("STRICT"), Some(FieldParsing::Strict));
        assert_eq!(FieldParsing::from_str("lenient"), Some(FieldParsing::Lenient));
        assert_eq!(FieldParsing::from_str("other"), None);
        assert_eq!(FieldParsing::default(), FieldParsing::Strict);
    }
}
