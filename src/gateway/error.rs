//! Gateway error types
//!
//! Every dispatcher failure ends up here. The vendor's own business result
//! codes are not errors; they come back as ordinary response fields.

use thiserror::Error;

/// Result type returned by every gateway call
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Broad failure category
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The call could not be completed
    Transport,
    /// The call completed but the response could not be turned into fields
    Parse,
}

/// Gateway client errors
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Failed to encode {method} request: {source}")]
    Encode {
        method: String,
        #[source]
        source: serde_urlencoded::ser::Error,
    },

    #[error("Request to {method} failed: {source}")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} returned HTTP {status}")]
    UnexpectedStatus {
        method: String,
        status: u16,
        body: String,
    },

    #[error("{method} returned {actual} delimited fields, expected {expected}")]
    FieldCountMismatch {
        method: String,
        expected: usize,
        actual: usize,
        raw: String,
    },

    #[error("SOAP request {method} failed: {message}")]
    Soap {
        method: String,
        message: String,
        request: String,
        response: String,
        kind: ErrorKind,
    },
}

impl GatewayError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::ClientBuild(_)
            | GatewayError::Encode { .. }
            | GatewayError::Transport { .. }
            | GatewayError::UnexpectedStatus { .. } => ErrorKind::Transport,
            GatewayError::FieldCountMismatch { .. } => ErrorKind::Parse,
            GatewayError::Soap { kind, .. } => *kind,
        }
    }

    /// Remote method the failing call targeted, if any
    pub fn method(&self) -> Option<&str> {
        match self {
            GatewayError::ClientBuild(_) => None,
            GatewayError::Encode { method, .. }
            | GatewayError::Transport { method, .. }
            | GatewayError::UnexpectedStatus { method, .. }
            | GatewayError::FieldCountMismatch { method, .. }
            | GatewayError::Soap { method, .. } => Some(method),
        }
    }

    /// Message stored as the client's last error.
    ///
    /// SOAP failures include the request and response bodies that were
    /// exchanged, everything else is the display string.
    pub fn detail(&self) -> String {
        match self {
            GatewayError::Soap {
                request, response, ..
            } => format!("{self}\nRequest: {request}\nResponse: {response}"),
            GatewayError::UnexpectedStatus { body, .. } if !body.is_empty() => {
                format!("{self}: {body}")
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_count_mismatch_is_parse_error() {
        let err = GatewayError::FieldCountMismatch {
            method: "CheckStatus".to_string(),
            expected: 13,
            actual: 6,
            raw: "0,OK,1,Verified,,1005".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.method(), Some("CheckStatus"));
        assert_eq!(
            err.to_string(),
            "CheckStatus returned 6 delimited fields, expected 13"
        );
    }

    #[test]
    fn test_soap_detail_includes_bodies() {
        let err = GatewayError::Soap {
            method: "UploadSignatureImage".to_string(),
            message: "soap:Server: Invalid Check_ID".to_string(),
            request: "<req/>".to_string(),
            response: "<resp/>".to_string(),
            kind: ErrorKind::Transport,
        };
        let detail = err.detail();
        assert!(detail.contains("Invalid Check_ID"));
        assert!(detail.contains("Request: <req/>"));
        assert!(detail.contains("Response: <resp/>"));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_unexpected_status_detail() {
        let err = GatewayError::UnexpectedStatus {
            method: "CancelCheck".to_string(),
            status: 500,
            body: "Server Error".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.detail(), "CancelCheck returned HTTP 500: Server Error");
    }
}
