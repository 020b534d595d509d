//! Configuration module
//!
//! Client settings layered from defaults, a config file, the environment
//! and finally command-line flags.

pub mod env;
pub mod file;

use serde::{Deserialize, Serialize};

use crate::gateway::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_SOAP_NAMESPACE};
use crate::models::{FieldParsing, ResponseFormat};

pub use env::{EnvBuilder, EnvConfig, EnvGuard};
pub use file::ConfigFile;

/// Gateway client settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Numeric merchant id
    pub client_id: String,

    /// System generated API password
    pub api_password: String,

    /// Call the production system instead of the sandbox
    pub live: bool,

    pub connect_timeout_secs: u64,

    /// Bound on a whole call; unset means no bound
    pub request_timeout_secs: Option<u64>,

    /// Handling of delimited answers with the wrong token count
    pub field_parsing: FieldParsing,

    pub soap_namespace: String,

    /// Replaces the test/live endpoint when set
    pub base_url: Option<String>,

    /// Delimiter requested from the API
    pub delimiter: char,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            api_password: String::new(),
            live: false,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: None,
            field_parsing: FieldParsing::default(),
            soap_namespace: DEFAULT_SOAP_NAMESPACE.to_string(),
            base_url: None,
            delimiter: ResponseFormat::DEFAULT_DELIMITER,
        }
    }
}

impl ClientConfig {
    /// Response format with the configured delimiter
    pub fn response_format(&self, delimited: bool) -> ResponseFormat {
        let format = if delimited {
            ResponseFormat::delimited()
        } else {
            ResponseFormat::fields()
        };
        format.with_delimiter(self.delimiter)
    }

    /// True when both credentials are present
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.api_password.is_empty()
    }
}
