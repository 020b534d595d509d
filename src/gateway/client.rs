//! Check gateway client
//!
//! Holds the merchant credentials, the active endpoint and the last error.
//! The dispatchers live in `post.rs` and `soap.rs`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::warn;

use super::error::{GatewayError, GatewayResult};
use crate::config::ClientConfig;
use crate::models::FieldParsing;

/// Sandbox endpoint
pub const TEST_ENDPOINT: &str = "https://cpsandbox.com/echeck.asmx";
/// Production endpoint
pub const LIVE_ENDPOINT: &str = "https://greenbyphone.com/echeck.asmx";
/// Bound on the connection phase of every call
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 3;
/// XML namespace of the SOAP service
pub const DEFAULT_SOAP_NAMESPACE: &str = "CheckProcessing";

/// Which vendor system calls go to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Test,
    Live,
}

impl Endpoint {
    pub fn from_live(live: bool) -> Self {
        if live {
            Endpoint::Live
        } else {
            Endpoint::Test
        }
    }

    pub fn url(&self) -> &'static str {
        match self {
            Endpoint::Test => TEST_ENDPOINT,
            Endpoint::Live => LIVE_ENDPOINT,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Endpoint::Live)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Test => write!(f, "test"),
            Endpoint::Live => write!(f, "live"),
        }
    }
}

/// Client for the Green check-processing API
pub struct CheckGateway {
    pub(crate) http: Client,
    client_id: String,
    api_password: String,
    endpoint: Endpoint,
    base_url: Option<String>,
    pub(crate) field_parsing: FieldParsing,
    pub(crate) soap_namespace: String,
    last_error: Mutex<Option<String>>,
}

impl CheckGateway {
    /// Create a client with default settings
    pub fn new(
        client_id: impl Into<String>,
        api_password: impl Into<String>,
        live: bool,
    ) -> GatewayResult<Self> {
        Self::builder()
            .credentials(client_id, api_password)
            .live(live)
            .build()
    }

    pub fn builder() -> CheckGatewayBuilder {
        CheckGatewayBuilder::default()
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &ClientConfig) -> GatewayResult<Self> {
        let mut builder = Self::builder()
            .credentials(config.client_id.as_str(), config.api_password.as_str())
            .live(config.live)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .field_parsing(config.field_parsing)
            .soap_namespace(config.soap_namespace.as_str());

        if let Some(secs) = config.request_timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(url) = &config.base_url {
            builder = builder.base_url(url.as_str());
        }

        builder.build()
    }

    pub fn set_client_id(&mut self, client_id: impl Into<String>) {
        self.client_id = client_id.into();
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn set_api_password(&mut self, api_password: impl Into<String>) {
        self.api_password = api_password.into();
    }

    pub fn api_password(&self) -> &str {
        &self.api_password
    }

    /// Send calls to the production system
    pub fn live_mode(&mut self) {
        self.endpoint = Endpoint::Live;
    }

    /// Send calls to the sandbox
    pub fn test_mode(&mut self) {
        self.endpoint = Endpoint::Test;
    }

    pub fn is_live(&self) -> bool {
        self.endpoint.is_live()
    }

    pub fn mode(&self) -> Endpoint {
        self.endpoint
    }

    /// Base URL calls go to. A configured override wins over the mode table.
    pub fn endpoint(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.endpoint.url())
    }

    pub fn field_parsing(&self) -> FieldParsing {
        self.field_parsing
    }

    /// Description of the most recent failed call
    pub fn last_error(&self) -> Option<String> {
        self.last_error_slot().clone()
    }

    pub fn clear_last_error(&self) {
        *self.last_error_slot() = None;
    }

    fn last_error_slot(&self) -> MutexGuard<'_, Option<String>> {
        self.last_error.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a failure as the last error and pass the result through
    pub(crate) fn record<T>(&self, result: GatewayResult<T>) -> GatewayResult<T> {
        if let Err(err) = &result {
            warn!(
                "Gateway call {} failed: {}",
                err.method().unwrap_or("-"),
                err
            );
            *self.last_error_slot() = Some(err.detail());
        }
        result
    }
}

impl fmt::Display for CheckGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Gateway Type: POST")?;
        writeln!(f, "Endpoint: {}", self.endpoint())?;
        writeln!(f, "Client ID: {}", self.client_id)?;
        writeln!(f, "ApiPassword: {}", mask(&self.api_password))
    }
}

impl fmt::Debug for CheckGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckGateway")
            .field("client_id", &self.client_id)
            .field("endpoint", &self.endpoint())
            .field("field_parsing", &self.field_parsing)
            .finish_non_exhaustive()
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        "<not set>".to_string()
    } else {
        "*".repeat(secret.chars().count().min(8))
    }
}

/// Builder for [`CheckGateway`]
#[derive(Clone, Debug)]
pub struct CheckGatewayBuilder {
    client_id: String,
    api_password: String,
    live: bool,
    connect_timeout: Duration,
    request_timeout: Option<Duration>,
    field_parsing: FieldParsing,
    soap_namespace: String,
    base_url: Option<String>,
}

impl Default for CheckGatewayBuilder {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            api_password: String::new(),
            live: false,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: None,
            field_parsing: FieldParsing::default(),
            soap_namespace: DEFAULT_SOAP_NAMESPACE.to_string(),
            base_url: None,
        }
    }
}

impl CheckGatewayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credentials(
        mut self,
        client_id: impl Into<String>,
        api_password: impl Into<String>,
    ) -> Self {
        self.client_id = client_id.into();
        self.api_password = api_password.into();
        self
    }

    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Bound on the whole call. Unset by default.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn field_parsing(mut self, parsing: FieldParsing) -> Self {
        self.field_parsing = parsing;
        self
    }

    pub fn soap_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.soap_namespace = namespace.into();
        self
    }

    /// Send calls to this URL instead of the test/live table
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn build(self) -> GatewayResult<CheckGateway> {
        let mut http = Client::builder().connect_timeout(self.connect_timeout);
        if let Some(timeout) = self.request_timeout {
            http = http.timeout(timeout);
        }
        let http = http.build().map_err(GatewayError::ClientBuild)?;

        Ok(CheckGateway {
            http,
            client_id: self.client_id,
            api_password: self.api_password,
            endpoint: Endpoint::from_live(self.live),
            base_url: self.base_url,
            field_parsing: self.field_parsing,
            soap_namespace: self.soap_namespace,
            last_error: Mutex::new(None),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_table() {
        assert_eq!(Endpoint::Test.url(), "https://cpsandbox.com/echeck.asmx");
        assert_eq!(Endpoint::Live.url(), "https://greenbyphone.com/echeck.asmx");
        assert_eq!(Endpoint::from_live(true), Endpoint::Live);
        assert_eq!(Endpoint::from_live(false), Endpoint::Test);
    }

    #[test]
    fn test_mode_switching_is_idempotent() {
        let mut gateway = CheckGateway::new("123", "pw", false).unwrap();
        assert_eq!(gateway.endpoint(), TEST_ENDPOINT);

        gateway.live_mode();
        assert_eq!(gateway.endpoint(), LIVE_ENDPOINT);
        gateway.live_mode();
        assert_eq!(gateway.endpoint(), LIVE_ENDPOINT);
        assert!(gateway.is_live());

        gateway.test_mode();
        gateway.test_mode();
        assert_eq!(gateway.endpoint(), TEST_ENDPOINT);
        assert_eq!(gateway.mode(), Endpoint::Test);
    }

    #[test]
    fn test_base_url_override() {
        let mut gateway = CheckGateway::builder()
            .credentials("123", "pw")
            .base_url("http://127.0.0.1:8080/echeck.asmx/")
            .build()
            .unwrap();
        assert_eq!(gateway.endpoint(), "http://127.0.0.1:8080/echeck.asmx");
        gateway.live_mode();
        assert_eq!(gateway.endpoint(), "http://127.0.0.1:8080/echeck.asmx");
        assert!(gateway.is_live());
    }

    #[test]
    fn test_credentials_accessors() {
        let mut gateway = CheckGateway::new("123", "pw", true).unwrap();
        gateway.set_client_id("456");
        gateway.set_api_password("secret");
        assert_eq!(gateway.client_id(), "456");
        assert_eq!(gateway.api_password(), "secret");
    }

    #[test]
    fn test_display_masks_password() {
        let gateway = CheckGateway::new("123", "pw", false).unwrap();
        let summary = gateway.to_string();
        assert!(summary.contains("Gateway Type: POST"));
        assert!(summary.contains(&format!("Endpoint: {TEST_ENDPOINT}")));
        assert!(summary.contains("Client ID: 123"));
        assert!(summary.contains("ApiPassword: **"));
        assert!(!summary.contains("pw"));
        assert!(!format!("{gateway:?}").contains("pw"));
    }

    #[test]
    fn test_record_stores_last_error() {
        let gateway = CheckGateway::new("123", "pw", false).unwrap();
        assert!(gateway.last_error().is_none());

        let result: GatewayResult<()> = Err(GatewayError::UnexpectedStatus {
            method: "CheckStatus".to_string(),
            status: 503,
            body: String::new(),
        });
        assert!(gateway.record(result).is_err());
        assert_eq!(
            gateway.last_error().as_deref(),
            Some("CheckStatus returned HTTP 503")
        );

        assert!(gateway.record(Ok(())).is_ok());
        assert!(gateway.last_error().is_some());

        gateway.clear_last_error();
        assert!(gateway.last_error().is_none());
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig {
            client_id: "123".to_string(),
            api_password: "pw".to_string(),
            live: true,
            field_parsing: FieldParsing::Lenient,
            ..ClientConfig::default()
        };
        let gateway = CheckGateway::from_config(&config).unwrap();
        assert!(gateway.is_live());
        assert_eq!(gateway.field_parsing(), FieldParsing::Lenient);
        assert_eq!(gateway.client_id(), "123");
    }
}
