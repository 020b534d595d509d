//! Gateway client and dispatchers
//!
//! `CheckGateway` owns credentials and mode; `post` and `soap` carry calls
//! over the two bindings the vendor exposes.

mod client;
mod error;
mod post;
mod soap;

pub use client::{
    CheckGateway, CheckGatewayBuilder, Endpoint, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_SOAP_NAMESPACE, LIVE_ENDPOINT, TEST_ENDPOINT,
};
pub use error::{ErrorKind, GatewayError, GatewayResult};
pub use post::{parse_delimited, PreparedRequest};
pub use soap::{build_envelope, parse_soap_response, SoapBody};
