//! Client for the Green check-processing and payment API
//!
//! Enter single and recurring checks, bill-pay checks and invoices, and
//! follow up on them, against either the sandbox or the live system.
//!
//! ```no_run
//! use green_check::{CheckGateway, ResponseFormat};
//!
//! # async fn run() -> green_check::GatewayResult<()> {
//! let gateway = CheckGateway::new("123456", "api-password", false)?;
//! let status = gateway.check_status("12322", ResponseFormat::fields()).await?;
//! if status.is_approved() {
//!     println!("{status}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod gateway;
pub mod models;
pub mod operations;
pub mod output;
pub mod utils;

pub use config::ClientConfig;
pub use gateway::{CheckGateway, CheckGatewayBuilder, Endpoint, ErrorKind, GatewayError, GatewayResult};
pub use models::{
    Address, ApiResponse, BankAccount, CheckDetails, Customer, FieldParsing, Invoice, Payee,
    Payment, Recurrence, RecurrenceKind, RemoteMethod, RequestFields, ResponseFormat,
    ResultFields, SignatureImage, VerificationMode,
};
