//! Data models for gateway calls
//!
//! Request/response field containers, typed operation parameters and the
//! remote method table.

mod fields;
mod method;
mod params;

pub use fields::{
    ApiResponse, FieldParsing, RequestFields, ResponseFormat, ResultFields, API_PASSWORD_FIELD,
    CLIENT_ID_FIELD, DELIM_CHAR_FIELD, DELIM_DATA_FIELD, IMAGE_DATA_FIELD,
};
pub use method::{RemoteMethod, Transport};
pub use params::{
    format_date, Address, BankAccount, CheckDetails, Customer, Invoice, Payee, Payment,
    Recurrence, RecurrenceKind, SignatureImage, VerificationMode, DATE_FORMAT,
};
