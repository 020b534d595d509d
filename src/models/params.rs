//! Typed operation parameters
//!
//! Each type knows the vendor field names it maps to. Values are passed
//! through untouched; the API validates formats remotely.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RequestFields;

/// Date format the API expects for check and payment dates
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Format a date as `MM/DD/YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Postal address
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street number and street name
    pub address1: String,
    /// Suite, floor, etc.
    #[serde(default)]
    pub address2: String,
    pub city: String,
    /// 2-character state abbreviation
    pub state: String,
    /// `#####` or `#####-####`
    pub zip: String,
    /// 2-character country code
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "US".to_string()
}

impl Address {
    pub fn new(
        address1: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            address1: address1.into(),
            address2: String::new(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
            country: default_country(),
        }
    }

    pub fn with_address2(mut self, address2: impl Into<String>) -> Self {
        self.address2 = address2.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    fn write_fields(&self, fields: &mut RequestFields) {
        fields.set("Address1", self.address1.as_str());
        fields.set("Address2", self.address2.as_str());
        fields.set("City", self.city.as_str());
        fields.set("State", self.state.as_str());
        fields.set("Zip", self.zip.as_str());
        fields.set("Country", self.country.as_str());
    }
}

/// Customer whose account is drafted
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Full name on the checking account
    pub name: String,
    /// Receipt goes here; without it the customer is notified by mail
    #[serde(default)]
    pub email: String,
    /// `###-###-####`
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub phone_ext: String,
    pub address: Address,
}

impl Customer {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            email: String::new(),
            phone: String::new(),
            phone_ext: String::new(),
            address,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>, ext: impl Into<String>) -> Self {
        self.phone = phone.into();
        self.phone_ext = ext.into();
        self
    }

    pub(crate) fn write_fields(&self, fields: &mut RequestFields) {
        fields.set("Name", self.name.as_str());
        fields.set("EmailAddress", self.email.as_str());
        fields.set("Phone", self.phone.as_str());
        fields.set("PhoneExtension", self.phone_ext.as_str());
        self.address.write_fields(fields);
    }
}

/// Recipient of a bill-pay check
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payee {
    pub name: String,
    pub address: Address,
}

impl Payee {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }

    pub(crate) fn write_fields(&self, fields: &mut RequestFields) {
        fields.set("Name", self.name.as_str());
        self.address.write_fields(fields);
    }
}

/// US bank account
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// 9-digit routing number
    pub routing_number: String,
    pub account_number: String,
    #[serde(default)]
    pub bank_name: String,
}

impl BankAccount {
    pub fn new(routing_number: impl Into<String>, account_number: impl Into<String>) -> Self {
        Self {
            routing_number: routing_number.into(),
            account_number: account_number.into(),
            bank_name: String::new(),
        }
    }

    pub fn with_bank_name(mut self, bank_name: impl Into<String>) -> Self {
        self.bank_name = bank_name.into();
        self
    }

    pub(crate) fn write_fields(&self, fields: &mut RequestFields) {
        fields.set("RoutingNumber", self.routing_number.as_str());
        fields.set("AccountNumber", self.account_number.as_str());
        fields.set("BankName", self.bank_name.as_str());
    }
}

/// Memo, amount, date and number of a single check
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDetails {
    #[serde(default)]
    pub memo: String,
    /// `##.##` without currency symbols
    pub amount: String,
    /// `MM/DD/YYYY`
    pub date: String,
    /// Empty lets the API pick a number
    #[serde(default)]
    pub check_number: String,
}

impl CheckDetails {
    pub fn new(amount: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            memo: String::new(),
            amount: amount.into(),
            date: date.into(),
            check_number: String::new(),
        }
    }

    pub fn on(amount: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(amount, format_date(date))
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn with_check_number(mut self, check_number: impl Into<String>) -> Self {
        self.check_number = check_number.into();
        self
    }

    pub(crate) fn write_fields(&self, fields: &mut RequestFields) {
        fields.set("CheckMemo", self.memo.as_str());
        fields.set("CheckAmount", self.amount.as_str());
        fields.set("CheckDate", self.date.as_str());
        fields.set("CheckNumber", self.check_number.as_str());
    }
}

/// Unit between recurring payments
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Monthly,
    Weekly,
    Daily,
}

impl RecurrenceKind {
    /// Wire code
    pub fn code(&self) -> &'static str {
        match self {
            RecurrenceKind::Monthly => "M",
            RecurrenceKind::Weekly => "W",
            RecurrenceKind::Daily => "D",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "m" | "month" | "monthly" => Some(RecurrenceKind::Monthly),
            "w" | "week" | "weekly" => Some(RecurrenceKind::Weekly),
            "d" | "day" | "daily" => Some(RecurrenceKind::Daily),
            _ => None,
        }
    }
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Recurring schedule.
///
/// Once a month for 12 payments is `Recurrence::new(Monthly, 1, 12)`,
/// every other day for 10 payments is `Recurrence::new(Daily, 2, 10)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub kind: RecurrenceKind,
    /// Units of `kind` between payments
    pub offset: u32,
    /// Total payments; the API accepts 2-99, or -1 to recur until stopped
    pub payments: i32,
}

impl Recurrence {
    /// Payment count meaning "until stopped by you or the customer"
    pub const UNTIL_STOPPED: i32 = -1;

    pub fn new(kind: RecurrenceKind, offset: u32, payments: i32) -> Self {
        Self {
            kind,
            offset,
            payments,
        }
    }

    pub fn monthly(payments: i32) -> Self {
        Self::new(RecurrenceKind::Monthly, 1, payments)
    }

    pub fn until_stopped(kind: RecurrenceKind, offset: u32) -> Self {
        Self::new(kind, offset, Self::UNTIL_STOPPED)
    }

    pub(crate) fn write_fields(&self, fields: &mut RequestFields) {
        fields.set("RecurringType", self.kind.code());
        fields.set("RecurringOffset", self.offset.to_string());
        fields.set("RecurringPayments", self.payments.to_string());
    }
}

/// When eVerification runs for a newly entered check
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    /// Verify immediately and return the verdict
    #[default]
    RealTime,
    /// Accept now, verify later; poll with `check_status`
    Batch,
}

/// Invoice recipient and item
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub customer_name: String,
    /// The invoice is emailed here
    pub email: String,
    pub item_name: String,
    #[serde(default)]
    pub item_description: String,
}

impl Invoice {
    pub fn new(
        customer_name: impl Into<String>,
        email: impl Into<String>,
        item_name: impl Into<String>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            email: email.into(),
            item_name: item_name.into(),
            item_description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.item_description = description.into();
        self
    }

    pub(crate) fn write_fields(&self, fields: &mut RequestFields) {
        fields.set("CustomerName", self.customer_name.as_str());
        fields.set("EmailAddress", self.email.as_str());
        fields.set("ItemName", self.item_name.as_str());
        fields.set("ItemDescription", self.item_description.as_str());
    }
}

/// Amount and date of an invoice payment
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: String,
    pub date: String,
}

impl Payment {
    pub fn new(amount: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            date: date.into(),
        }
    }

    pub fn on(amount: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(amount, format_date(date))
    }
}

/// JPEG of a document carrying the customer's signature, base64 encoded
#[derive(Clone, PartialEq, Eq)]
pub struct SignatureImage(String);

impl SignatureImage {
    /// Encode raw JPEG bytes
    pub fn from_jpeg(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    /// Wrap data that is already base64 encoded
    pub fn from_base64(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_base64(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SignatureImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureImage({} base64 chars)", self.0.len())
    }
}
