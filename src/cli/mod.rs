//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};

use green_check::{
    Address, BankAccount, CheckDetails, Customer, Invoice, Payee, Payment, Recurrence,
    RecurrenceKind, SignatureImage, VerificationMode,
};

/// Command-line client for the Green check-processing API
#[derive(Parser, Debug)]
#[command(name = "green-check")]
#[command(version)]
#[command(about = "Enter and track checks, bill-pay checks and invoices")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to the standard search path)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Call the live system
    #[arg(long, global = true, conflicts_with = "test")]
    pub live: bool,

    /// Call the sandbox
    #[arg(long, global = true)]
    pub test: bool,

    /// Merchant client id
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// API password
    #[arg(long, global = true)]
    pub api_password: Option<String>,

    /// Endpoint override
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Connect timeout in seconds
    #[arg(long, global = true)]
    pub connect_timeout: Option<u64>,

    /// Output format (table, json, json-pretty, csv, raw)
    #[arg(short, long, global = true, default_value = "table")]
    pub format: String,

    /// Delimiter requested from the API
    #[arg(short, long, global = true)]
    pub delimiter: Option<char>,

    /// Accept answers with fewer or more fields than expected
    #[arg(long, global = true)]
    pub lenient: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Status of a check
    Status {
        check_id: String,
    },

    /// Verification result of a check
    Verify {
        check_id: String,
    },

    /// Override an overridable verification result
    Override {
        check_id: String,
    },

    /// Cancel an unprocessed check (a whole series for recurring checks)
    Cancel {
        check_id: String,
    },

    /// Refund a check
    Refund {
        check_id: String,

        /// Amount to refund (##.##)
        #[arg(short, long)]
        amount: String,

        #[arg(short, long, default_value = "")]
        memo: String,
    },

    /// Attach a note to a check (max 2000 characters)
    Note {
        check_id: String,
        note: String,
    },

    /// Upload a signature image for a check
    UploadSignature {
        check_id: String,

        #[command(flatten)]
        image: ImageArgs,
    },

    /// Enter a check drafted from a customer's account
    Check(CheckArgs),

    /// Enter a bill-pay check to a payee
    Billpay(BillpayArgs),

    /// Email an invoice
    Invoice(InvoiceArgs),

    /// Payment status of an invoice
    InvoiceStatus {
        invoice_id: String,
    },

    /// List remote methods and their result fields
    Methods,

    /// Manage configuration
    Config(ConfigArgs),
}

/// Postal address flags
#[derive(ClapArgs, Debug, Clone)]
pub struct AddressArgs {
    /// Street number and name
    #[arg(long)]
    pub address1: String,

    /// Suite, floor, etc.
    #[arg(long, default_value = "")]
    pub address2: String,

    #[arg(long)]
    pub city: String,

    /// 2-character state code
    #[arg(long)]
    pub state: String,

    #[arg(long)]
    pub zip: String,

    #[arg(long, default_value = "US")]
    pub country: String,
}

impl AddressArgs {
    pub fn to_address(&self) -> Address {
        Address::new(&self.address1, &self.city, &self.state, &self.zip)
            .with_address2(&self.address2)
            .with_country(&self.country)
    }
}

/// Amount, date, memo and number of a check
#[derive(ClapArgs, Debug, Clone)]
pub struct CheckDetailArgs {
    /// Amount (##.##, no currency symbol)
    #[arg(long)]
    pub amount: String,

    /// Check date MM/DD/YYYY (defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long, default_value = "")]
    pub memo: String,

    /// Check number (defaults to a system generated one)
    #[arg(long, default_value = "")]
    pub check_number: String,
}

impl CheckDetailArgs {
    pub fn to_details(&self) -> CheckDetails {
        let details = match &self.date {
            Some(date) => CheckDetails::new(&self.amount, date),
            None => CheckDetails::on(&self.amount, today()),
        };
        details
            .with_memo(&self.memo)
            .with_check_number(&self.check_number)
    }
}

/// Recurrence flags; a series is entered only when `--recur` is given
#[derive(ClapArgs, Debug, Clone)]
pub struct RecurrenceArgs {
    /// Recurrence unit: monthly, weekly or daily (M/W/D)
    #[arg(long, value_parser = parse_recurrence_kind)]
    pub recur: Option<RecurrenceKind>,

    /// Units between payments
    #[arg(long, default_value_t = 1)]
    pub every: u32,

    /// Number of payments, -1 until stopped
    #[arg(long, default_value_t = Recurrence::UNTIL_STOPPED, allow_negative_numbers = true)]
    pub payments: i32,
}

impl RecurrenceArgs {
    pub fn to_recurrence(&self) -> Option<Recurrence> {
        self.recur
            .map(|kind| Recurrence::new(kind, self.every, self.payments))
    }
}

/// Signature image source
#[derive(ClapArgs, Debug, Clone)]
pub struct ImageArgs {
    /// JPEG file holding the signature
    #[arg(long = "image")]
    pub path: PathBuf,

    /// The file already holds base64 text
    #[arg(long)]
    pub base64: bool,
}

impl ImageArgs {
    pub fn load(&self) -> Result<SignatureImage> {
        load_signature(&self.path, self.base64)
    }
}

/// Arguments for check command
#[derive(ClapArgs, Debug)]
pub struct CheckArgs {
    /// Full name on the checking account
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub email: String,

    /// ###-###-####
    #[arg(long, default_value = "")]
    pub phone: String,

    #[arg(long, default_value = "")]
    pub phone_ext: String,

    #[command(flatten)]
    pub address: AddressArgs,

    /// 9-digit routing number
    #[arg(long)]
    pub routing: String,

    #[arg(long)]
    pub account: String,

    #[arg(long, default_value = "")]
    pub bank_name: String,

    #[command(flatten)]
    pub details: CheckDetailArgs,

    #[command(flatten)]
    pub recurrence: RecurrenceArgs,

    /// Verify later instead of in real time
    #[arg(long)]
    pub batch: bool,

    /// Signature image; checks with a signature are verified in real time
    #[arg(long = "signature")]
    pub signature: Option<PathBuf>,

    /// The signature file already holds base64 text
    #[arg(long, requires = "signature")]
    pub signature_base64: bool,
}

impl CheckArgs {
    pub fn customer(&self) -> Customer {
        Customer::new(&self.name, self.address.to_address())
            .with_email(&self.email)
            .with_phone(&self.phone, &self.phone_ext)
    }

    pub fn bank(&self) -> BankAccount {
        BankAccount::new(&self.routing, &self.account).with_bank_name(&self.bank_name)
    }

    pub fn mode(&self) -> VerificationMode {
        if self.batch {
            VerificationMode::Batch
        } else {
            VerificationMode::RealTime
        }
    }

    pub fn signature_image(&self) -> Result<Option<SignatureImage>> {
        self.signature
            .as_deref()
            .map(|path| load_signature(path, self.signature_base64))
            .transpose()
    }
}

/// Arguments for billpay command
#[derive(ClapArgs, Debug)]
pub struct BillpayArgs {
    /// Payee name
    #[arg(long)]
    pub name: String,

    #[command(flatten)]
    pub address: AddressArgs,

    /// Payee routing number; without bank details the check is mailed
    #[arg(long, requires = "account")]
    pub routing: Option<String>,

    #[arg(long, requires = "routing")]
    pub account: Option<String>,

    #[arg(long, default_value = "")]
    pub bank_name: String,

    #[command(flatten)]
    pub details: CheckDetailArgs,

    #[command(flatten)]
    pub recurrence: RecurrenceArgs,
}

impl BillpayArgs {
    pub fn payee(&self) -> Payee {
        Payee::new(&self.name, self.address.to_address())
    }

    pub fn bank(&self) -> Option<BankAccount> {
        match (&self.routing, &self.account) {
            (Some(routing), Some(account)) => {
                Some(BankAccount::new(routing, account).with_bank_name(&self.bank_name))
            }
            _ => None,
        }
    }
}

/// Arguments for invoice command
#[derive(ClapArgs, Debug)]
pub struct InvoiceArgs {
    /// Name of the person paying
    #[arg(long)]
    pub customer_name: String,

    /// Address the invoice is emailed to
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub item: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Invoice amount, or the recurring amount with --down-payment
    #[arg(long)]
    pub amount: String,

    /// Payment date MM/DD/YYYY (defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Down payment amount; makes a combination invoice
    #[arg(long, requires = "recur")]
    pub down_payment: Option<String>,

    /// Down payment date MM/DD/YYYY (defaults to today)
    #[arg(long, requires = "down_payment")]
    pub down_payment_date: Option<String>,

    #[command(flatten)]
    pub recurrence: RecurrenceArgs,
}

impl InvoiceArgs {
    pub fn invoice(&self) -> Invoice {
        Invoice::new(&self.customer_name, &self.email, &self.item)
            .with_description(&self.description)
    }

    pub fn payment(&self) -> Payment {
        match &self.date {
            Some(date) => Payment::new(&self.amount, date),
            None => Payment::on(&self.amount, today()),
        }
    }

    pub fn down_payment(&self) -> Option<Payment> {
        self.down_payment.as_ref().map(|amount| {
            match &self.down_payment_date {
                Some(date) => Payment::new(amount, date),
                None => Payment::on(amount, today()),
            }
        })
    }
}

/// Arguments for config command
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        #[arg(short, long, default_value = "./green-check.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Show environment variables instead
        #[arg(long)]
        env: bool,
    },

    /// Validate a configuration file
    Validate {
        file: Option<String>,
    },
}

fn parse_recurrence_kind(s: &str) -> std::result::Result<RecurrenceKind, String> {
    RecurrenceKind::from_str(s)
        .ok_or_else(|| format!("unknown recurrence '{s}', expected monthly, weekly or daily"))
}

/// Local calendar date, used when no date flag is given
fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Read a signature image, raw JPEG or base64 text
pub fn load_signature(path: &Path, is_base64: bool) -> Result<SignatureImage> {
    if is_base64 {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read signature file: {}", path.display()))?;
        Ok(SignatureImage::from_base64(text.trim()))
    } else {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read signature file: {}", path.display()))?;
        Ok(SignatureImage::from_jpeg(&bytes))
    }
}
