//! Remote method table
//!
//! Names, transports and result key orders of every vendor method the
//! client wraps. Key orders are positional contracts with the API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a method is called
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// URL-encoded POST to `{endpoint}/{method}`, delimited answer
    Post,
    /// SOAP call, used where base64 image data must be carried
    Soap,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Post => write!(f, "POST"),
            Transport::Soap => write!(f, "SOAP"),
        }
    }
}

const CHECK_ENTRY_KEYS: &[&str] = &[
    "Result",
    "ResultDescription",
    "VerifyResult",
    "VerifyResultDescription",
    "CheckNumber",
    "Check_ID",
];

const CHECK_STATUS_KEYS: &[&str] = &[
    "Result",
    "ResultDescription",
    "VerifyResult",
    "VerifyResultDescription",
    "VerifyOverridden",
    "Deleted",
    "DeletedDate",
    "Processed",
    "ProcessedDate",
    "Rejected",
    "RejectedDate",
    "CheckNumber",
    "Check_ID",
];

const RESULT_ONLY_KEYS: &[&str] = &["Result", "ResultDescription"];

const REFUND_KEYS: &[&str] = &[
    "Result",
    "ResultDescription",
    "RefundCheckNumber",
    "RefundCheck_ID",
];

const BILLPAY_KEYS: &[&str] = &["Result", "ResultDescription", "CheckNumber", "Check_ID"];

const INVOICE_KEYS: &[&str] = &[
    "Result",
    "ResultDescription",
    "PaymentResult",
    "PaymentResultDescription",
    "Invoice_ID",
    "Check_ID",
];

/// Vendor methods wrapped by the client
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteMethod {
    OneTimeDraftRtv,
    OneTimeDraftBv,
    RecurringDraftRtv,
    RecurringDraftBv,
    OneTimeDraftWithSignatureImage,
    RecurringDraftWithSignatureImage,
    CheckStatus,
    CancelCheck,
    RefundCheck,
    CheckNote,
    UploadSignatureImage,
    VerificationResult,
    VerificationOverride,
    BillPayCheck,
    BillPayCheckNoBankInfo,
    RecurringBillPayCheck,
    OneTimeInvoice,
    RecurringInvoice,
    CombinationInvoice,
    InvoiceStatus,
}

impl RemoteMethod {
    /// Method name as used in the URL path and SOAP body
    pub fn name(&self) -> &'static str {
        match self {
            RemoteMethod::OneTimeDraftRtv => "OneTimeDraftRTV",
            RemoteMethod::OneTimeDraftBv => "OneTimeDraftBV",
            RemoteMethod::RecurringDraftRtv => "RecurringDraftRTV",
            RemoteMethod::RecurringDraftBv => "RecurringDraftBV",
            RemoteMethod::OneTimeDraftWithSignatureImage => "OneTimeDraftWithSignatureImage",
            RemoteMethod::RecurringDraftWithSignatureImage => "RecurringDraftWithSignatureImage",
            RemoteMethod::CheckStatus => "CheckStatus",
            RemoteMethod::CancelCheck => "CancelCheck",
            RemoteMethod::RefundCheck => "RefundCheck",
            RemoteMethod::CheckNote => "CheckNote",
            RemoteMethod::UploadSignatureImage => "UploadSignatureImage",
            RemoteMethod::VerificationResult => "VerificationResult",
            RemoteMethod::VerificationOverride => "VerificationOverride",
            RemoteMethod::BillPayCheck => "BillPayCheck",
            RemoteMethod::BillPayCheckNoBankInfo => "BillPayCheckNoBankInfo",
            RemoteMethod::RecurringBillPayCheck => "RecurringBillPayCheck",
            RemoteMethod::OneTimeInvoice => "OneTimeInvoice",
            RemoteMethod::RecurringInvoice => "RecurringInvoice",
            RemoteMethod::CombinationInvoice => "CombinationInvoice",
            RemoteMethod::InvoiceStatus => "InvoiceStatus",
        }
    }

    pub fn transport(&self) -> Transport {
        match self {
            RemoteMethod::OneTimeDraftWithSignatureImage
            | RemoteMethod::RecurringDraftWithSignatureImage
            | RemoteMethod::UploadSignatureImage => Transport::Soap,
            _ => Transport::Post,
        }
    }

    /// Ordered result keys of a delimited answer.
    ///
    /// Empty for SOAP methods, whose answer names its own fields.
    pub fn result_keys(&self) -> &'static [&'static str] {
        match self {
            RemoteMethod::OneTimeDraftRtv
            | RemoteMethod::OneTimeDraftBv
            | RemoteMethod::RecurringDraftRtv
            | RemoteMethod::RecurringDraftBv
            | RemoteMethod::VerificationResult
            | RemoteMethod::VerificationOverride => CHECK_ENTRY_KEYS,
            RemoteMethod::CheckStatus => CHECK_STATUS_KEYS,
            RemoteMethod::CancelCheck | RemoteMethod::CheckNote => RESULT_ONLY_KEYS,
            RemoteMethod::RefundCheck => REFUND_KEYS,
            RemoteMethod::BillPayCheck
            | RemoteMethod::BillPayCheckNoBankInfo
            | RemoteMethod::RecurringBillPayCheck => BILLPAY_KEYS,
            RemoteMethod::OneTimeInvoice
            | RemoteMethod::RecurringInvoice
            | RemoteMethod::CombinationInvoice
            | RemoteMethod::InvoiceStatus => INVOICE_KEYS,
            RemoteMethod::OneTimeDraftWithSignatureImage
            | RemoteMethod::RecurringDraftWithSignatureImage
            | RemoteMethod::UploadSignatureImage => &[],
        }
    }

    /// Short description for listings
    pub fn description(&self) -> &'static str {
        match self {
            RemoteMethod::OneTimeDraftRtv => "Single check, real-time verification",
            RemoteMethod::OneTimeDraftBv => "Single check, batch verification",
            RemoteMethod::RecurringDraftRtv => "Recurring check, real-time verification",
            RemoteMethod::RecurringDraftBv => "Recurring check, batch verification",
            RemoteMethod::OneTimeDraftWithSignatureImage => "Single check with signature image",
            RemoteMethod::RecurringDraftWithSignatureImage => {
                "Recurring check with signature image"
            }
            RemoteMethod::CheckStatus => "Status of a previously entered check",
            RemoteMethod::CancelCheck => "Cancel an unprocessed check or series",
            RemoteMethod::RefundCheck => "Refund a previously entered check",
            RemoteMethod::CheckNote => "Attach a note to a check",
            RemoteMethod::UploadSignatureImage => "Upload a signature image for a check",
            RemoteMethod::VerificationResult => "Verification result of a check",
            RemoteMethod::VerificationOverride => "Override an overridable verification code",
            RemoteMethod::BillPayCheck => "Single bill-pay check",
            RemoteMethod::BillPayCheckNoBankInfo => "Single bill-pay check without bank info",
            RemoteMethod::RecurringBillPayCheck => "Recurring bill-pay check",
            RemoteMethod::OneTimeInvoice => "Email a single invoice",
            RemoteMethod::RecurringInvoice => "Email an invoice for a recurring draft",
            RemoteMethod::CombinationInvoice => "Email an invoice for a down payment plus series",
            RemoteMethod::InvoiceStatus => "Payment status of an invoice",
        }
    }

    pub fn all() -> Vec<RemoteMethod> {
        vec![
            RemoteMethod::OneTimeDraftRtv,
            RemoteMethod::OneTimeDraftBv,
            RemoteMethod::RecurringDraftRtv,
            RemoteMethod::RecurringDraftBv,
            RemoteMethod::OneTimeDraftWithSignatureImage,
            RemoteMethod::RecurringDraftWithSignatureImage,
            RemoteMethod::CheckStatus,
            RemoteMethod::CancelCheck,
            RemoteMethod::RefundCheck,
            RemoteMethod::CheckNote,
            RemoteMethod::UploadSignatureImage,
            RemoteMethod::VerificationResult,
            RemoteMethod::VerificationOverride,
            RemoteMethod::BillPayCheck,
            RemoteMethod::BillPayCheckNoBankInfo,
            RemoteMethod::RecurringBillPayCheck,
            RemoteMethod::OneTimeInvoice,
            RemoteMethod::RecurringInvoice,
            RemoteMethod::CombinationInvoice,
            RemoteMethod::InvoiceStatus,
        ]
    }

    /// Look up by vendor name, case-insensitive
    pub fn from_name(name: &str) -> Option<RemoteMethod> {
        Self::all()
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for RemoteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
