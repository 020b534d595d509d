//! Check entry and follow-up operations
//!
//! Drafts against a customer's account plus the calls that inspect, cancel,
//! refund or annotate a check after it was entered.

use crate::gateway::{CheckGateway, GatewayResult};
use crate::models::{
    ApiResponse, BankAccount, CheckDetails, Customer, Recurrence, RemoteMethod, RequestFields,
    ResponseFormat, SignatureImage, VerificationMode, IMAGE_DATA_FIELD,
};

/// Longest note the API accepts, in characters
pub const MAX_NOTE_CHARS: usize = 2000;

/// Remote method for a draft in the given verification mode
pub fn draft_method(mode: VerificationMode, recurring: bool) -> RemoteMethod {
    match (mode, recurring) {
        (VerificationMode::RealTime, false) => RemoteMethod::OneTimeDraftRtv,
        (VerificationMode::Batch, false) => RemoteMethod::OneTimeDraftBv,
        (VerificationMode::RealTime, true) => RemoteMethod::RecurringDraftRtv,
        (VerificationMode::Batch, true) => RemoteMethod::RecurringDraftBv,
    }
}

/// Fields shared by every check-entry call
pub fn check_entry_fields(
    customer: &Customer,
    bank: &BankAccount,
    check: &CheckDetails,
) -> RequestFields {
    let mut fields = RequestFields::new();
    customer.write_fields(&mut fields);
    bank.write_fields(&mut fields);
    check.write_fields(&mut fields);
    fields
}

/// Request for a single Check_ID
pub fn check_id_fields(check_id: &str) -> RequestFields {
    RequestFields::new().with("Check_ID", check_id)
}

/// Cut a note down to [`MAX_NOTE_CHARS`] characters
pub fn truncate_note(note: &str) -> &str {
    match note.char_indices().nth(MAX_NOTE_CHARS) {
        Some((idx, _)) => &note[..idx],
        None => note,
    }
}

impl CheckGateway {
    /// Draft a single check from the customer's account
    pub async fn single_check(
        &self,
        customer: &Customer,
        bank: &BankAccount,
        check: &CheckDetails,
        mode: VerificationMode,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        let fields = check_entry_fields(customer, bank, check);
        self.call(draft_method(mode, false), fields, format).await
    }

    /// Draft the first check of a series; the rest follow on the schedule
    pub async fn recurring_check(
        &self,
        customer: &Customer,
        bank: &BankAccount,
        check: &CheckDetails,
        recurrence: &Recurrence,
        mode: VerificationMode,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        let mut fields = check_entry_fields(customer, bank, check);
        recurrence.write_fields(&mut fields);
        self.call(draft_method(mode, true), fields, format).await
    }

    /// Single check with a signature image. Verified in real time.
    pub async fn single_check_with_signature(
        &self,
        customer: &Customer,
        bank: &BankAccount,
        check: &CheckDetails,
        image: &SignatureImage,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        let fields = check_entry_fields(customer, bank, check)
            .with(IMAGE_DATA_FIELD, image.as_base64());
        self.call(RemoteMethod::OneTimeDraftWithSignatureImage, fields, format)
            .await
    }

    pub async fn recurring_check_with_signature(
        &self,
        customer: &Customer,
        bank: &BankAccount,
        check: &CheckDetails,
        image: &SignatureImage,
        recurrence: &Recurrence,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        let mut fields = check_entry_fields(customer, bank, check)
            .with(IMAGE_DATA_FIELD, image.as_base64());
        recurrence.write_fields(&mut fields);
        self.call(RemoteMethod::RecurringDraftWithSignatureImage, fields, format)
            .await
    }

    /// Verification, processing and rejection state of a check
    pub async fn check_status(
        &self,
        check_id: &str,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        self.call(RemoteMethod::CheckStatus, check_id_fields(check_id), format)
            .await
    }

    /// Cancel an unprocessed check. For a recurring check the whole series
    /// is cancelled.
    pub async fn cancel_check(
        &self,
        check_id: &str,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        self.call(RemoteMethod::CancelCheck, check_id_fields(check_id), format)
            .await
    }

    /// Refund part or all of a processed check
    pub async fn refund_check(
        &self,
        check_id: &str,
        memo: &str,
        amount: &str,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        let fields = check_id_fields(check_id)
            .with("RefundMemo", memo)
            .with("RefundAmount", amount);
        self.call(RemoteMethod::RefundCheck, fields, format).await
    }

    /// Attach a note to a check; longer notes are truncated
    pub async fn check_note(
        &self,
        check_id: &str,
        note: &str,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        let fields = check_id_fields(check_id).with("Note", truncate_note(note));
        self.call(RemoteMethod::CheckNote, fields, format).await
    }

    pub async fn upload_check_signature(
        &self,
        check_id: &str,
        image: &SignatureImage,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        let fields = check_id_fields(check_id).with(IMAGE_DATA_FIELD, image.as_base64());
        self.call(RemoteMethod::UploadSignatureImage, fields, format)
            .await
    }

    pub async fn verification_result(
        &self,
        check_id: &str,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        self.call(
            RemoteMethod::VerificationResult,
            check_id_fields(check_id),
            format,
        )
        .await
    }

    /// Override a risky/bad verdict that the API marks as overridable
    pub async fn override_verification(
        &self,
        check_id: &str,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        self.call(
            RemoteMethod::VerificationOverride,
            check_id_fields(check_id),
            format,
        )
        .await
    }
}
