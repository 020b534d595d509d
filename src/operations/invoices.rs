//! Invoice operations
//!
//! Invoices are emailed to the customer, who pays them online.

use crate::gateway::{CheckGateway, GatewayResult};
use crate::models::{
    ApiResponse, Invoice, Payment, Recurrence, RemoteMethod, RequestFields, ResponseFormat,
};

/// Invoice with a single payment
pub fn invoice_fields(invoice: &Invoice, payment: &Payment) -> RequestFields {
    let mut fields = RequestFields::new();
    invoice.write_fields(&mut fields);
    fields.set("Amount", payment.amount.as_str());
    fields.set("PaymentDate", payment.date.as_str());
    fields
}

/// Invoice with a down payment followed by a series
pub fn combination_invoice_fields(
    invoice: &Invoice,
    initial: &Payment,
    recurring: &Payment,
    recurrence: &Recurrence,
) -> RequestFields {
    let mut fields = RequestFields::new();
    invoice.write_fields(&mut fields);
    fields.set("InitialAmount", initial.amount.as_str());
    fields.set("InitialPaymentDate", initial.date.as_str());
    fields.set("RecurringAmount", recurring.amount.as_str());
    fields.set("RecurringPaymentDate", recurring.date.as_str());
    recurrence.write_fields(&mut fields);
    fields
}

impl CheckGateway {
    pub async fn single_invoice(
        &self,
        invoice: &Invoice,
        payment: &Payment,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        self.call(
            RemoteMethod::OneTimeInvoice,
            invoice_fields(invoice, payment),
            format,
        )
        .await
    }

    /// Invoice for a recurring draft
    pub async fn recurring_invoice(
        &self,
        invoice: &Invoice,
        payment: &Payment,
        recurrence: &Recurrence,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        let mut fields = invoice_fields(invoice, payment);
        recurrence.write_fields(&mut fields);
        self.call(RemoteMethod::RecurringInvoice, fields, format).await
    }

    /// Invoice for a down payment plus a recurring draft
    pub async fn combination_invoice(
        &self,
        invoice: &Invoice,
        initial: &Payment,
        recurring: &Payment,
        recurrence: &Recurrence,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        let fields = combination_invoice_fields(invoice, initial, recurring, recurrence);
        self.call(RemoteMethod::CombinationInvoice, fields, format)
            .await
    }

    /// Payment status of a previously sent invoice
    pub async fn invoice_status(
        &self,
        invoice_id: &str,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        let fields = RequestFields::new().with("Invoice_ID", invoice_id);
        self.call(RemoteMethod::InvoiceStatus, fields, format).await
    }
}
