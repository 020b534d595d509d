//! Typed operations
//!
//! One method per vendor call on [`CheckGateway`]. Each maps its
//! parameters to the vendor's field names and hands off to the dispatcher
//! for the method's transport. Nothing is validated locally; the API
//! reports bad input through its result codes.

mod billpay;
mod checks;
mod invoices;

pub use billpay::billpay_fields;
pub use checks::{check_entry_fields, check_id_fields, draft_method, truncate_note, MAX_NOTE_CHARS};
pub use invoices::{combination_invoice_fields, invoice_fields};

use crate::gateway::{CheckGateway, GatewayResult};
use crate::models::{ApiResponse, RemoteMethod, RequestFields, ResponseFormat, Transport};

impl CheckGateway {
    /// Call a remote method over its transport
    pub async fn call(
        &self,
        method: RemoteMethod,
        fields: RequestFields,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        match method.transport() {
            Transport::Post => {
                self.request(method.name(), fields, format, method.result_keys())
                    .await
            }
            Transport::Soap => self.request_soap(method.name(), fields, format).await,
        }
    }
}
