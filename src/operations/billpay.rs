//! Bill-pay operations
//!
//! Payments from the merchant's account to another person or company.

use crate::gateway::{CheckGateway, GatewayResult};
use crate::models::{
    ApiResponse, BankAccount, CheckDetails, Payee, Recurrence, RemoteMethod, RequestFields,
    ResponseFormat,
};

/// Payee, optional bank details and check details in wire order
pub fn billpay_fields(
    payee: &Payee,
    bank: Option<&BankAccount>,
    check: &CheckDetails,
) -> RequestFields {
    let mut fields = RequestFields::new();
    payee.write_fields(&mut fields);
    if let Some(bank) = bank {
        bank.write_fields(&mut fields);
    }
    check.write_fields(&mut fields);
    fields
}

impl CheckGateway {
    pub async fn single_billpay(
        &self,
        payee: &Payee,
        bank: &BankAccount,
        check: &CheckDetails,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        let fields = billpay_fields(payee, Some(bank), check);
        self.call(RemoteMethod::BillPayCheck, fields, format).await
    }

    /// Bill-pay check mailed to the payee; without bank details it cannot
    /// be deposited directly
    pub async fn single_billpay_without_bank(
        &self,
        payee: &Payee,
        check: &CheckDetails,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        let fields = billpay_fields(payee, None, check);
        self.call(RemoteMethod::BillPayCheckNoBankInfo, fields, format)
            .await
    }

    pub async fn recurring_billpay(
        &self,
        payee: &Payee,
        bank: &BankAccount,
        check: &CheckDetails,
        recurrence: &Recurrence,
        format: ResponseFormat,
    ) -> GatewayResult<ApiResponse> {
        let mut fields = billpay_fields(payee, Some(bank), check);
        recurrence.write_fields(&mut fields);
        self.call(RemoteMethod::RecurringBillPayCheck, fields, format)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, RecurrenceKind};
    use httpmock::prelude::*;

    fn payee() -> Payee {
        Payee::new(
            "Acme Supplies",
            Address::new("9 Mill Rd", "Boise", "ID", "83702").with_address2("Suite 4"),
        )
    }

    fn check() -> CheckDetails {
        CheckDetails::new("250.00", "02/01/2025").with_memo("Invoice 88")
    }

    #[test]
    fn test_billpay_fields_with_bank() {
        let bank = BankAccount::new("061000104", "42");
        let names: Vec<_> = billpay_fields(&payee(), Some(&bank), &check())
            .names()
            .map(str::to_string)
            .collect();
        assert_eq!(
            names,
            vec![
                "Name",
                "Address1",
                "Address2",
                "City",
                "State",
                "Zip",
                "Country",
                "RoutingNumber",
                "AccountNumber",
                "BankName",
                "CheckMemo",
                "CheckAmount",
                "CheckDate",
                "CheckNumber",
            ]
        );
    }

    #[test]
    fn test_billpay_fields_without_bank() {
        let fields = billpay_fields(&payee(), None, &check());
        assert!(!fields.contains("RoutingNumber"));
        assert!(!fields.contains("AccountNumber"));
        assert!(!fields.contains("BankName"));
        assert!(!fields.contains("EmailAddress"));
        assert_eq!(fields.get("Address2"), Some("Suite 4"));
        assert_eq!(fields.len(), 11);
    }

    #[tokio::test]
    async fn test_single_billpay() {
        let server = MockServer::start_async().await;
        let expected = serde_urlencoded::to_string([
            ("Client_ID", "123"),
            ("ApiPassword", "pw"),
            ("Name", "Acme Supplies"),
            ("Address1", "9 Mill Rd"),
            ("Address2", "Suite 4"),
            ("City", "Boise"),
            ("State", "ID"),
            ("Zip", "83702"),
            ("Country", "US"),
            ("RoutingNumber", "061000104"),
            ("AccountNumber", "42"),
            ("BankName", "First Bank"),
            ("CheckMemo", "Invoice 88"),
            ("CheckAmount", "250.00"),
            ("CheckDate", "02/01/2025"),
            ("CheckNumber", ""),
            ("x_delim_data", "TRUE"),
            ("x_delim_char", ","),
        ])
        .unwrap();
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/BillPayCheck").body(expected.as_str());
                then.status(200).body("0,OK,3000,76");
            })
            .await;

        let gateway = CheckGateway::builder()
            .credentials("123", "pw")
            .base_url(server.base_url())
            .build()
            .unwrap();
        let bank = BankAccount::new("061000104", "42").with_bank_name("First Bank");
        let response = gateway
            .single_billpay(&payee(), &bank, &check(), ResponseFormat::fields())
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.is_approved());
        assert_eq!(response.get("Check_ID"), Some("76"));
    }

    #[tokio::test]
    async fn test_recurring_billpay() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/RecurringBillPayCheck")
                    .body_includes("Name=Acme+Supplies")
                    .body_includes("RecurringType=M")
                    .body_includes("RecurringOffset=1")
                    .body_includes("RecurringPayments=12");
                then.status(200).body("0,OK,3001,77");
            })
            .await;

        let gateway = CheckGateway::builder()
            .credentials("123", "pw")
            .base_url(server.base_url())
            .build()
            .unwrap();
        let response = gateway
            .recurring_billpay(
                &payee(),
                &BankAccount::new("061000104", "42"),
                &check(),
                &Recurrence::new(RecurrenceKind::Monthly, 1, 12),
                ResponseFormat::fields(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.get("CheckNumber"), Some("3001"));
        assert_eq!(response.get("Check_ID"), Some("77"));
    }

    #[tokio::test]
    async fn test_billpay_without_bank_path() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/BillPayCheckNoBankInfo");
                then.status(200).body("0,OK,3002,78");
            })
            .await;

        let gateway = CheckGateway::builder()
            .credentials("123", "pw")
            .base_url(server.base_url())
            .build()
            .unwrap();
        let response = gateway
            .single_billpay_without_bank(&payee(), &check(), ResponseFormat::delimited())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.delimited(), Some(&b"0,OK,3002,78"[..]));
    }
}
