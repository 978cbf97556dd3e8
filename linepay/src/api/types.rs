//! Response envelope and payload shapes shared by several endpoints.
//!
//! Decoding is lenient: unknown fields are ignored and missing fields take
//! their default. Timestamps are kept as the ISO-8601 strings the API sends.

use serde::{Deserialize, Serialize};

use crate::constants::SUCCESS_RETURN_CODE;

/// The common response body of every LINE Pay endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<I> {
    /// Result code; `"0000"` on success.
    #[serde(default)]
    pub return_code: String,
    /// Human-readable result message.
    #[serde(default)]
    pub return_message: String,
    /// Operation-specific payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<I>,
}

impl<I> Envelope<I> {
    /// Returns `true` if the API reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.return_code == SUCCESS_RETURN_CODE
    }
}

/// Envelope of endpoints whose payload is not modelled.
pub type BasicResponse = Envelope<serde_json::Value>;

/// Empty JSON object body (`{}`) for endpoints that take no fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmptyBody {}

/// How a payment was paid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayInfo {
    /// Payment method, e.g. `CREDIT_CARD` or `BALANCE`.
    pub method: String,
    /// Amount paid with this method.
    pub amount: i64,
    /// Masked card number, for credit card payments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked_credit_card_number: Option<String>,
}

/// Payment page URLs returned by a payment request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentUrl {
    /// URL for web browsers.
    pub web: String,
    /// App URL scheme for the LINE app.
    pub app: String,
}

/// Payload of a successful payment request or reservation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentRequestInfo {
    /// Identifier of the new transaction.
    pub transaction_id: i64,
    /// Where to send the user to approve the payment.
    pub payment_url: PaymentUrl,
    /// Token for the LINE app payment flow.
    pub payment_access_token: String,
}

/// Payload of a successful refund or void.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefundInfo {
    /// Identifier of the refund transaction.
    pub refund_transaction_id: i64,
    /// When the refund happened.
    pub refund_transaction_date: String,
}

/// Payload of a successful pre-approved payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreapprovedPaymentInfo {
    /// Identifier of the new transaction.
    pub transaction_id: i64,
    /// When the payment happened.
    pub transaction_date: String,
}

/// One refund recorded against a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefundEntry {
    /// Identifier of the refund transaction.
    pub refund_transaction_id: i64,
    /// Transaction type, e.g. `PAYMENT_REFUND` or `PARTIAL_REFUND`.
    pub transaction_type: String,
    /// Refunded amount; negative in API responses.
    pub refund_amount: i64,
    /// When the refund happened.
    pub refund_transaction_date: String,
}

/// A transaction as returned by the inquiry endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionRecord {
    /// Transaction identifier.
    pub transaction_id: i64,
    /// Merchant order identifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub order_id: String,
    /// When the transaction happened.
    pub transaction_date: String,
    /// Transaction type, e.g. `PAYMENT`.
    pub transaction_type: String,
    /// Authorization status, e.g. `AUTHORIZATION` or `VOIDED_AUTHORIZATION`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pay_status: String,
    /// Product name.
    pub product_name: String,
    /// Merchant name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub merchant_name: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// When the authorization expires.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub authorization_expire_date: String,
    /// How the transaction was paid.
    pub pay_info: Vec<PayInfo>,
    /// Refunds against this transaction.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub refund_list: Vec<RefundEntry>,
    /// For refund transactions, the original payment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_transaction_id: Option<i64>,
}
