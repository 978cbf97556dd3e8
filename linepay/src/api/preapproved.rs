//! v3 pre-approved (continuous) payment endpoints.
//!
//! A payment requested with pay type `PREAPPROVED` yields a registration
//! key (`regKey`) on confirmation. Later payments charge that key directly,
//! without the user going through the LINE app.

use serde::{Deserialize, Serialize};

use super::types::{EmptyBody, PreapprovedPaymentInfo};
use super::{ApiResult, segment};
use crate::client::Client;
use crate::context::CallContext;
use crate::query::{QueryParams, QueryWriter};

/// Body of [`Client::pay_preapproved`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreapprovedPaymentRequest {
    /// Product name.
    pub product_name: String,
    /// Amount to charge.
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Merchant order identifier.
    pub order_id: String,
    /// `false` leaves the payment authorized until captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<bool>,
}

/// Query of [`Client::check_reg_key`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckRegKeyRequest {
    /// Also authorize 1 JPY against the card to check it is usable.
    pub credit_card_auth: bool,
}

impl QueryParams for CheckRegKeyRequest {
    fn write_query(&self, query: &mut QueryWriter) {
        query.append("creditCardAuth", &self.credit_card_auth);
    }
}

impl Client {
    /// Charges a registration key.
    ///
    /// `POST v3/payments/preapprovedPay/{regKey}/payment`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`](crate::Error::Encoding) if `reg_key` is not
    /// URL-safe; otherwise see [`Client::send`].
    pub async fn pay_preapproved(
        &self,
        ctx: &CallContext,
        reg_key: &str,
        request: &PreapprovedPaymentRequest,
    ) -> ApiResult<PreapprovedPaymentInfo> {
        let path = format!("v3/payments/preapprovedPay/{}/payment", segment(reg_key)?);
        self.post_json(ctx, &path, request).await
    }

    /// Checks whether a registration key can still be charged.
    ///
    /// `GET v3/payments/preapprovedPay/{regKey}/check`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`](crate::Error::Encoding) if `reg_key` is not
    /// URL-safe; otherwise see [`Client::send`].
    pub async fn check_reg_key(
        &self,
        ctx: &CallContext,
        reg_key: &str,
        request: &CheckRegKeyRequest,
    ) -> ApiResult<serde_json::Value> {
        let path = format!("v3/payments/preapprovedPay/{}/check", segment(reg_key)?);
        self.get_query(ctx, &path, request).await
    }

    /// Expires a registration key. It cannot be charged afterwards.
    ///
    /// `POST v3/payments/preapprovedPay/{regKey}/expire`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`](crate::Error::Encoding) if `reg_key` is not
    /// URL-safe; otherwise see [`Client::send`].
    pub async fn expire_reg_key(
        &self,
        ctx: &CallContext,
        reg_key: &str,
    ) -> ApiResult<serde_json::Value> {
        let path = format!("v3/payments/preapprovedPay/{}/expire", segment(reg_key)?);
        self.post_json(ctx, &path, &EmptyBody {}).await
    }
}
