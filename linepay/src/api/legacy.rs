//! v2 endpoints.
//!
//! These predate the signature scheme; build the client with
//! [`AuthScheme::ChannelSecret`](crate::AuthScheme::ChannelSecret) to call
//! them the way channels registered for v2 expect.

use serde::{Deserialize, Serialize};

use super::payments::RefundRequest;
use super::preapproved::{CheckRegKeyRequest, PreapprovedPaymentRequest};
use super::types::{
    EmptyBody, PaymentRequestInfo, PreapprovedPaymentInfo, RefundInfo, TransactionRecord,
};
use super::{ApiResult, segment};
use crate::client::Client;
use crate::context::CallContext;
use crate::query::{QueryParams, QueryWriter};

/// Body of [`Client::reserve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    /// Product name.
    pub product_name: String,
    /// Product image shown on the payment page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_image_url: Option<String>,
    /// Amount to charge.
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// LINE member identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<String>,
    /// One-time key read from the user's LINE Pay barcode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_time_key: Option<String>,
    /// Where the user goes after approving the payment.
    pub confirm_url: String,
    /// `CLIENT` (default) or `SERVER`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_url_type: Option<String>,
    /// Whether to check the browser used for the confirm URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_confirm_url_browser: Option<bool>,
    /// Where the user goes after cancelling the payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
    /// Android package name, for app-to-app payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    /// Merchant order identifier.
    pub order_id: String,
    /// Delivery contact number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_place_phone: Option<String>,
    /// `NORMAL` or `PREAPPROVED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_type: Option<String>,
    /// Payment page language code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang_cd: Option<String>,
    /// `false` separates authorization from capture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<bool>,
    /// Extra options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<ReserveExtras>,
}

/// Extra options of a reservation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveExtras {
    /// Official accounts to suggest.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add_friends: Vec<ReserveAddFriend>,
    /// Branch name shown to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
}

/// One friend suggestion of a reservation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveAddFriend {
    /// Suggestion type, e.g. `lineAt`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Account identifiers.
    pub id_list: Vec<String>,
}

/// Query of [`Client::inquire_payment`] and [`Client::inquire_authorization`].
///
/// Zero and empty values are left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InquiryRequest {
    /// Transaction to look up.
    pub transaction_id: i64,
    /// Order to look up.
    pub order_id: String,
}

impl QueryParams for InquiryRequest {
    fn write_query(&self, query: &mut QueryWriter) {
        query
            .append_nonempty("transactionId", &self.transaction_id)
            .append_nonempty("orderId", &self.order_id);
    }
}

impl Client {
    /// Reserves a payment and returns the payment URL for the user.
    ///
    /// `POST v2/payments/request`
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn reserve(
        &self,
        ctx: &CallContext,
        request: &ReserveRequest,
    ) -> ApiResult<PaymentRequestInfo> {
        self.post_json(ctx, "v2/payments/request", request).await
    }

    /// Refunds a captured payment.
    ///
    /// `POST v2/payments/{transactionId}/refund`
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn refund_v2(
        &self,
        ctx: &CallContext,
        transaction_id: i64,
        request: &RefundRequest,
    ) -> ApiResult<RefundInfo> {
        let path = format!("v2/payments/{transaction_id}/refund");
        self.post_json(ctx, &path, request).await
    }

    /// Looks up captured payments.
    ///
    /// `GET v2/payments/payments`
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn inquire_payment(
        &self,
        ctx: &CallContext,
        request: &InquiryRequest,
    ) -> ApiResult<Vec<TransactionRecord>> {
        self.get_query(ctx, "v2/payments/payments", request).await
    }

    /// Looks up authorized or voided payments.
    ///
    /// `GET v2/payments/authorizations`
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn inquire_authorization(
        &self,
        ctx: &CallContext,
        request: &InquiryRequest,
    ) -> ApiResult<Vec<TransactionRecord>> {
        self.get_query(ctx, "v2/payments/authorizations", request)
            .await
    }

    /// Voids an authorized payment.
    ///
    /// `POST v2/payments/authorizations/{transactionId}/void`
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn void_authorization(
        &self,
        ctx: &CallContext,
        transaction_id: i64,
    ) -> ApiResult<serde_json::Value> {
        let path = format!("v2/payments/authorizations/{transaction_id}/void");
        self.post_json(ctx, &path, &EmptyBody {}).await
    }

    /// Charges a registration key.
    ///
    /// `POST v2/payments/preapprovedPay/{regKey}/payment`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`](crate::Error::Encoding) if `reg_key` is not
    /// URL-safe; otherwise see [`Client::send`].
    pub async fn confirm_preapproved_pay(
        &self,
        ctx: &CallContext,
        reg_key: &str,
        request: &PreapprovedPaymentRequest,
    ) -> ApiResult<PreapprovedPaymentInfo> {
        let path = format!("v2/payments/preapprovedPay/{}/payment", segment(reg_key)?);
        self.post_json(ctx, &path, request).await
    }

    /// Checks whether a registration key can still be charged.
    ///
    /// `GET v2/payments/preapprovedPay/{regKey}/check`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`](crate::Error::Encoding) if `reg_key` is not
    /// URL-safe; otherwise see [`Client::send`].
    pub async fn check_preapproved_pay(
        &self,
        ctx: &CallContext,
        reg_key: &str,
        request: &CheckRegKeyRequest,
    ) -> ApiResult<serde_json::Value> {
        let path = format!("v2/payments/preapprovedPay/{}/check", segment(reg_key)?);
        self.get_query(ctx, &path, request).await
    }

    /// Expires a registration key.
    ///
    /// `POST v2/payments/preapprovedPay/{regKey}/expire`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`](crate::Error::Encoding) if `reg_key` is not
    /// URL-safe; otherwise see [`Client::send`].
    pub async fn expire_preapproved_pay(
        &self,
        ctx: &CallContext,
        reg_key: &str,
    ) -> ApiResult<serde_json::Value> {
        let path = format!("v2/payments/preapprovedPay/{}/expire", segment(reg_key)?);
        self.post_json(ctx, &path, &EmptyBody {}).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::test_support::legacy_client_for;
    use crate::constants::{AUTHORIZATION_HEADER, CHANNEL_ID_HEADER, CHANNEL_SECRET_HEADER};

    fn ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"returnCode": "0000"}))
    }

    #[tokio::test]
    async fn test_reserve_sends_channel_secret() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/payments/request"))
            .and(header(CHANNEL_ID_HEADER, "testid"))
            .and(header(CHANNEL_SECRET_HEADER, "testsecret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "returnCode": "0000",
                "info": {
                    "transactionId": 5,
                    "paymentUrl": {"web": "https://web-pay.example/5"},
                    "paymentAccessToken": "token"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = legacy_client_for(&server);
        let request = ReserveRequest {
            product_name: "pen".into(),
            amount: 100,
            currency: "JPY".into(),
            confirm_url: "https://shop.example/confirm".into(),
            order_id: "order-3".into(),
            ..ReserveRequest::default()
        };
        let info = client
            .reserve(&CallContext::new(), &request)
            .await
            .unwrap()
            .into_data()
            .info
            .unwrap();
        assert_eq!(info.transaction_id, 5);
        assert_eq!(info.payment_url.app, "");

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get(AUTHORIZATION_HEADER).is_none());
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&requests[0].body).unwrap(),
            json!({
                "productName": "pen",
                "amount": 100,
                "currency": "JPY",
                "confirmUrl": "https://shop.example/confirm",
                "orderId": "order-3"
            })
        );
    }

    #[tokio::test]
    async fn test_inquiries_omit_empty_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/payments/payments"))
            .and(query_param("orderId", "order-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "returnCode": "0000",
                "info": [{"transactionId": 5, "orderId": "order-3"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/payments/authorizations"))
            .and(query_param("transactionId", "5"))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;

        let client = legacy_client_for(&server);
        let ctx = CallContext::new();
        let records = client
            .inquire_payment(
                &ctx,
                &InquiryRequest {
                    order_id: "order-3".into(),
                    ..InquiryRequest::default()
                },
            )
            .await
            .unwrap()
            .into_data()
            .info
            .unwrap();
        assert_eq!(records[0].order_id, "order-3");

        client
            .inquire_authorization(
                &ctx,
                &InquiryRequest {
                    transaction_id: 5,
                    ..InquiryRequest::default()
                },
            )
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), Some("orderId=order-3"));
        assert_eq!(requests[1].url.query(), Some("transactionId=5"));
    }

    #[tokio::test]
    async fn test_transaction_and_reg_key_paths() {
        let server = MockServer::start().await;
        for (verb, target) in [
            ("POST", "/v2/payments/5/refund"),
            ("POST", "/v2/payments/authorizations/5/void"),
            ("POST", "/v2/payments/preapprovedPay/RK2/payment"),
            ("GET", "/v2/payments/preapprovedPay/RK2/check"),
            ("POST", "/v2/payments/preapprovedPay/RK2/expire"),
        ] {
            Mock::given(method(verb))
                .and(path(target))
                .respond_with(ok())
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = legacy_client_for(&server);
        let ctx = CallContext::new();
        client
            .refund_v2(
                &ctx,
                5,
                &RefundRequest {
                    refund_amount: Some(40),
                },
            )
            .await
            .unwrap();
        client.void_authorization(&ctx, 5).await.unwrap();
        client
            .confirm_preapproved_pay(&ctx, "RK2", &PreapprovedPaymentRequest::default())
            .await
            .unwrap();
        client
            .check_preapproved_pay(
                &ctx,
                "RK2",
                &CheckRegKeyRequest {
                    credit_card_auth: true,
                },
            )
            .await
            .unwrap();
        client.expire_preapproved_pay(&ctx, "RK2").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].body, br#"{"refundAmount":40}"#);
        assert_eq!(requests[3].url.query(), Some("creditCardAuth=true"));
    }
}
