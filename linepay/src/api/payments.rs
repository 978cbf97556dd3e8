//! v3 online payment endpoints.
//!
//! The usual flow is [`Client::request_payment`], a user approval on the
//! returned payment URL, then [`Client::confirm_payment`]. Payments requested
//! with `capture: false` stay authorized until [`Client::capture_payment`]
//! or [`Client::void_payment`].

use serde::{Deserialize, Serialize};

use super::ApiResult;
use super::types::{EmptyBody, PayInfo, PaymentRequestInfo, RefundInfo, TransactionRecord};
use crate::client::Client;
use crate::context::CallContext;
use crate::query::{QueryParams, QueryWriter};

/// Body of [`Client::request_payment`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Total amount; must equal the sum of the package amounts.
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Merchant order identifier.
    pub order_id: String,
    /// Ordered packages.
    pub packages: Vec<Package>,
    /// Where the user returns to after approval or cancellation.
    pub redirect_urls: RedirectUrls,
    /// Optional behavior.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<PaymentOptions>,
}

/// A group of products in a payment request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Package identifier.
    pub id: String,
    /// Package amount; must equal the sum of product prices times quantities.
    pub amount: i64,
    /// Fee charged to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_fee: Option<i64>,
    /// Package name.
    pub name: String,
    /// Products in the package.
    pub products: Vec<Product>,
}

/// A product in a [`Package`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Product name.
    pub name: String,
    /// Product image shown on the payment page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Quantity.
    pub quantity: i64,
    /// Unit price.
    pub price: i64,
    /// Price before discount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<i64>,
}

/// Redirect targets of a payment request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectUrls {
    /// Android package name, for app-to-app payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_package_name: Option<String>,
    /// Where the user goes after approving the payment.
    pub confirm_url: String,
    /// `CLIENT` (default) or `SERVER`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_url_type: Option<String>,
    /// Where the user goes after cancelling the payment.
    pub cancel_url: String,
}

/// Options of a payment request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOptions {
    /// Capture and pay type options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentOption>,
    /// Payment page options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayOption>,
    /// Shipping options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingOption>,
    /// Extra options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<ExtrasOption>,
}

/// Payment behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOption {
    /// `false` separates authorization from capture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<bool>,
    /// `NORMAL` or `PREAPPROVED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_type: Option<String>,
}

/// Payment page behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOption {
    /// Page language, e.g. `ja` or `en`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Whether to check the browser used for the confirm URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_confirm_url_browser: Option<bool>,
}

/// Shipping behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOption {
    /// `NO_SHIPPING`, `FIXED_ADDRESS` or `SHIPPING`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Merchant URL queried for shipping fees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_inquiry_url: Option<String>,
    /// `CONDITION` or `FIXED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_inquiry_type: Option<String>,
}

/// Extra options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtrasOption {
    /// Friend suggestions on the payment page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_service: Option<FamilyService>,
    /// Branch name shown to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    /// Branch identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
}

/// Friend suggestions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyService {
    /// Official accounts to suggest.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add_friends: Vec<AddFriend>,
}

/// One friend suggestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddFriend {
    /// Suggestion type, e.g. `lineAt`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Account identifiers.
    pub ids: Vec<String>,
}

/// Body of [`Client::confirm_payment`] and [`Client::capture_payment`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRequest {
    /// Amount to confirm or capture.
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
}

impl AmountRequest {
    /// Creates a request for `amount` in `currency`.
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

/// Payload of a confirmed payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfirmInfo {
    /// Merchant order identifier.
    pub order_id: String,
    /// Transaction identifier.
    pub transaction_id: i64,
    /// When the authorization expires, for `capture: false` payments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_expire_date: Option<String>,
    /// Registration key, for `PREAPPROVED` payments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg_key: Option<String>,
    /// How the payment was paid.
    pub pay_info: Vec<PayInfo>,
}

/// Payload of a captured payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureInfo {
    /// Transaction identifier.
    pub transaction_id: i64,
    /// Merchant order identifier.
    pub order_id: String,
    /// How the payment was paid.
    pub pay_info: Vec<PayInfo>,
}

/// Body of [`Client::refund_payment`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    /// Amount to refund; `None` refunds the full amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_amount: Option<i64>,
}

/// Query of [`Client::payment_details`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentDetailsRequest {
    /// Transactions to look up.
    pub transaction_id: Vec<i64>,
    /// Orders to look up.
    pub order_id: Vec<String>,
    /// `TRANSACTION`, `ORDER` or empty for both.
    pub fields: String,
}

impl QueryParams for PaymentDetailsRequest {
    fn write_query(&self, query: &mut QueryWriter) {
        query
            .append_each("transactionId", &self.transaction_id)
            .append_each("orderId", &self.order_id)
            .append_nonempty("fields", &self.fields);
    }
}

impl Client {
    /// Requests a payment and returns the payment URL for the user.
    ///
    /// `POST v3/payments/request`
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn request_payment(
        &self,
        ctx: &CallContext,
        request: &PaymentRequest,
    ) -> ApiResult<PaymentRequestInfo> {
        self.post_json(ctx, "v3/payments/request", request).await
    }

    /// Completes a payment the user has approved.
    ///
    /// `POST v3/payments/{transactionId}/confirm`
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn confirm_payment(
        &self,
        ctx: &CallContext,
        transaction_id: i64,
        request: &AmountRequest,
    ) -> ApiResult<ConfirmInfo> {
        let path = format!("v3/payments/{transaction_id}/confirm");
        self.post_json(ctx, &path, request).await
    }

    /// Captures an authorized payment.
    ///
    /// `POST v3/payments/authorizations/{transactionId}/capture`
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn capture_payment(
        &self,
        ctx: &CallContext,
        transaction_id: i64,
        request: &AmountRequest,
    ) -> ApiResult<CaptureInfo> {
        let path = format!("v3/payments/authorizations/{transaction_id}/capture");
        self.post_json(ctx, &path, request).await
    }

    /// Voids an authorized payment.
    ///
    /// `POST v3/payments/authorizations/{transactionId}/void`
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn void_payment(
        &self,
        ctx: &CallContext,
        transaction_id: i64,
    ) -> ApiResult<serde_json::Value> {
        let path = format!("v3/payments/authorizations/{transaction_id}/void");
        self.post_json(ctx, &path, &EmptyBody {}).await
    }

    /// Refunds a captured payment, fully or partially.
    ///
    /// `POST v3/payments/{transactionId}/refund`
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn refund_payment(
        &self,
        ctx: &CallContext,
        transaction_id: i64,
        request: &RefundRequest,
    ) -> ApiResult<RefundInfo> {
        let path = format!("v3/payments/{transaction_id}/refund");
        self.post_json(ctx, &path, request).await
    }

    /// Looks up transactions by transaction or order identifier.
    ///
    /// `GET v3/payments`
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn payment_details(
        &self,
        ctx: &CallContext,
        request: &PaymentDetailsRequest,
    ) -> ApiResult<Vec<TransactionRecord>> {
        self.get_query(ctx, "v3/payments", request).await
    }

    /// Checks whether the user has approved a requested payment.
    ///
    /// `GET v3/payments/requests/{transactionId}/check`
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn check_payment_status(
        &self,
        ctx: &CallContext,
        transaction_id: i64,
    ) -> ApiResult<serde_json::Value> {
        let path = format!("v3/payments/requests/{transaction_id}/check");
        self.get_query(ctx, &path, &()).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::test_support::{client_for, signed_body};

    fn sample_request() -> PaymentRequest {
        PaymentRequest {
            amount: 100,
            currency: "JPY".into(),
            order_id: "order-1".into(),
            packages: vec![Package {
                id: "pkg-1".into(),
                amount: 100,
                name: "shop".into(),
                products: vec![Product {
                    name: "pen".into(),
                    quantity: 1,
                    price: 100,
                    ..Product::default()
                }],
                ..Package::default()
            }],
            redirect_urls: RedirectUrls {
                confirm_url: "https://shop.example/confirm".into(),
                cancel_url: "https://shop.example/cancel".into(),
                ..RedirectUrls::default()
            },
            options: Some(PaymentOptions {
                payment: Some(PaymentOption {
                    capture: Some(false),
                    pay_type: None,
                }),
                ..PaymentOptions::default()
            }),
        }
    }

    #[test]
    fn test_payment_request_wire_shape() {
        let value = serde_json::to_value(sample_request()).unwrap();
        assert_eq!(
            value,
            json!({
                "amount": 100,
                "currency": "JPY",
                "orderId": "order-1",
                "packages": [{
                    "id": "pkg-1",
                    "amount": 100,
                    "name": "shop",
                    "products": [{"name": "pen", "quantity": 1, "price": 100}]
                }],
                "redirectUrls": {
                    "confirmUrl": "https://shop.example/confirm",
                    "cancelUrl": "https://shop.example/cancel"
                },
                "options": {"payment": {"capture": false}}
            })
        );
    }

    #[tokio::test]
    async fn test_request_payment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/test-api-pay/v3/payments/request"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "returnCode": "0000",
                "returnMessage": "Success.",
                "info": {
                    "transactionId": 2019049910005496810_i64,
                    "paymentUrl": {"web": "https://web-pay.example/1", "app": "line://pay/1"},
                    "paymentAccessToken": "187568751124"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .request_payment(&CallContext::new(), &sample_request())
            .await
            .unwrap();
        assert!(response.data.is_success());
        let info = response.into_data().info.unwrap();
        assert_eq!(info.transaction_id, 2_019_049_910_005_496_810);
        assert_eq!(info.payment_access_token, "187568751124");

        let body = signed_body(&server).await;
        assert_eq!(body, serde_json::to_vec(&sample_request()).unwrap());
    }

    #[tokio::test]
    async fn test_confirm_payment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/test-api-pay/v3/payments/42/confirm"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "returnCode": "0000",
                "returnMessage": "OK",
                "info": {
                    "orderId": "order-1",
                    "transactionId": 42,
                    "regKey": "RK1",
                    "payInfo": [{"method": "CREDIT_CARD", "amount": 100}]
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let info = client
            .confirm_payment(&CallContext::new(), 42, &AmountRequest::new(100, "JPY"))
            .await
            .unwrap()
            .into_data()
            .info
            .unwrap();
        assert_eq!(info.reg_key.as_deref(), Some("RK1"));
        assert_eq!(info.pay_info[0].method, "CREDIT_CARD");
        assert!(info.authorization_expire_date.is_none());

        let body = signed_body(&server).await;
        assert_eq!(body, br#"{"amount":100,"currency":"JPY"}"#);
    }

    #[tokio::test]
    async fn test_capture_void_and_refund_paths() {
        let server = MockServer::start().await;
        for target in [
            "/test-api-pay/v3/payments/authorizations/7/capture",
            "/test-api-pay/v3/payments/authorizations/7/void",
            "/test-api-pay/v3/payments/7/refund",
        ] {
            Mock::given(method("POST"))
                .and(path(target))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({"returnCode": "0000"})),
                )
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = client_for(&server);
        let ctx = CallContext::new();
        client
            .capture_payment(&ctx, 7, &AmountRequest::new(100, "JPY"))
            .await
            .unwrap();
        let void = client.void_payment(&ctx, 7).await.unwrap();
        assert!(void.data.is_success());
        client
            .refund_payment(&ctx, 7, &RefundRequest::default())
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[1].body, b"{}");
        assert_eq!(requests[2].body, b"{}");
    }

    #[tokio::test]
    async fn test_payment_details_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/test-api-pay/v3/payments"))
            .and(query_param("orderId", "order-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "returnCode": "0000",
                "info": [{"transactionId": 1, "payStatus": "AUTHORIZATION"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = PaymentDetailsRequest {
            transaction_id: vec![1, 2],
            order_id: vec!["order-1".into()],
            fields: String::new(),
        };
        let records = client
            .payment_details(&CallContext::new(), &request)
            .await
            .unwrap()
            .into_data()
            .info
            .unwrap();
        assert_eq!(records[0].pay_status, "AUTHORIZATION");

        signed_body(&server).await;
        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            requests[0].url.query(),
            Some("orderId=order-1&transactionId=1&transactionId=2")
        );
    }

    #[tokio::test]
    async fn test_check_payment_status_without_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/test-api-pay/v3/payments/requests/9/check"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "returnCode": "0110",
                "returnMessage": "Authorization completed"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .check_payment_status(&CallContext::new(), 9)
            .await
            .unwrap();
        assert_eq!(response.data.return_code, "0110");
        assert!(!response.data.is_success());

        signed_body(&server).await;
        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].url.query().is_none());
    }
}
