//! Command-line arguments and command execution.

use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use linepay::api::payments::{
    AmountRequest, Package, PaymentDetailsRequest, PaymentOption, PaymentOptions, PaymentRequest,
    Product, RedirectUrls, RefundRequest,
};
use linepay::api::preapproved::{CheckRegKeyRequest, PreapprovedPaymentRequest};
use linepay::config::{AUTH_SCHEME_ENV, CHANNEL_ID_ENV, CHANNEL_SECRET_ENV, ENDPOINT_BASE_ENV};
use linepay::constants::API_ENDPOINT_BASE_SANDBOX;
use linepay::{CallContext, Client, ClientConfig, Envelope, Method, Payload};
use serde::Serialize;

use crate::error::CliError;

/// Command-line client for the LINE Pay API.
#[derive(Debug, Parser)]
#[command(name = "linepay", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Credentials and endpoint selection, shared by every command.
#[derive(Args)]
pub struct ConnectionArgs {
    /// Merchant channel identity
    #[arg(long, global = true, env = CHANNEL_ID_ENV)]
    pub channel_id: Option<String>,

    /// Channel secret
    #[arg(long, global = true, env = CHANNEL_SECRET_ENV, hide_env_values = true)]
    pub channel_secret: Option<String>,

    /// Endpoint base URL (default: production)
    #[arg(long, global = true, env = ENDPOINT_BASE_ENV)]
    pub endpoint_base: Option<String>,

    /// Use the sandbox endpoint; overrides --endpoint-base
    #[arg(long, global = true)]
    pub sandbox: bool,

    /// Authentication scheme: signature or channel-secret
    #[arg(long, global = true, env = AUTH_SCHEME_ENV)]
    pub auth_scheme: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout: u64,
}

impl fmt::Debug for ConnectionArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionArgs")
            .field("channel_id", &self.channel_id)
            .field(
                "channel_secret",
                &self.channel_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("endpoint_base", &self.endpoint_base)
            .field("sandbox", &self.sandbox)
            .field("auth_scheme", &self.auth_scheme)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ConnectionArgs {
    /// Resolves the client configuration from the flags.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a credential is missing or the auth
    /// scheme is unknown.
    pub fn config(&self) -> Result<ClientConfig, linepay::Error> {
        let mut config = ClientConfig::from_lookup(|name| match name {
            CHANNEL_ID_ENV => self.channel_id.clone(),
            CHANNEL_SECRET_ENV => self.channel_secret.clone(),
            ENDPOINT_BASE_ENV => self.endpoint_base.clone(),
            AUTH_SCHEME_ENV => self.auth_scheme.clone(),
            _ => None,
        })?;
        if self.sandbox {
            config.endpoint_base = Some(API_ENDPOINT_BASE_SANDBOX.to_owned());
        }
        Ok(config)
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// LINE Pay operations.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Request a payment and print the payment URL
    Request(RequestArgs),

    /// Confirm a payment the user has approved
    Confirm {
        /// Transaction identifier
        transaction_id: i64,
        #[command(flatten)]
        amount: AmountArgs,
    },

    /// Capture an authorized payment
    Capture {
        /// Transaction identifier
        transaction_id: i64,
        #[command(flatten)]
        amount: AmountArgs,
    },

    /// Void an authorized payment
    Void {
        /// Transaction identifier
        transaction_id: i64,
    },

    /// Refund a captured payment
    Refund {
        /// Transaction identifier
        transaction_id: i64,

        /// Amount to refund (default: full amount)
        #[arg(long)]
        amount: Option<i64>,
    },

    /// Look up transactions
    Details {
        /// Transaction identifier (repeatable)
        #[arg(long = "transaction-id")]
        transaction_ids: Vec<i64>,

        /// Order identifier (repeatable)
        #[arg(long = "order-id")]
        order_ids: Vec<String>,

        /// TRANSACTION or ORDER (default: both)
        #[arg(long, default_value = "")]
        fields: String,
    },

    /// Check whether the user has approved a payment
    Status {
        /// Transaction identifier
        transaction_id: i64,
    },

    /// Check whether a registration key can be charged
    CheckRegKey {
        /// Registration key
        reg_key: String,

        /// Also authorize the card
        #[arg(long)]
        credit_card_auth: bool,
    },

    /// Expire a registration key
    ExpireRegKey {
        /// Registration key
        reg_key: String,
    },

    /// Charge a registration key
    PayPreapproved {
        /// Registration key
        reg_key: String,

        /// Product name
        #[arg(long)]
        product_name: String,

        /// Merchant order identifier
        #[arg(long)]
        order_id: String,

        #[command(flatten)]
        amount: AmountArgs,

        /// Leave the payment authorized until captured
        #[arg(long)]
        no_capture: bool,
    },

    /// GET a path and copy the raw response body to stdout
    Raw {
        /// Path relative to the endpoint base
        path: String,
    },
}

/// Amount and currency of a payment.
#[derive(Debug, Args)]
pub struct AmountArgs {
    /// Amount
    #[arg(long)]
    pub amount: i64,

    /// ISO 4217 currency code
    #[arg(long, default_value = "JPY")]
    pub currency: String,
}

impl From<AmountArgs> for AmountRequest {
    fn from(args: AmountArgs) -> Self {
        Self::new(args.amount, args.currency)
    }
}

/// Arguments of `request`: one package holding one product.
#[derive(Debug, Args)]
pub struct RequestArgs {
    /// Merchant order identifier
    #[arg(long)]
    pub order_id: String,

    /// Product name
    #[arg(long)]
    pub product_name: String,

    #[command(flatten)]
    pub amount: AmountArgs,

    /// Where the user goes after approving
    #[arg(long)]
    pub confirm_url: String,

    /// Where the user goes after cancelling
    #[arg(long)]
    pub cancel_url: String,

    /// Leave the payment authorized until captured
    #[arg(long)]
    pub no_capture: bool,
}

impl From<RequestArgs> for PaymentRequest {
    fn from(args: RequestArgs) -> Self {
        let amount = args.amount.amount;
        Self {
            amount,
            currency: args.amount.currency,
            order_id: args.order_id.clone(),
            packages: vec![Package {
                id: args.order_id,
                amount,
                name: args.product_name.clone(),
                products: vec![Product {
                    name: args.product_name,
                    quantity: 1,
                    price: amount,
                    ..Product::default()
                }],
                ..Package::default()
            }],
            redirect_urls: RedirectUrls {
                confirm_url: args.confirm_url,
                cancel_url: args.cancel_url,
                ..RedirectUrls::default()
            },
            options: args.no_capture.then(|| PaymentOptions {
                payment: Some(PaymentOption {
                    capture: Some(false),
                    pay_type: None,
                }),
                ..PaymentOptions::default()
            }),
        }
    }
}

impl Command {
    /// Runs the command and prints its result to stdout.
    ///
    /// # Errors
    ///
    /// Returns the API error, or an output error if stdout is closed.
    pub async fn run(self, client: &Client, ctx: &CallContext) -> Result<(), CliError> {
        match self {
            Self::Request(args) => {
                let response = client.request_payment(ctx, &args.into()).await?;
                print_envelope(&response.data)
            }
            Self::Confirm {
                transaction_id,
                amount,
            } => {
                let response = client
                    .confirm_payment(ctx, transaction_id, &amount.into())
                    .await?;
                print_envelope(&response.data)
            }
            Self::Capture {
                transaction_id,
                amount,
            } => {
                let response = client
                    .capture_payment(ctx, transaction_id, &amount.into())
                    .await?;
                print_envelope(&response.data)
            }
            Self::Void { transaction_id } => {
                let response = client.void_payment(ctx, transaction_id).await?;
                print_envelope(&response.data)
            }
            Self::Refund {
                transaction_id,
                amount,
            } => {
                let request = RefundRequest {
                    refund_amount: amount,
                };
                let response = client
                    .refund_payment(ctx, transaction_id, &request)
                    .await?;
                print_envelope(&response.data)
            }
            Self::Details {
                transaction_ids,
                order_ids,
                fields,
            } => {
                let request = PaymentDetailsRequest {
                    transaction_id: transaction_ids,
                    order_id: order_ids,
                    fields,
                };
                let response = client.payment_details(ctx, &request).await?;
                print_envelope(&response.data)
            }
            Self::Status { transaction_id } => {
                let response = client.check_payment_status(ctx, transaction_id).await?;
                print_envelope(&response.data)
            }
            Self::CheckRegKey {
                reg_key,
                credit_card_auth,
            } => {
                let request = CheckRegKeyRequest { credit_card_auth };
                let response = client.check_reg_key(ctx, &reg_key, &request).await?;
                print_envelope(&response.data)
            }
            Self::ExpireRegKey { reg_key } => {
                let response = client.expire_reg_key(ctx, &reg_key).await?;
                print_envelope(&response.data)
            }
            Self::PayPreapproved {
                reg_key,
                product_name,
                order_id,
                amount,
                no_capture,
            } => {
                let request = PreapprovedPaymentRequest {
                    product_name,
                    amount: amount.amount,
                    currency: amount.currency,
                    order_id,
                    capture: no_capture.then_some(false),
                };
                let response = client.pay_preapproved(ctx, &reg_key, &request).await?;
                print_envelope(&response.data)
            }
            Self::Raw { path } => {
                let request = client.new_request(Method::Get, &path, Payload::None)?;
                let mut stdout = io::stdout();
                let raw = client.send_to(ctx, request, &mut stdout).await?;
                writeln!(stdout)?;
                tracing::info!(status = raw.status.as_u16(), "Raw response copied");
                Ok(())
            }
        }
    }
}

fn print_envelope<I: Serialize>(envelope: &Envelope<I>) -> Result<(), CliError> {
    if envelope.is_success() {
        tracing::info!(return_code = %envelope.return_code, "LINE Pay call succeeded");
    } else {
        tracing::warn!(
            return_code = %envelope.return_code,
            return_message = %envelope.return_message,
            "LINE Pay returned a business error"
        );
    }
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, envelope)?;
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use linepay::AuthScheme;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_flags_build_config() {
        let cli = parse(&[
            "linepay",
            "--channel-id",
            "testid",
            "--channel-secret",
            "testsecret",
            "--auth-scheme",
            "channel-secret",
            "--sandbox",
            "status",
            "42",
        ]);
        let config = cli.connection.config().unwrap();
        assert_eq!(config.channel_id, "testid");
        assert_eq!(config.auth_scheme, AuthScheme::ChannelSecret);
        assert_eq!(
            config.endpoint_base.as_deref(),
            Some(API_ENDPOINT_BASE_SANDBOX)
        );
        assert!(matches!(cli.command, Command::Status { transaction_id: 42 }));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let cli = parse(&[
            "linepay",
            "--channel-id",
            "testid",
            "--channel-secret",
            "testsecret",
            "status",
            "42",
        ]);
        let debug = format!("{cli:?}");
        assert!(debug.contains("testid"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("testsecret"));
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let connection = ConnectionArgs {
            channel_id: Some("testid".into()),
            channel_secret: None,
            endpoint_base: None,
            sandbox: false,
            auth_scheme: None,
            timeout: 30,
        };
        let err = connection.config().unwrap_err();
        assert_eq!(err.kind(), linepay::ErrorKind::Validation);
    }

    #[test]
    fn test_request_args_build_single_package() {
        let cli = parse(&[
            "linepay",
            "request",
            "--order-id",
            "order-1",
            "--product-name",
            "pen",
            "--amount",
            "100",
            "--confirm-url",
            "https://shop.example/confirm",
            "--cancel-url",
            "https://shop.example/cancel",
        ]);
        let Command::Request(args) = cli.command else {
            panic!("expected request command");
        };
        let request = PaymentRequest::from(args);
        assert_eq!(request.currency, "JPY");
        assert_eq!(request.packages[0].amount, 100);
        assert_eq!(request.packages[0].products[0].price, 100);
        assert!(request.options.is_none());
    }

    #[test]
    fn test_details_repeats_ids() {
        let cli = parse(&[
            "linepay",
            "details",
            "--transaction-id",
            "1",
            "--transaction-id",
            "2",
        ]);
        let Command::Details {
            transaction_ids, ..
        } = cli.command
        else {
            panic!("expected details command");
        };
        assert_eq!(transaction_ids, vec![1, 2]);
    }
}
