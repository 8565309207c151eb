//! Braintree gateway over the Braintree GraphQL API.
//!
//! Authenticates with the merchant's public/private key pair (HTTP basic
//! auth). Card declines and validation failures come back as
//! [`SaleResult`]s with `success == false`; only transport and
//! authentication problems become [`PaymentError`]s.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, instrument, warn};

use super::{PaymentError, PaymentGateway, PaymentResult, SaleRequest, SaleResult, Transaction};

/// GraphQL API version pinned by this client.
const BRAINTREE_VERSION: &str = "2019-01-01";

/// Outbound request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Transaction statuses that mean the money did not move.
const FAILED_STATUSES: &[&str] = &[
    "FAILED",
    "GATEWAY_REJECTED",
    "PROCESSOR_DECLINED",
    "SETTLEMENT_DECLINED",
    "VOIDED",
];

const CLIENT_TOKEN_MUTATION: &str = r#"
mutation CreateClientToken($input: CreateClientTokenInput) {
  createClientToken(input: $input) {
    clientToken
  }
}"#;

const CHARGE_MUTATION: &str = r#"
mutation ChargePaymentMethod($input: ChargePaymentMethodInput!) {
  chargePaymentMethod(input: $input) {
    transaction { id status amount { value } }
  }
}"#;

const AUTHORIZE_MUTATION: &str = r#"
mutation AuthorizePaymentMethod($input: AuthorizePaymentMethodInput!) {
  authorizePaymentMethod(input: $input) {
    transaction { id status amount { value } }
  }
}"#;

/// Braintree environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BraintreeEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl BraintreeEnvironment {
    /// GraphQL endpoint for this environment.
    #[must_use]
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://payments.sandbox.braintree-api.com/graphql",
            Self::Production => "https://payments.braintree-api.com/graphql",
        }
    }
}

impl FromStr for BraintreeEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "Unknown Braintree environment '{other}' (expected sandbox or production)"
            )),
        }
    }
}

/// Merchant credentials.
#[derive(Clone)]
pub struct BraintreeConfig {
    pub environment: BraintreeEnvironment,
    pub merchant_id: String,
    pub public_key: String,
    pub private_key: SecretString,
}

impl std::fmt::Debug for BraintreeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BraintreeConfig")
            .field("environment", &self.environment)
            .field("merchant_id", &self.merchant_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Braintree GraphQL client.
#[derive(Clone)]
pub struct BraintreeGateway {
    client: Client,
    endpoint: String,
    config: BraintreeConfig,
}

impl std::fmt::Debug for BraintreeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BraintreeGateway")
            .field("endpoint", &self.endpoint)
            .field("merchant_id", &self.config.merchant_id)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default)]
    extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlErrorExtensions {
    error_class: Option<String>,
}

impl GraphQlError {
    fn is_validation(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|e| e.error_class.as_deref())
            == Some("VALIDATION")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientTokenData {
    create_client_token: Option<ClientTokenPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientTokenPayload {
    client_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionData {
    charge_payment_method: Option<TransactionPayload>,
    authorize_payment_method: Option<TransactionPayload>,
}

#[derive(Deserialize)]
struct TransactionPayload {
    transaction: Option<GraphQlTransaction>,
}

#[derive(Deserialize)]
struct GraphQlTransaction {
    id: String,
    status: String,
    amount: Money,
}

#[derive(Deserialize)]
struct Money {
    value: String,
}

impl From<GraphQlTransaction> for Transaction {
    fn from(tx: GraphQlTransaction) -> Self {
        Self {
            id: tx.id,
            status: tx.status,
            amount: tx.amount.value,
        }
    }
}

fn joined_messages(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl BraintreeGateway {
    /// Create a client for the configured environment.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: BraintreeConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.environment.endpoint().to_string(),
            config,
        })
    }

    /// Point the client at another endpoint (local stubs).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// GraphQL endpoint in use.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> PaymentResult<GraphQlResponse<T>> {
        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(
                &self.config.public_key,
                Some(self.config.private_key.expose_secret()),
            )
            .header("Braintree-Version", BRAINTREE_VERSION)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Braintree request rejected");
            return Err(PaymentError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<GraphQlResponse<T>>()
            .await
            .map_err(|e| PaymentError::Response(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for BraintreeGateway {
    fn name(&self) -> &str {
        "braintree"
    }

    #[instrument(skip(self))]
    async fn generate_client_token(&self) -> PaymentResult<String> {
        let response: GraphQlResponse<ClientTokenData> = self
            .execute(
                CLIENT_TOKEN_MUTATION,
                json!({ "input": { "merchantAccountId": null } }),
            )
            .await?;

        if !response.errors.is_empty() {
            let message = joined_messages(&response.errors);
            error!(error = %message, "Braintree client token request failed");
            return Err(PaymentError::Gateway(message));
        }

        let token = response
            .data
            .and_then(|d| d.create_client_token)
            .map(|p| p.client_token)
            .ok_or_else(|| PaymentError::Response("missing clientToken".to_string()))?;

        debug!("Braintree client token issued");
        Ok(token)
    }

    #[instrument(skip(self, request), fields(amount = %request.formatted_amount()))]
    async fn sale(&self, request: SaleRequest) -> PaymentResult<SaleResult> {
        let mutation = if request.submit_for_settlement {
            CHARGE_MUTATION
        } else {
            AUTHORIZE_MUTATION
        };

        let variables = json!({
            "input": {
                "paymentMethodId": request.payment_method_nonce,
                "transaction": { "amount": request.formatted_amount() }
            }
        });

        let response: GraphQlResponse<TransactionData> = self.execute(mutation, variables).await?;

        let transaction: Option<Transaction> = response
            .data
            .and_then(|d| d.charge_payment_method.or(d.authorize_payment_method))
            .and_then(|p| p.transaction)
            .map(Transaction::from);

        if !response.errors.is_empty() {
            let message = joined_messages(&response.errors);
            if response.errors.iter().all(GraphQlError::is_validation) {
                warn!(error = %message, "Braintree declined sale");
                return Ok(SaleResult::declined(message, transaction));
            }
            error!(error = %message, "Braintree sale failed");
            return Err(PaymentError::Gateway(message));
        }

        match transaction {
            Some(tx) if FAILED_STATUSES.contains(&tx.status.as_str()) => {
                warn!(status = %tx.status, transaction_id = %tx.id, "Braintree transaction not settled");
                let message = format!("Transaction {}", tx.status.to_lowercase().replace('_', " "));
                Ok(SaleResult::declined(message, Some(tx)))
            }
            Some(tx) => {
                debug!(transaction_id = %tx.id, status = %tx.status, "Braintree sale approved");
                Ok(SaleResult::approved(tx))
            }
            None => Err(PaymentError::Response("missing transaction".to_string())),
        }
    }
}
