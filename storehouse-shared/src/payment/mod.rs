/// Payment processing
///
/// Checkout talks to a [`PaymentGateway`]: it hands the browser a client
/// token for the drop-in UI, then charges the nonce the UI returns.
///
/// # Modules
///
/// - [`cart`]: Validation of the cart submitted with a payment
/// - [`braintree`]: Braintree GraphQL gateway
/// - [`mock`]: In-memory gateway for tests and local development
///
/// # Example
///
/// ```no_run
/// use storehouse_shared::payment::{mock::MockGateway, PaymentGateway, SaleRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = MockGateway::new();
/// let token = gateway.generate_client_token().await?;
///
/// let result = gateway
///     .sale(SaleRequest::new(25.0, "fake-valid-nonce"))
///     .await?;
/// assert!(result.success);
/// # Ok(())
/// # }
/// ```

pub mod braintree;
pub mod cart;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use braintree::{BraintreeConfig, BraintreeEnvironment, BraintreeGateway};
pub use cart::{validate_cart, CartError, CartItem};
pub use mock::MockGateway;

/// Gateway failure that prevented a decision on the payment
///
/// A declined card is not an error; it is a [`SaleResult`] with
/// `success == false`.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Request never completed
    #[error("Gateway request failed: {0}")]
    Request(String),

    /// Gateway answered with a non-success HTTP status
    #[error("Gateway returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body could not be understood
    #[error("Unexpected gateway response: {0}")]
    Response(String),

    /// Gateway reported an error that is not a decline
    #[error("Gateway error: {0}")]
    Gateway(String),
}

/// Result type alias for gateway operations
pub type PaymentResult<T> = Result<T, PaymentError>;

/// A sale to submit to the gateway
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRequest {
    /// Amount in the merchant account's currency
    pub amount: f64,

    /// Single-use payment method nonce from the client
    pub payment_method_nonce: String,

    /// Capture immediately instead of only authorizing
    pub submit_for_settlement: bool,
}

impl SaleRequest {
    /// Sale that is submitted for settlement
    pub fn new(amount: f64, nonce: impl Into<String>) -> Self {
        Self {
            amount,
            payment_method_nonce: nonce.into(),
            submit_for_settlement: true,
        }
    }

    /// Amount formatted the way gateways expect it (`"12.50"`)
    pub fn formatted_amount(&self) -> String {
        format!("{:.2}", self.amount)
    }
}

/// Transaction details reported by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub status: String,
    pub amount: String,
}

/// Outcome of a sale
///
/// Stored verbatim on the order as its payment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleResult {
    /// Whether the payment went through
    pub success: bool,

    /// Decline or validation message when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
}

impl SaleResult {
    /// Successful sale
    pub fn approved(transaction: Transaction) -> Self {
        Self {
            success: true,
            message: None,
            transaction: Some(transaction),
        }
    }

    /// Declined sale
    pub fn declined(message: impl Into<String>, transaction: Option<Transaction>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            transaction,
        }
    }
}

/// Payment gateway contract
///
/// Implementations must be cheap to share across requests (`Arc<dyn PaymentGateway>`).
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Gateway name for logs
    fn name(&self) -> &str;

    /// Issues a client token for the browser drop-in UI
    async fn generate_client_token(&self) -> PaymentResult<String>;

    /// Charges a payment method nonce
    async fn sale(&self, request: SaleRequest) -> PaymentResult<SaleResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_amount() {
        assert_eq!(SaleRequest::new(10.0, "n").formatted_amount(), "10.00");
        assert_eq!(SaleRequest::new(0.0, "n").formatted_amount(), "0.00");
        assert_eq!(SaleRequest::new(19.999, "n").formatted_amount(), "20.00");
        assert_eq!(SaleRequest::new(3.5, "n").formatted_amount(), "3.50");
    }

    #[test]
    fn test_sale_request_settles_by_default() {
        let request = SaleRequest::new(1.0, "nonce");
        assert!(request.submit_for_settlement);
        assert_eq!(request.payment_method_nonce, "nonce");
    }

    #[test]
    fn test_sale_result_serialization() {
        let approved = SaleResult::approved(Transaction {
            id: "tx1".to_string(),
            status: "SUBMITTED_FOR_SETTLEMENT".to_string(),
            amount: "10.00".to_string(),
        });
        let json = serde_json::to_value(&approved).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("message").is_none());
        assert_eq!(json["transaction"]["id"], "tx1");

        let declined = SaleResult::declined("Do Not Honor", None);
        let json = serde_json::to_value(&declined).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Do Not Honor");
        assert!(json.get("transaction").is_none());
    }
}
