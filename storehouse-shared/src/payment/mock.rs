/// In-memory payment gateway
///
/// Approves every sale unless told to decline or fail. Sales are recorded so
/// tests can assert on the amount that was charged.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use super::{PaymentError, PaymentGateway, PaymentResult, SaleRequest, SaleResult, Transaction};

/// Gateway double for tests and offline development
#[derive(Debug, Clone)]
pub struct MockGateway {
    client_token: String,
    decline_message: Option<String>,
    fail: bool,
    sales: Arc<Mutex<Vec<SaleRequest>>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            client_token: "mock-client-token".to_string(),
            decline_message: None,
            fail: false,
            sales: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Token returned by `generate_client_token`
    pub fn with_client_token(mut self, token: impl Into<String>) -> Self {
        self.client_token = token.into();
        self
    }

    /// Decline every sale with `message`
    pub fn declining(mut self, message: impl Into<String>) -> Self {
        self.decline_message = Some(message.into());
        self
    }

    /// Fail every call as if the gateway were unreachable
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Sales submitted so far, oldest first
    pub fn sales(&self) -> Vec<SaleRequest> {
        self.sales
            .lock()
            .map(|sales| sales.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_client_token(&self) -> PaymentResult<String> {
        if self.fail {
            return Err(PaymentError::Request("mock gateway unavailable".to_string()));
        }
        Ok(self.client_token.clone())
    }

    async fn sale(&self, request: SaleRequest) -> PaymentResult<SaleResult> {
        if self.fail {
            return Err(PaymentError::Request("mock gateway unavailable".to_string()));
        }

        let transaction = Transaction {
            id: Uuid::new_v4().simple().to_string(),
            status: if self.decline_message.is_some() {
                "PROCESSOR_DECLINED".to_string()
            } else if request.submit_for_settlement {
                "SUBMITTED_FOR_SETTLEMENT".to_string()
            } else {
                "AUTHORIZED".to_string()
            },
            amount: request.formatted_amount(),
        };

        if let Ok(mut sales) = self.sales.lock() {
            sales.push(request);
        }

        Ok(match &self.decline_message {
            Some(message) => SaleResult::declined(message.clone(), Some(transaction)),
            None => SaleResult::approved(transaction),
        })
    }
}
