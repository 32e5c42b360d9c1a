//! Glue between the engine's [`PaymentGateway`] trait and the Chapa HTTP client.

use chapa_client::{parse_gateway_amount, ChapaApi, ChapaApiError, ChapaConfig, Customization, InitializePayload};
use log::*;
use storefront_common::Birr;
use storefront_engine::{
    db_types::TxRef,
    traits::{GatewayError, InitializeCheckout, PaymentGateway, PaymentStatus, VerifiedPayment},
};

#[derive(Clone)]
pub struct ChapaGateway {
    api: ChapaApi,
}

impl ChapaGateway {
    pub fn new(config: ChapaConfig) -> Result<Self, GatewayError> {
        let api = ChapaApi::new(config).map_err(|e| GatewayError::Rejected(e.to_string()))?;
        Ok(Self { api })
    }
}

impl PaymentGateway for ChapaGateway {
    async fn initialize(&self, request: InitializeCheckout) -> Result<String, GatewayError> {
        let payload = InitializePayload {
            amount: request.amount.to_gateway_amount(),
            currency: request.currency,
            email: request.customer.email,
            first_name: request.customer.first_name,
            last_name: request.customer.last_name,
            tx_ref: request.tx_ref.as_str().to_string(),
            callback_url: request.callback_url,
            return_url: request.return_url,
            customization: Customization { title: request.title, description: request.description },
        };
        let response = self.api.initialize_transaction(payload).await.map_err(to_gateway_error)?;
        if !response.is_success() {
            return Err(GatewayError::Rejected(
                response.message.unwrap_or_else(|| "No reason given".to_string()),
            ));
        }
        let data = response
            .data
            .ok_or_else(|| GatewayError::InvalidResponse("Initialize response carried no data".to_string()))?;
        if data.checkout_url.is_empty() {
            return Err(GatewayError::InvalidResponse("Failed to generate checkout URL.".to_string()));
        }
        Ok(data.checkout_url)
    }

    async fn verify(&self, tx_ref: &TxRef) -> Result<VerifiedPayment, GatewayError> {
        let response = self.api.verify_transaction(tx_ref.as_str()).await.map_err(to_gateway_error)?;
        if !response.is_success() {
            debug!("Gateway verification of {tx_ref} returned status '{}'", response.status);
            let status = if response.status == "pending" { PaymentStatus::Pending } else { PaymentStatus::Failed };
            return Ok(VerifiedPayment { status, amount: Birr::from_cents(0), customer_email: None });
        }
        let data = response
            .data
            .ok_or_else(|| GatewayError::InvalidResponse("Verify response carried no data".to_string()))?;
        let amount =
            parse_gateway_amount(&data.amount).map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let customer_email = data.customer.and_then(|c| c.email);
        Ok(VerifiedPayment { status: PaymentStatus::Success, amount, customer_email })
    }
}

fn to_gateway_error(e: ChapaApiError) -> GatewayError {
    match e {
        ChapaApiError::RequestError(msg) => GatewayError::Unavailable(msg),
        ChapaApiError::QueryError { status, message } if status >= 500 => {
            GatewayError::Unavailable(format!("Gateway answered {status}: {message}"))
        },
        ChapaApiError::QueryError { status, message } => {
            GatewayError::Rejected(format!("Gateway answered {status}: {message}"))
        },
        ChapaApiError::JsonError(msg) | ChapaApiError::InvalidCurrencyAmount(msg) => {
            GatewayError::InvalidResponse(msg)
        },
        ChapaApiError::Initialization(msg) | ChapaApiError::TransactionError(msg) => GatewayError::Rejected(msg),
    }
}
