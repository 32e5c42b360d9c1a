use crate::{
    db_types::TxRef,
    traits::{GatewayError, InitializeCheckout, VerifiedPayment},
};

/// The external payment gateway.
///
/// Both operations are blocking network I/O and must run outside any database transaction; the settlement
/// transaction only begins after verification has succeeded.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Clone {
    /// Opens a hosted payment session and returns the gateway's checkout URL.
    async fn initialize(&self, request: InitializeCheckout) -> Result<String, GatewayError>;

    /// Verifies a transaction by reference. Webhook deliveries carry no trusted data; this call is the only source
    /// of truth about a payment's status and amount.
    async fn verify(&self, tx_ref: &TxRef) -> Result<VerifiedPayment, GatewayError>;
}
