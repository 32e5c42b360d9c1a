use thiserror::Error;

use crate::db_types::TxRef;

//------------------------------------------   CheckoutError   -------------------------------------------------------
/// Errors arising from the checkout and settlement flow.
///
/// `GatewayUnavailable` and `SettlementConflict` are transient; callers retry them with bounded exponential backoff
/// before surfacing a failure. Everything else is returned to the caller as-is, with enough detail to display.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty.")]
    EmptyCart,
    #[error("Insufficient stock for '{product}'. Only {available} left.")]
    InsufficientStock { product: String, available: i64 },
    #[error("An order already exists for transaction reference {0}")]
    DuplicateTxRef(TxRef),
    #[error("Payment not successful. {0}")]
    PaymentNotSuccessful(String),
    #[error("No customer could be resolved for this payment.")]
    UnknownCustomer,
    #[error("The reference and the verified email resolve to different customers.")]
    CustomerMismatch,
    #[error("The payment gateway is unavailable. {0}")]
    GatewayUnavailable(String),
    #[error("The payment gateway rejected the request. {0}")]
    GatewayRejected(String),
    #[error("The settlement conflicted with a concurrent update. {0}")]
    SettlementConflict(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl CheckoutError {
    /// True for errors that are worth retrying after a short delay.
    pub fn is_transient(&self) -> bool {
        matches!(self, CheckoutError::GatewayUnavailable(_) | CheckoutError::SettlementConflict(_))
    }
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if is_busy(db.message()) => Self::SettlementConflict(db.message().to_string()),
            _ => Self::DatabaseError(e.to_string()),
        }
    }
}

fn is_busy(msg: &str) -> bool {
    msg.contains("database is locked") || msg.contains("database table is locked") || msg.contains("busy")
}

impl From<GatewayError> for CheckoutError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Unavailable(msg) => Self::GatewayUnavailable(msg),
            GatewayError::Rejected(msg) => Self::GatewayRejected(msg),
            GatewayError::InvalidResponse(msg) => Self::GatewayRejected(msg),
        }
    }
}

impl From<CartApiError> for CheckoutError {
    fn from(e: CartApiError) -> Self {
        match e {
            CartApiError::InsufficientStock { product, available } => Self::InsufficientStock { product, available },
            CartApiError::DatabaseError(msg) => Self::DatabaseError(msg),
            other => Self::DatabaseError(other.to_string()),
        }
    }
}

impl From<CatalogApiError> for CheckoutError {
    fn from(e: CatalogApiError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

impl From<SalesApiError> for CheckoutError {
    fn from(e: SalesApiError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

//------------------------------------------  CatalogApiError  -------------------------------------------------------
#[derive(Debug, Error)]
pub enum CatalogApiError {
    #[error("Product #{0} does not exist.")]
    ProductDoesNotExist(i64),
    #[error("Customer {0} does not exist.")]
    CustomerDoesNotExist(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

//------------------------------------------   CartApiError    -------------------------------------------------------
#[derive(Debug, Error)]
pub enum CartApiError {
    #[error("Product #{0} does not exist.")]
    ProductDoesNotExist(i64),
    #[error("'{0}' is already in the cart.")]
    DuplicateCartItem(String),
    #[error("Quantity must be at least 1, but {0} was given.")]
    InvalidQuantity(i64),
    #[error("Insufficient stock for '{product}'. Only {available} left.")]
    InsufficientStock { product: String, available: i64 },
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CartApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

//------------------------------------------   SalesApiError   -------------------------------------------------------
#[derive(Debug, Error)]
pub enum SalesApiError {
    #[error("The sales totals row is missing. The database was not migrated correctly.")]
    TotalsRowMissing,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for SalesApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

//------------------------------------------   AbuseApiError   -------------------------------------------------------
#[derive(Debug, Error)]
pub enum AbuseApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AbuseApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

//------------------------------------------    GatewayError   -------------------------------------------------------
/// Errors from the remote payment gateway. The gateway is treated as an unreliable remote service: none of these
/// are fatal to the process.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The gateway could not be reached, or answered with a server error. Retryable.
    #[error("The payment gateway could not be reached. {0}")]
    Unavailable(String),
    /// The gateway understood the request and refused it.
    #[error("The payment gateway rejected the request. {0}")]
    Rejected(String),
    /// The gateway answered with something we could not parse.
    #[error("Malformed response from the payment gateway. {0}")]
    InvalidResponse(String),
}
