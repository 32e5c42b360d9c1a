use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChapaApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach the Chapa API: {0}")]
    RequestError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The Chapa API reported failure: {0}")]
    TransactionError(String),
    #[error("Invalid currency amount: {0}")]
    InvalidCurrencyAmount(String),
}
