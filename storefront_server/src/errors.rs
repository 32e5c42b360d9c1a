use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use storefront_engine::traits::{AbuseApiError, CartApiError, CatalogApiError, CheckoutError, SalesApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("{0}")]
    CheckoutError(#[from] CheckoutError),
    #[error("{0}")]
    CartError(#[from] CartApiError),
    #[error("{0}")]
    CatalogError(#[from] CatalogApiError),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::CheckoutError(e) => match e {
                CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
                CheckoutError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
                CheckoutError::PaymentNotSuccessful(_) => StatusCode::BAD_REQUEST,
                CheckoutError::UnknownCustomer => StatusCode::NOT_FOUND,
                CheckoutError::CustomerMismatch => StatusCode::CONFLICT,
                CheckoutError::DuplicateTxRef(_) => StatusCode::CONFLICT,
                CheckoutError::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
                CheckoutError::GatewayRejected(_) => StatusCode::BAD_GATEWAY,
                CheckoutError::SettlementConflict(_) => StatusCode::SERVICE_UNAVAILABLE,
                CheckoutError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::CartError(e) => match e {
                CartApiError::ProductDoesNotExist(_) => StatusCode::NOT_FOUND,
                CartApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::CatalogError(e) => match e {
                CatalogApiError::ProductDoesNotExist(_) => StatusCode::NOT_FOUND,
                CatalogApiError::CustomerDoesNotExist(_) => StatusCode::NOT_FOUND,
                CatalogApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<SalesApiError> for ServerError {
    fn from(e: SalesApiError) -> Self {
        Self::BackendError(e.to_string())
    }
}

impl From<AbuseApiError> for ServerError {
    fn from(e: AbuseApiError) -> Self {
        Self::BackendError(e.to_string())
    }
}
