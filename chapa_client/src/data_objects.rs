use serde::{Deserialize, Serialize};
use serde_json::Value;

//------------------------------------------ Initialize payload -----------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializePayload {
    /// Decimal amount as a string, e.g. "25.00".
    pub amount: String,
    pub currency: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub tx_ref: String,
    pub callback_url: String,
    pub return_url: String,
    pub customization: Customization,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customization {
    pub title: String,
    pub description: String,
}

//------------------------------------------    API envelope    -----------------------------------------------------
/// Every Chapa response carries a `status` string, a human-readable `message`, and a `data` object whose shape
/// depends on the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapaResponse<T> {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ChapaResponse<T> {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapaInitializeData {
    pub checkout_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapaCustomerData {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapaVerifyData {
    /// Chapa reports amounts as JSON numbers, but some gateway mocks use decimal strings. Parsed with
    /// [`crate::parse_gateway_amount`].
    pub amount: Value,
    #[serde(default)]
    pub customer: Option<ChapaCustomerData>,
}
