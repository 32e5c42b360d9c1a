mod api;
mod config;
mod error;
mod helpers;

mod data_objects;

pub use api::ChapaApi;
pub use config::ChapaConfig;
pub use data_objects::{
    ChapaCustomerData,
    ChapaInitializeData,
    ChapaResponse,
    ChapaVerifyData,
    Customization,
    InitializePayload,
};
pub use error::ChapaApiError;
pub use helpers::parse_gateway_amount;
