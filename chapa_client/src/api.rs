use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::ChapaConfig,
    data_objects::{ChapaInitializeData, ChapaResponse, ChapaVerifyData, InitializePayload},
    ChapaApiError,
};

/// Client for the two Chapa operations the storefront needs: opening a hosted checkout session and verifying a
/// transaction by reference.
#[derive(Clone)]
pub struct ChapaApi {
    config: ChapaConfig,
    client: Arc<Client>,
}

impl ChapaApi {
    pub fn new(config: ChapaConfig) -> Result<Self, ChapaApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| ChapaApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ChapaApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, ChapaApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| ChapaApiError::RequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| ChapaApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ChapaApiError::RequestError(e.to_string()))?;
            Err(ChapaApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Opens a hosted payment session. On success, Chapa answers with the URL the shopper must be redirected to.
    pub async fn initialize_transaction(
        &self,
        payload: InitializePayload,
    ) -> Result<ChapaResponse<ChapaInitializeData>, ChapaApiError> {
        debug!("Initializing transaction {}", payload.tx_ref);
        let result = self
            .rest_query::<ChapaResponse<ChapaInitializeData>, InitializePayload>(
                Method::POST,
                "/transaction/initialize",
                Some(payload),
            )
            .await?;
        info!("Transaction initialization returned status '{}'", result.status);
        Ok(result)
    }

    /// Verifies a transaction by reference. This is the only trusted source of a payment's status and amount.
    pub async fn verify_transaction(
        &self,
        tx_ref: &str,
    ) -> Result<ChapaResponse<ChapaVerifyData>, ChapaApiError> {
        let path = format!("/transaction/verify/{tx_ref}");
        debug!("Verifying transaction {tx_ref}");
        let result =
            self.rest_query::<ChapaResponse<ChapaVerifyData>, ()>(Method::GET, &path, None).await?;
        info!("Verification of {tx_ref} returned status '{}'", result.status);
        Ok(result)
    }
}
