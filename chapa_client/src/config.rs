use log::*;
use storefront_common::Secret;

#[derive(Debug, Clone, Default)]
pub struct ChapaConfig {
    /// Base URL of the Chapa API, e.g. "https://api.chapa.co/v1".
    pub api_url: String,
    pub secret_key: Secret<String>,
}

impl ChapaConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("CHAPA_API_URL").unwrap_or_else(|_| {
            warn!("CHAPA_API_URL not set, using https://api.chapa.co/v1 as default");
            "https://api.chapa.co/v1".to_string()
        });
        let secret_key = Secret::new(std::env::var("CHAPA_SECRET_KEY").unwrap_or_else(|_| {
            warn!("CHAPA_SECRET_KEY not set, using a (probably useless) default");
            "CHASECK_TEST-00000000000000".to_string()
        }));
        Self { api_url, secret_key }
    }
}
