use std::{env, time::Duration};

use log::*;
use storefront_common::Secret;
use storefront_engine::{CheckoutConfig, DEFAULT_MAX_REQUESTS_PER_WINDOW, DEFAULT_SENSITIVE_PATHS};

const DEFAULT_NSS_HOST: &str = "127.0.0.1";
const DEFAULT_NSS_PORT: u16 = 8360;
const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;
const DEFAULT_ABUSE_SCAN_INTERVAL: Duration = Duration::from_secs(300);
const DEFAULT_ROLLOVER_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    pub checkout: CheckoutConfig,
    pub mail: MailConfig,
    pub abuse: AbuseConfig,
    /// How often the daily-sales rollover job checks whether a new day has started.
    pub rollover_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_NSS_HOST.to_string(),
            port: DEFAULT_NSS_PORT,
            database_url: String::default(),
            use_x_forwarded_for: false,
            checkout: CheckoutConfig::default(),
            mail: MailConfig::default(),
            abuse: AbuseConfig::default(),
            rollover_interval: DEFAULT_ROLLOVER_INTERVAL,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("NSS_HOST").ok().unwrap_or_else(|| DEFAULT_NSS_HOST.into());
        let port = env::var("NSS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for NSS_PORT. {e} Using the default, {DEFAULT_NSS_PORT}, instead."
                    );
                    DEFAULT_NSS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_NSS_PORT);
        let database_url = env::var("NSS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ NSS_DATABASE_URL is not set. Please set it to the URL for the storefront database.");
            String::default()
        });
        let use_x_forwarded_for =
            env::var("NSS_USE_X_FORWARDED_FOR").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        let checkout = configure_checkout();
        let mail = MailConfig::from_env_or_default();
        let abuse = AbuseConfig::from_env_or_default();
        let rollover_interval = duration_from_env("NSS_ROLLOVER_INTERVAL_SECS", DEFAULT_ROLLOVER_INTERVAL);
        Self { host, port, database_url, use_x_forwarded_for, checkout, mail, abuse, rollover_interval }
    }
}

fn configure_checkout() -> CheckoutConfig {
    let mut config = CheckoutConfig::default();
    config.callback_url = env::var("NSS_CALLBACK_URL").ok().unwrap_or_else(|| {
        error!("🪛️ NSS_CALLBACK_URL is not set. The payment gateway will have nowhere to send webhooks.");
        String::default()
    });
    config.return_url = env::var("NSS_RETURN_URL").ok().unwrap_or_else(|| {
        warn!("🪛️ NSS_RETURN_URL is not set. Shoppers will not be redirected after paying.");
        String::default()
    });
    config.low_stock_threshold = env::var("NSS_LOW_STOCK_THRESHOLD")
        .ok()
        .and_then(|s| {
            s.parse::<i64>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for NSS_LOW_STOCK_THRESHOLD. {e}"))
                .ok()
        })
        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    config
}

fn duration_from_env(var: &str, default: Duration) -> Duration {
    env::var(var)
        .ok()
        .and_then(|s| {
            s.parse::<u64>().map(Duration::from_secs).map_err(|e| warn!("🪛️ Invalid value for {var}. {e}")).ok()
        })
        .unwrap_or(default)
}

//-------------------------------------------------  MailConfig  -------------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct MailConfig {
    /// Endpoint of the transactional mail API that delivers notifications.
    pub api_url: String,
    pub api_key: Secret<String>,
    pub sender: String,
    /// Recipient of operational alerts such as low-stock warnings.
    pub admin_email: String,
    pub max_attempts: usize,
    pub retry_delay: Duration,
}

impl MailConfig {
    pub fn from_env_or_default() -> Self {
        let api_url = env::var("NSS_MAIL_API_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ NSS_MAIL_API_URL is not set. Notification delivery will fail until it is configured.");
            String::default()
        });
        let api_key = Secret::new(env::var("NSS_MAIL_API_KEY").ok().unwrap_or_else(|| {
            warn!("🪛️ NSS_MAIL_API_KEY is not set.");
            String::default()
        }));
        let sender = env::var("NSS_MAIL_SENDER").ok().unwrap_or_else(|| "noreply@yourdomain.com".to_string());
        let admin_email = env::var("NSS_ADMIN_EMAIL").ok().unwrap_or_else(|| "admin@yourdomain.com".to_string());
        let max_attempts = env::var("NSS_MAIL_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(3);
        let retry_delay = duration_from_env("NSS_MAIL_RETRY_DELAY_SECS", Duration::from_secs(60));
        Self { api_url, api_key, sender, admin_email, max_attempts, retry_delay }
    }
}

//-------------------------------------------------  AbuseConfig  ------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AbuseConfig {
    pub scan_interval: Duration,
    /// Size of the sliding window the scanner inspects.
    pub window: chrono::Duration,
    pub max_requests: i64,
    pub sensitive_paths: Vec<String>,
}

impl Default for AbuseConfig {
    fn default() -> Self {
        Self {
            scan_interval: DEFAULT_ABUSE_SCAN_INTERVAL,
            window: chrono::Duration::hours(1),
            max_requests: DEFAULT_MAX_REQUESTS_PER_WINDOW,
            sensitive_paths: DEFAULT_SENSITIVE_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl AbuseConfig {
    pub fn from_env_or_default() -> Self {
        let mut config = Self::default();
        config.scan_interval = duration_from_env("NSS_ABUSE_SCAN_INTERVAL_SECS", DEFAULT_ABUSE_SCAN_INTERVAL);
        if let Ok(s) = env::var("NSS_ABUSE_MAX_REQUESTS") {
            match s.parse::<i64>() {
                Ok(n) => config.max_requests = n,
                Err(e) => warn!("🪛️ Invalid configuration value for NSS_ABUSE_MAX_REQUESTS. {e}"),
            }
        }
        if let Ok(s) = env::var("NSS_ABUSE_SENSITIVE_PATHS") {
            config.sensitive_paths = s.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect();
        }
        config
    }
}
