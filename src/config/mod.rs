use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub payments: PaymentConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Shared secret the email bot presents in X-API-Key.
    pub key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    pub default_deposit_percentage: i64,
    pub tour_operator_deposit_percentage: i64,
    pub currency: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            default_deposit_percentage: 20,
            tour_operator_deposit_percentage: 50,
            currency: "EUR".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_address: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.max_connections", 10)?
            .set_default("api.key", "change-me-in-production")?
            .set_default("payments.default_deposit_percentage", 20)?
            .set_default("payments.tour_operator_deposit_percentage", 50)?
            .set_default("payments.currency", "EUR")?
            .set_default("stripe.enabled", false)?
            .set_default("email.enabled", false)?
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (with TEESHEET__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("TEESHEET").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://teesheet.db".to_string(),
                max_connections: 10,
            },
            api: ApiConfig {
                key: "change-me-in-production".to_string(),
            },
            payments: PaymentConfig::default(),
            stripe: StripeConfig::default(),
            email: EmailConfig::default(),
        }
    }
}
