// config.rs
use std::env;
use std::path::PathBuf;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_name: String,
    pub jwt_secret: String,
    pub admin_username: String,
    pub admin_password: String,
    pub stripe_api_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_api_base: String,
    pub currency: String,
    pub cors_origins: Vec<String>,
    pub backend_url: String,
    pub upload_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| AppError::configuration(format!("{} must be set", key)))
        };

        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::configuration("PORT must be a number"))?,
            None => 8001,
        };

        let database_url = match var("MONGO_URL") {
            Some(url) => url,
            None => required("DATABASE_URL")?,
        };

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let backend_url = var("BACKEND_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        Ok(AppConfig {
            database_url,
            db_name: var("DB_NAME").unwrap_or_else(|| "storefront".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            admin_username: var("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
            admin_password: var("ADMIN_PASSWORD").unwrap_or_else(|| "admin123".to_string()),
            stripe_api_key: required("STRIPE_API_KEY")?,
            stripe_webhook_secret: var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            stripe_api_base: var("STRIPE_API_BASE")
                .unwrap_or_else(|| "https://api.stripe.com/v1".to_string()),
            currency: var("PAYMENT_CURRENCY")
                .unwrap_or_else(|| "usd".to_string())
                .to_lowercase(),
            cors_origins,
            backend_url,
            upload_dir: PathBuf::from(var("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string())),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }

    pub fn get_config_info(&self) -> serde_json::Value {
        serde_json::json!({
            "db_name": self.db_name,
            "currency": self.currency,
            "backend_url": self.backend_url,
            "upload_dir": self.upload_dir,
            "cors_origins": self.cors_origins,
            "stripe_key_set": !self.stripe_api_key.is_empty(),
            "webhook_secret_set": !self.stripe_webhook_secret.is_empty(),
            "host": self.host,
            "port": self.port,
        })
    }
}
