use dotenvy::dotenv;
use std::env;

/// Default NPR rate source, same feed the storefront reads.
pub const DEFAULT_EXCHANGE_RATE_URL: &str = "https://api.exchangerate-api.com/v4/latest/NPR";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub admin_password: String,
    pub jwt_secret: String,
    pub discord_webhook_url: Option<String>,
    pub discord_staff_role_id: Option<String>,
    pub exchange_rate_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            admin_password: env::var("ADMIN_PASSWORD")?,
            jwt_secret: env::var("JWT_SECRET")?,
            discord_webhook_url: env::var("DISCORD_WEBHOOK_URL").ok(),
            discord_staff_role_id: env::var("DISCORD_STAFF_ROLE_ID").ok(),
            exchange_rate_url: env::var("EXCHANGE_RATE_URL")
                .unwrap_or_else(|_| DEFAULT_EXCHANGE_RATE_URL.to_string()),
        })
    }
}
