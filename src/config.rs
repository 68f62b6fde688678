use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub cv_storage_dir: String,
    pub email: EmailOptions,
    pub sms: SmsOptions,
    pub delivery_timeout: Duration,
}

/// Outbound e-mail relay settings.
#[derive(Debug, Clone)]
pub struct EmailOptions {
    pub enabled: bool,
    pub relay_url: Option<String>,
    pub relay_secret: Option<String>,
    pub from_address: String,
    pub from_name: String,
}

impl Default for EmailOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            relay_url: None,
            relay_secret: None,
            from_address: "noreply@hrsystem.local".to_string(),
            from_name: "HR System".to_string(),
        }
    }
}

/// Outbound SMS relay settings.
#[derive(Debug, Clone)]
pub struct SmsOptions {
    pub enabled: bool,
    pub relay_url: Option<String>,
    pub relay_secret: Option<String>,
    pub provider_name: String,
    pub from_number: String,
}

impl Default for SmsOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            relay_url: None,
            relay_secret: None,
            provider_name: "Mock".to_string(),
            from_number: "+10000000000".to_string(),
        }
    }
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let relay_secret = get_env_opt("RELAY_SECRET");

        Ok(Self {
            database_url: get_env("DATABASE_URL")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            cv_storage_dir: get_env_opt("CV_STORAGE_DIR").unwrap_or_else(|| "uploads/cv".to_string()),
            email: EmailOptions {
                enabled: get_env_parse_or("EMAIL_ENABLED", false)?,
                relay_url: get_env_opt("EMAIL_RELAY_URL"),
                relay_secret: relay_secret.clone(),
                from_address: get_env_opt("EMAIL_FROM_ADDRESS")
                    .unwrap_or_else(|| EmailOptions::default().from_address),
                from_name: get_env_opt("EMAIL_FROM_NAME")
                    .unwrap_or_else(|| EmailOptions::default().from_name),
            },
            sms: SmsOptions {
                enabled: get_env_parse_or("SMS_ENABLED", false)?,
                relay_url: get_env_opt("SMS_RELAY_URL"),
                relay_secret,
                provider_name: get_env_opt("SMS_PROVIDER_NAME")
                    .unwrap_or_else(|| SmsOptions::default().provider_name),
                from_number: get_env_opt("SMS_FROM_NUMBER")
                    .unwrap_or_else(|| SmsOptions::default().from_number),
            },
            delivery_timeout: Duration::from_secs(get_env_parse_or("DELIVERY_TIMEOUT_SECS", 15)?),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
