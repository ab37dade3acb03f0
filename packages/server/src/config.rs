use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// How `POST /api/phone-number/verify-otp` decides whether a code is correct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OtpCheckPolicy {
    /// Ask the OTP provider
    #[default]
    Provider,
    /// Accept any well-formed code starting with `1` (local development only)
    PrefixOne,
}

impl FromStr for OtpCheckPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "provider" => Ok(OtpCheckPolicy::Provider),
            "prefix-one" | "prefix_one" => Ok(OtpCheckPolicy::PrefixOne),
            other => bail!("unknown OTP check policy: {}", other),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Without a database, accounts are kept in memory
    pub database_url: Option<String>,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_verify_service_sid: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub otp_check_policy: OtpCheckPolicy,
    pub verified_ttl_minutes: i64,
    pub rate_limit_enabled: bool,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let otp_check_policy: OtpCheckPolicy = env::var("OTP_CHECK_POLICY")
            .unwrap_or_else(|_| "provider".to_string())
            .parse()
            .context("OTP_CHECK_POLICY must be `provider` or `prefix-one`")?;

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID")
                .context("TWILIO_ACCOUNT_SID must be set")?,
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN")
                .context("TWILIO_AUTH_TOKEN must be set")?,
            twilio_verify_service_sid: env::var("TWILIO_VERIFY_SERVICE_SID")
                .context("TWILIO_VERIFY_SERVICE_SID must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "nextrip".to_string()),
            otp_check_policy,
            verified_ttl_minutes: env::var("VERIFIED_TTL_MINUTES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("VERIFIED_TTL_MINUTES must be a valid number")?,
            rate_limit_enabled: parse_bool(env::var("RATE_LIMIT_ENABLED").ok(), true)
                .context("RATE_LIMIT_ENABLED must be true or false")?,
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|origins| parse_list(&origins))
                .unwrap_or_default(),
        })
    }
}

fn parse_bool(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(other) => bail!("invalid boolean: {}", other),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
