use std::net::IpAddr;
use std::path::PathBuf;

use chrono::FixedOffset;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub max_body_size: usize,
    pub signing_secret: String,
    pub require_signature: bool,
    pub recipients: Vec<String>,
    pub skip_option_checkboxes: bool,
    pub debug_logging: bool,
    pub log_dir: PathBuf,
    pub date_format: String,
    pub utc_offset_minutes: i32,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("TALLY_RELAY_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid TALLY_RELAY_HOST: {e}"))?;

        let port: u16 = env_or("TALLY_RELAY_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid TALLY_RELAY_PORT: {e}"))?;

        let log_level = env_or("TALLY_RELAY_LOG_LEVEL", "info");

        let max_body_size: usize = env_or("TALLY_RELAY_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid TALLY_RELAY_MAX_BODY_SIZE: {e}"))?;

        let signing_secret = env_or("TALLY_SIGNING_SECRET", "");

        let require_signature = parse_bool(&env_or("TALLY_REQUIRE_SIGNATURE", "true"))
            .ok_or_else(|| "Invalid TALLY_REQUIRE_SIGNATURE: expected true or false".to_string())?;

        let recipients = parse_recipients(&env_or("TALLY_RECIPIENTS", ""));

        let skip_option_checkboxes = parse_bool(&env_or("TALLY_SKIP_OPTION_CHECKBOXES", "true"))
            .ok_or_else(|| {
                "Invalid TALLY_SKIP_OPTION_CHECKBOXES: expected true or false".to_string()
            })?;

        let debug_logging = parse_bool(&env_or("TALLY_DEBUG_LOGGING", "false"))
            .ok_or_else(|| "Invalid TALLY_DEBUG_LOGGING: expected true or false".to_string())?;

        let log_dir = PathBuf::from(env_or("TALLY_RELAY_LOG_DIR", "logs"));

        let date_format = env_or("TALLY_RELAY_DATE_FORMAT", "%B %-d, %Y %-I:%M %p");

        let utc_offset_minutes: i32 = env_or("TALLY_RELAY_UTC_OFFSET_MINUTES", "0")
            .parse()
            .map_err(|e| format!("Invalid TALLY_RELAY_UTC_OFFSET_MINUTES: {e}"))?;

        utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| "TALLY_RELAY_UTC_OFFSET_MINUTES out of range".to_string())?;

        let smtp = match (
            std::env::var("TALLY_SMTP_HOST").ok(),
            std::env::var("TALLY_SMTP_PORT").ok(),
            std::env::var("TALLY_SMTP_USER").ok(),
            std::env::var("TALLY_SMTP_PASS").ok(),
            std::env::var("TALLY_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid TALLY_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            host,
            port,
            log_level,
            max_body_size,
            signing_secret,
            require_signature,
            recipients,
            skip_option_checkboxes,
            debug_logging,
            log_dir,
            date_format,
            utc_offset_minutes,
            smtp,
        })
    }

    /// Display offset applied to submission timestamps in outgoing mail.
    pub fn display_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
    }
}

/// Split a recipient list on commas, semicolons, and whitespace; keep only
/// entries that parse as mail addresses; deduplicate preserving order.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
        let part = part.trim();
        if part.is_empty() || part.parse::<lettre::Address>().is_err() {
            continue;
        }
        if !out.iter().any(|e| e == part) {
            out.push(part.to_string());
        }
    }
    out
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
