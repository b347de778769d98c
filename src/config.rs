//! Process-wide configuration, read once at startup.
//!
//! All knobs come from the environment (with `.env` support via dotenvy).
//! There is no runtime reconfiguration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_TEMPLATE_DIR: &str = "./templates";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SOFFICE_BIN: &str = "soffice";
const DEFAULT_CONVERT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned for template schema/asset pairs at startup.
    pub template_dir: PathBuf,
    pub bind_addr: String,
    pub port: u16,
    /// Shared credential the chat transport must present in `X-Chat-Token`.
    pub chat_token: String,
    /// Binary used for DOCX to PDF conversion.
    pub soffice_bin: String,
    /// Hard deadline for a single conversion run.
    pub convert_timeout: Duration,
    /// Optional webhook receiving operational reports (session starts,
    /// delivered documents). Reporting is disabled when unset.
    pub report_webhook_url: Option<String>,
}

impl Config {
    /// Load configuration from the environment. `CHAT_TOKEN` is required;
    /// everything else has a default.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let chat_token = env::var("CHAT_TOKEN")
            .map_err(|_| "CHAT_TOKEN must be set in the environment or .env".to_string())?;
        if chat_token.trim().is_empty() {
            return Err("CHAT_TOKEN must not be empty".to_string());
        }

        let template_dir = env::var("TEMPLATE_DIR")
            .unwrap_or_else(|_| DEFAULT_TEMPLATE_DIR.to_string())
            .into();

        let bind_addr =
            env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let port = parse_env_u64("PORT", DEFAULT_PORT as u64)? as u16;

        let soffice_bin =
            env::var("SOFFICE_BIN").unwrap_or_else(|_| DEFAULT_SOFFICE_BIN.to_string());
        let convert_timeout = Duration::from_secs(parse_env_u64(
            "CONVERT_TIMEOUT_SECS",
            DEFAULT_CONVERT_TIMEOUT_SECS,
        )?);

        let report_webhook_url = env::var("REPORT_WEBHOOK_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            template_dir,
            bind_addr,
            port,
            chat_token,
            soffice_bin,
            convert_timeout,
            report_webhook_url,
        })
    }
}

fn parse_env_u64(key: &str, default: u64) -> Result<u64, String> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("{key} must be a positive integer, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
