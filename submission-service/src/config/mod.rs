use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

use crate::models::SubmissionKind;
use crate::services::NotifyPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub store: StoreConfig,
    pub mail: MailConfig,
    pub smtp: SmtpConfig,
    pub submission: SubmissionSettings,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongodb,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    Resend,
    Smtp,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub provider: MailBackend,
    pub resend_api_key: String,
    pub from: String,
    /// Fixed recipient set every notification is addressed to.
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionSettings {
    /// `None` accepts any non-missing word list.
    pub required_length: Option<usize>,
    pub notify_policy: NotifyPolicy,
    pub step_timeout: Option<Duration>,
    pub routes: Vec<SubmissionKind>,
}

impl SubmissionConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let backend = match get_env("STORE_BACKEND", Some("mongodb"), false)?.as_str() {
            "mongodb" => StoreBackend::Mongodb,
            "memory" => StoreBackend::Memory,
            other => return Err(config_error(format!("Unknown STORE_BACKEND: {}", other))),
        };

        let uri = match backend {
            StoreBackend::Mongodb => get_env("MONGODB_URI", None, is_prod)?,
            StoreBackend::Memory => get_env("MONGODB_URI", Some(""), false)?,
        };

        let provider = match get_env("MAIL_PROVIDER", Some("resend"), false)?.as_str() {
            "resend" => MailBackend::Resend,
            "smtp" => MailBackend::Smtp,
            "mock" => MailBackend::Mock,
            other => return Err(config_error(format!("Unknown MAIL_PROVIDER: {}", other))),
        };

        let resend_api_key = match provider {
            MailBackend::Resend => get_env("RESEND_API_KEY", None, is_prod)?,
            _ => get_env("RESEND_API_KEY", Some(""), false)?,
        };

        let recipients = parse_list(&get_env("NOTIFY_RECIPIENTS", None, is_prod)?);
        if recipients.is_empty() {
            return Err(config_error(
                "NOTIFY_RECIPIENTS must contain at least one address".to_string(),
            ));
        }

        let routes = parse_list(&get_env("SUBMISSION_ROUTES", Some("words,requests"), false)?)
            .iter()
            .map(|route| {
                route
                    .parse::<SubmissionKind>()
                    .map_err(|e| config_error(format!("Invalid SUBMISSION_ROUTES: {}", e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let notify_policy = get_env("NOTIFY_POLICY", Some("required"), false)?
            .parse::<NotifyPolicy>()
            .map_err(|e| config_error(format!("Invalid NOTIFY_POLICY: {}", e)))?;

        Ok(SubmissionConfig {
            common: common_config,
            store: StoreConfig {
                backend,
                uri,
                database: get_env("MONGODB_DATABASE", Some("submissions"), is_prod)?,
            },
            mail: MailConfig {
                provider,
                resend_api_key,
                from: get_env("MAIL_FROM", Some("onboarding@resend.dev"), is_prod)?,
                recipients,
            },
            smtp: SmtpConfig {
                host: get_env("SMTP_HOST", Some("smtp.gmail.com"), false)?,
                port: get_env("SMTP_PORT", Some("587"), false)?
                    .parse()
                    .unwrap_or(587),
                user: get_env("SMTP_USER", Some(""), false)?,
                password: get_env("SMTP_PASSWORD", Some(""), false)?,
            },
            submission: SubmissionSettings {
                required_length: parse_optional_number(
                    "WORDS_REQUIRED_LENGTH",
                    &get_env("WORDS_REQUIRED_LENGTH", Some("24"), false)?,
                )?,
                notify_policy,
                step_timeout: parse_optional_number(
                    "STEP_TIMEOUT_MS",
                    &get_env("STEP_TIMEOUT_MS", Some("10000"), false)?,
                )?
                .map(Duration::from_millis),
                routes,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(config_error(format!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(config_error(format!("{} is required but not set", key)))
            }
        }
    }
}

fn config_error(msg: String) -> AppError {
    AppError::ConfigError(anyhow::anyhow!(msg))
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Empty or `none` means "unset".
fn parse_optional_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<Option<T>, AppError>
where
    T::Err: std::fmt::Display,
{
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|e| config_error(format!("{} must be a number: {}", key, e)))
}
