use std::env;
use std::time::Duration;

use anyhow::{Context, bail};

use crate::document::{LayoutStyle, RenderOptions};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub google_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_api_version: String,
    pub model_keyword: String,
    pub fallback_model: String,
    pub request_timeout_secs: u64,
    pub model_cache_ttl_secs: u64,
    pub report_layout: LayoutStyle,
    pub strip_markdown: bool,
    pub product_label: String,
    pub confidentiality_label: String,
    pub download_filename: String,
    pub otel_enabled: bool,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let request_timeout_secs: u64 = or("LLM_REQUEST_TIMEOUT_SECS", "60")
            .parse()
            .context("LLM_REQUEST_TIMEOUT_SECS must be a number")?;
        if request_timeout_secs == 0 {
            bail!("LLM_REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            port: or("APP_PORT", "8080")
                .parse()
                .context("APP_PORT must be a number")?,
            environment: or("APP_ENVIRONMENT", "development"),
            google_api_key: get("GOOGLE_API_KEY"),
            gemini_base_url: or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            )
            .trim_end_matches('/')
            .to_string(),
            gemini_api_version: or("GEMINI_API_VERSION", "v1beta"),
            model_keyword: or("GEMINI_MODEL_KEYWORD", "flash"),
            fallback_model: or("GEMINI_FALLBACK_MODEL", "models/gemini-1.5-flash"),
            request_timeout_secs,
            model_cache_ttl_secs: or("MODEL_CACHE_TTL_SECS", "0")
                .parse()
                .context("MODEL_CACHE_TTL_SECS must be a number")?,
            report_layout: or("REPORT_LAYOUT", "title_page")
                .parse()
                .context("REPORT_LAYOUT must be `title_page` or `simple`")?,
            strip_markdown: parse_bool(
                "REPORT_STRIP_MARKDOWN",
                &or("REPORT_STRIP_MARKDOWN", "true"),
            )?,
            product_label: or("REPORT_PRODUCT_LABEL", "HSE Incident Commander v4.0"),
            confidentiality_label: or(
                "REPORT_CONFIDENTIALITY_LABEL",
                "CONFIDENTIAL - HSE INTERNAL USE ONLY",
            ),
            download_filename: or("REPORT_FILENAME", "Incident_Report.pdf"),
            otel_enabled: parse_bool("OTEL_ENABLED", &or("OTEL_ENABLED", "true"))?,
            otel_service_name: or("OTEL_SERVICE_NAME", "incident-report-generator"),
            otel_exporter_endpoint: or("OTEL_EXPORTER_OTLP_ENDPOINT", "http://localhost:4317"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn model_cache_ttl(&self) -> Option<Duration> {
        (self.model_cache_ttl_secs > 0).then(|| Duration::from_secs(self.model_cache_ttl_secs))
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            layout: self.report_layout,
            strip_markdown: self.strip_markdown,
            product_label: self.product_label.clone(),
            confidentiality_label: self.confidentiality_label.clone(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key} must be a boolean, got `{other}`"),
    }
}
