use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, Retry};

use crate::grading::{GradeError, GradingConfig, GradingDocument};

/// Where the grading document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Url(String),
}

impl ConfigSource {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            ConfigSource::Url(s.to_string())
        } else {
            ConfigSource::File(PathBuf::from(s))
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub retries: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 2,
        }
    }
}

/// Load, parse and validate the grading document.
///
/// Any failure along the way (I/O, HTTP, timeout, syntax, validation) is
/// reported as `GradeError::ConfigUnavailable`; callers stay inert until a
/// later load succeeds.
pub async fn load_grading_config(
    source: &ConfigSource,
    options: &FetchOptions,
) -> Result<GradingConfig, GradeError> {
    let origin = source.to_string();
    tracing::debug!(source = %origin, "loading grading configuration");

    let loaded = tokio::time::timeout(options.timeout, fetch_document(source, options)).await;
    let (body, hint) = match loaded {
        Ok(Ok(fetched)) => fetched,
        Ok(Err(e)) => return Err(unavailable(&origin, format!("{:#}", e))),
        Err(_elapsed) => {
            return Err(unavailable(
                &origin,
                format!(
                    "timed out after {}",
                    humantime::format_duration(options.timeout)
                ),
            ))
        }
    };

    let doc = parse_document(&body, hint).map_err(|e| unavailable(&origin, format!("{:#}", e)))?;

    let config = GradingConfig::from_document(doc).map_err(|e| unavailable(&origin, e))?;
    tracing::info!(
        source = %origin,
        bands = config.scale().len(),
        pass = config.pass(),
        "grading configuration loaded"
    );
    Ok(config)
}

fn unavailable(origin: &str, reason: impl ToString) -> GradeError {
    let err = GradeError::unavailable(origin, reason);
    tracing::warn!("{}", err);
    err
}

/// Document syntax guessed from the file extension or content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    Json,
    Yaml,
    Unknown,
}

impl FormatHint {
    fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".json") || lower.contains("json") {
            FormatHint::Json
        } else if lower.ends_with(".yaml") || lower.ends_with(".yml") || lower.contains("yaml") {
            FormatHint::Yaml
        } else {
            FormatHint::Unknown
        }
    }
}

async fn fetch_document(source: &ConfigSource, options: &FetchOptions) -> Result<(String, FormatHint)> {
    match source {
        ConfigSource::File(path) => {
            let body = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read grading document at {}", path.display()))?;
            Ok((body, FormatHint::from_name(&path.to_string_lossy())))
        }
        ConfigSource::Url(url) => fetch_url(url, options).await,
    }
}

async fn fetch_url(url: &str, options: &FetchOptions) -> Result<(String, FormatHint)> {
    let client = reqwest::Client::builder()
        .timeout(options.timeout)
        .user_agent(concat!("grade-calc/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    // Retry strategy: exponential backoff, `retries` extra attempts
    let retry_strategy = ExponentialBackoff::from_millis(100)
        .max_delay(Duration::from_secs(2))
        .take(options.retries);

    Retry::spawn(retry_strategy, || async {
        let response = client
            .get(url)
            .header("Accept", "application/json, application/yaml;q=0.9")
            .send()
            .await
            .map_err(|e| anyhow!("Request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, url, "grading document request rejected");
            anyhow::bail!("Server responded with {}", status);
        }

        let hint = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(FormatHint::from_name)
            .filter(|h| *h != FormatHint::Unknown)
            .unwrap_or_else(|| FormatHint::from_name(url));

        let body = response
            .text()
            .await
            .context("Failed to read response body")?;
        Ok::<_, anyhow::Error>((body, hint))
    })
    .await
}

/// Parse a grading document as JSON or YAML.
///
/// Without a hint, a body starting with `{` is JSON and anything else YAML.
pub fn parse_document(body: &str, hint: FormatHint) -> Result<GradingDocument> {
    let as_json = match hint {
        FormatHint::Json => true,
        FormatHint::Yaml => false,
        FormatHint::Unknown => body.trim_start().starts_with('{'),
    };

    if as_json {
        serde_json::from_str(body).context("Failed to parse grading document: invalid JSON")
    } else {
        serde_saphyr::from_str(body).context("Failed to parse grading document: invalid YAML")
    }
}
