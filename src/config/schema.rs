use serde::{Deserialize, Serialize};

/// User settings read from `~/.config/grade-calc/config.yaml`.
///
/// Example YAML:
/// ```yaml
/// source: "https://example.edu/course/grading.json"
/// fetch_timeout: "10s"
/// fetch_retries: 2
/// theme: auto
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path or http(s) URL of the grading document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Upper bound for one load of the grading document (humantime, e.g. "10s")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout: Option<String>,

    /// Extra attempts after a failed HTTP fetch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_retries: Option<usize>,

    /// TUI palette: "auto", "dark" or "light"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
source: "https://example.edu/grading.json"
fetch_timeout: "5s"
fetch_retries: 4
theme: light
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(
            config.source.as_deref(),
            Some("https://example.edu/grading.json")
        );
        assert_eq!(config.fetch_timeout.as_deref(), Some("5s"));
        assert_eq!(config.fetch_retries, Some(4));
        assert_eq!(config.theme.as_deref(), Some("light"));
    }

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(serde_saphyr::from_str::<Config>("colour: red").is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            source: Some("/tmp/grading.json".to_string()),
            fetch_timeout: Some("3s".to_string()),
            fetch_retries: None,
            theme: Some("dark".to_string()),
        };
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
