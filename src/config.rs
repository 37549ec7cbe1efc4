//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::pricing::RateTable;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Marketplace ids or groups (international, local, all)
    #[serde(default)]
    pub sources: Vec<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Lower bound of the random delay before each request, in milliseconds
    #[serde(default = "default_delay_min_ms")]
    pub delay_min_ms: u64,

    /// Upper bound of the random delay before each request, in milliseconds
    #[serde(default = "default_delay_max_ms")]
    pub delay_max_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Deadline for a whole aggregation run in seconds
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,

    /// Multipliers into USD; entries here override the built-in table
    #[serde(default)]
    pub rates: RateTable,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Filter: keywords that must NOT appear in title
    #[serde(default)]
    pub exclude_keywords: Vec<String>,

    /// Filter: minimum reference price
    #[serde(default)]
    pub min_price: Option<f64>,

    /// Filter: maximum reference price
    #[serde(default)]
    pub max_price: Option<f64>,

    /// Maximum number of listings to display (0 = unlimited)
    #[serde(default)]
    pub max_results: usize,
}

fn default_delay_min_ms() -> u64 {
    1000
}

fn default_delay_max_ms() -> u64 {
    3000
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_deadline_secs() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            proxy: None,
            delay_min_ms: default_delay_min_ms(),
            delay_max_ms: default_delay_max_ms(),
            timeout_secs: default_timeout_secs(),
            deadline_secs: default_deadline_secs(),
            rates: RateTable::default(),
            format: OutputFormat::Table,
            exclude_keywords: Vec::new(),
            min_price: None,
            max_price: None,
            max_results: 0,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// A `[rates]` table extends the built-in rates rather than replacing them.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let mut rates = RateTable::default();
        rates.merge(&config.rates);
        config.rates = rates;

        Ok(config.normalized())
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("price-compare").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(proxy) = std::env::var("PRICE_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("PRICE_DELAY_MIN") {
            if let Ok(d) = delay.parse() {
                self.delay_min_ms = d;
            }
        }

        if let Ok(delay) = std::env::var("PRICE_DELAY_MAX") {
            if let Ok(d) = delay.parse() {
                self.delay_max_ms = d;
            }
        }

        if let Ok(timeout) = std::env::var("PRICE_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }

        if let Ok(sources) = std::env::var("PRICE_SOURCES") {
            let sources: Vec<String> = sources
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !sources.is_empty() {
                self.sources = sources;
            }
        }

        self.normalized()
    }

    /// Swaps delay bounds given in the wrong order.
    pub fn normalized(mut self) -> Self {
        if self.delay_min_ms > self.delay_max_ms {
            std::mem::swap(&mut self.delay_min_ms, &mut self.delay_max_ms);
        }
        self
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Env-var tests mutate process state; run them one at a time.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: &[&str] =
        &["PRICE_PROXY", "PRICE_DELAY_MIN", "PRICE_DELAY_MAX", "PRICE_TIMEOUT", "PRICE_SOURCES"];

    fn with_env_vars(vars: &[(&str, &str)], test: impl FnOnce()) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let saved: Vec<(&str, Option<String>)> =
            ENV_VARS.iter().map(|k| (*k, std::env::var(k).ok())).collect();

        for key in ENV_VARS {
            std::env::remove_var(key);
        }
        for (key, value) in vars {
            std::env::set_var(key, value);
        }

        test();

        for (key, value) in saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.sources.is_empty());
        assert!(config.proxy.is_none());
        assert_eq!(config.delay_min_ms, 1000);
        assert_eq!(config.delay_max_ms, 3000);
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.deadline_secs, 120);
        assert_eq!(config.rates, RateTable::default());
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.exclude_keywords.is_empty());
        assert!(config.min_price.is_none());
        assert!(config.max_price.is_none());
        assert_eq!(config.max_results, 0);
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "invalid".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
        assert!(err.contains("table, json, markdown, csv"));
    }

    #[test]
    fn test_output_format_display_and_serde() {
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
        assert_eq!(serde_json::to_string(&OutputFormat::Json).unwrap(), "\"json\"");
        let parsed: OutputFormat = serde_json::from_str("\"csv\"").unwrap();
        assert_eq!(parsed, OutputFormat::Csv);
    }

    #[test]
    fn test_config_from_toml_all_fields() {
        let toml = r#"
            sources = ["ebay", "local"]
            proxy = "socks5://localhost:1080"
            delay_min_ms = 200
            delay_max_ms = 400
            timeout_secs = 20
            deadline_secs = 60
            format = "json"
            exclude_keywords = ["refurbished", "used"]
            min_price = 10.0
            max_price = 100.0
            max_results = 25

            [rates]
            eur = 1.2
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.sources, vec!["ebay", "local"]);
        assert_eq!(config.proxy.as_deref(), Some("socks5://localhost:1080"));
        assert_eq!(config.delay_min_ms, 200);
        assert_eq!(config.delay_max_ms, 400);
        assert_eq!(config.timeout_secs, 20);
        assert_eq!(config.deadline_secs, 60);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.exclude_keywords, vec!["refurbished", "used"]);
        assert_eq!(config.min_price, Some(10.0));
        assert_eq!(config.max_price, Some(100.0));
        assert_eq!(config.max_results, 25);
        assert_eq!(config.rates.rate("EUR"), Some(1.2));
    }

    #[test]
    fn test_config_from_file_merges_rates() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            delay_min_ms = 0
            [rates]
            EUR = 1.5
            JPY = 0.0067
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.delay_min_ms, 0);
        assert_eq!(config.rates.rate("EUR"), Some(1.5));
        assert_eq!(config.rates.rate("JPY"), Some(0.0067));
        assert_eq!(config.rates.rate("GBP"), Some(1.31161));
        assert_eq!(config.rates.rate("USD"), Some(1.0));
    }

    #[test]
    fn test_config_from_file_ignores_invalid_rates() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [rates]
            EUR = 0.0
            GBP = nan
            UZS = -1.0
            KZT = 0.002
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.rates.rate("EUR"), Some(1.11459));
        assert_eq!(config.rates.rate("GBP"), Some(1.31161));
        assert!((config.rates.rate("UZS").unwrap() - 1.0 / 13000.0).abs() < 1e-12);
        assert_eq!(config.rates.rate("KZT"), Some(0.002));
    }

    #[test]
    fn test_config_from_file_swaps_delay_bounds() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "delay_min_ms = 5000\ndelay_max_ms = 100").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.delay_min_ms, 100);
        assert_eq!(config.delay_max_ms, 5000);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let err = Config::from_file("/nonexistent/path/config.toml").unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "sources = [\"uzum\"]\nmax_results = 30").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.sources, vec!["uzum"]);
        assert_eq!(config.max_results, 30);
    }

    #[test]
    fn test_config_with_env() {
        with_env_vars(
            &[
                ("PRICE_PROXY", "http://proxy:8080"),
                ("PRICE_DELAY_MIN", "10"),
                ("PRICE_DELAY_MAX", "20"),
                ("PRICE_TIMEOUT", "7"),
                ("PRICE_SOURCES", "ebay, amazon-de,"),
            ],
            || {
                let config = Config::new().with_env();
                assert_eq!(config.proxy.as_deref(), Some("http://proxy:8080"));
                assert_eq!(config.delay_min_ms, 10);
                assert_eq!(config.delay_max_ms, 20);
                assert_eq!(config.timeout_secs, 7);
                assert_eq!(config.sources, vec!["ebay", "amazon-de"]);
            },
        );
    }

    #[test]
    fn test_config_with_env_invalid_values() {
        with_env_vars(&[("PRICE_DELAY_MIN", "not_a_number"), ("PRICE_TIMEOUT", "-1")], || {
            let config = Config::new().with_env();
            // Invalid values should be ignored, keeping defaults
            assert_eq!(config.delay_min_ms, 1000);
            assert_eq!(config.timeout_secs, 15);
        });
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            sources: vec!["all".to_string()],
            proxy: Some("socks5://localhost:1080".to_string()),
            format: OutputFormat::Csv,
            min_price: Some(5.0),
            ..Config::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.sources, config.sources);
        assert_eq!(parsed.proxy, config.proxy);
        assert_eq!(parsed.format, config.format);
        assert_eq!(parsed.min_price, config.min_price);
        assert_eq!(parsed.rates, config.rates);
    }
}
