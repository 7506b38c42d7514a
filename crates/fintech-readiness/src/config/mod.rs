use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::catalog::TopicMatchMode;
use crate::document::DEFAULT_MAX_DOCUMENT_BYTES;
use crate::workflows::readiness::{CapitalPolicy, GapSettings, DEFAULT_MAX_TEXT_CHARS};

const DEFAULT_CATALOG_PATH: &str = "resource_mapping.json";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            analysis: AnalysisConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the catalogs live and how documents are scanned.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub catalog_path: PathBuf,
    /// Rule table on disk; the bundled standard table is used when unset.
    pub rules_path: Option<PathBuf>,
    pub topic_match: TopicMatchMode,
    pub gaps: GapSettings,
    /// Route raised gap flags to matching specialists as well as topics.
    pub gap_routes: bool,
    pub max_document_bytes: usize,
    pub max_text_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            rules_path: None,
            topic_match: TopicMatchMode::default(),
            gaps: GapSettings::default(),
            gap_routes: false,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

impl AnalysisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = env::var("APP_CATALOG_PATH") {
            config.catalog_path = PathBuf::from(path);
        }
        config.rules_path = env::var("APP_RULES_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        if let Ok(raw) = env::var("APP_TOPIC_MATCH") {
            config.topic_match =
                TopicMatchMode::parse(&raw).ok_or(ConfigError::InvalidMatchMode(raw))?;
        }

        if let Ok(raw) = env::var("APP_RESIDENCY_INDICATORS") {
            config.gaps.residency_indicators = raw
                .split(',')
                .map(str::trim)
                .filter(|indicator| !indicator.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(raw) = env::var("APP_CAPITAL_POLICY") {
            config.gaps.capital_policy =
                CapitalPolicy::parse(&raw).ok_or(ConfigError::InvalidCapitalPolicy(raw))?;
        }
        if let Ok(raw) = env::var("APP_CAPITAL_CURRENCY") {
            if raw.trim().is_empty() {
                return Err(ConfigError::EmptyCurrency);
            }
            config.gaps.capital_currency = raw.trim().to_string();
        }
        config.gaps.required_capital =
            parse_number("APP_REQUIRED_CAPITAL", config.gaps.required_capital)?;

        config.gap_routes = parse_flag("APP_GAP_ROUTES", config.gap_routes)?;

        config.max_document_bytes = parse_number("APP_MAX_DOCUMENT_BYTES", config.max_document_bytes)?;
        config.max_text_chars = parse_number("APP_MAX_TEXT_CHARS", config.max_text_chars)?;

        Ok(config)
    }
}

fn parse_number<T>(variable: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .replace('_', "")
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { variable }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(variable: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(variable) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::InvalidFlag { variable }),
        },
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str },
    InvalidFlag { variable: &'static str },
    InvalidMatchMode(String),
    InvalidCapitalPolicy(String),
    EmptyCurrency,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{} must be a non-negative integer", variable)
            }
            ConfigError::InvalidFlag { variable } => {
                write!(f, "{} must be true or false", variable)
            }
            ConfigError::InvalidMatchMode(value) => write!(
                f,
                "APP_TOPIC_MATCH '{}' must be one of literal, word_boundary, pattern",
                value
            ),
            ConfigError::InvalidCapitalPolicy(value) => write!(
                f,
                "APP_CAPITAL_POLICY '{}' must be flag_for_review or presence_implies_met",
                value
            ),
            ConfigError::EmptyCurrency => write!(f, "APP_CAPITAL_CURRENCY must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
