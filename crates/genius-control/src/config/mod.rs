use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

const DEFAULT_SOURCE_DIR: &str = "/var/www/python/genius-control/source";
const DEFAULT_PRICE_USERNAME: &str = "Apgo";
const DEFAULT_REPORT_LIMIT: usize = 20;

/// Distinguishes runtime behavior for different deployments of the audits.
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

/// Top-level configuration for the audit runs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub sources: SourceConfig,
    pub audit: AuditConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("GENIUS_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let source_dir =
            env::var("GENIUS_SOURCE_DIR").unwrap_or_else(|_| DEFAULT_SOURCE_DIR.to_string());
        let sources = SourceConfig::new(source_dir)?;

        let price_username = env::var("GENIUS_PRICE_USERNAME")
            .unwrap_or_else(|_| DEFAULT_PRICE_USERNAME.to_string())
            .trim()
            .to_string();
        if price_username.is_empty() {
            return Err(ConfigError::EmptyUsername);
        }

        let report_limit = match env::var("GENIUS_REPORT_LIMIT") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidReportLimit { value: raw })?,
            Err(_) => DEFAULT_REPORT_LIMIT,
        };

        let log_level = env::var("GENIUS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            sources,
            audit: AuditConfig {
                price_username,
                report_limit,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Location of the exported CSV files the audits read.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub source_dir: PathBuf,
}

impl SourceConfig {
    pub fn new(source_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let source_dir = source_dir.into();
        if source_dir.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(ConfigError::EmptySourceDir);
        }
        Ok(Self { source_dir })
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn parcel_csv(&self) -> PathBuf {
        self.source_dir.join("parcel_dimension.csv")
    }

    pub fn no_genius_dir(&self) -> PathBuf {
        self.source_dir.join("no_genius")
    }

    pub fn emag_clubs_csv(&self) -> PathBuf {
        self.source_dir.join("emag_clubs_01.csv")
    }
}

/// Knobs shared by the audit reports.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub price_username: String,
    pub report_limit: usize,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptySourceDir,
    EmptyUsername,
    InvalidReportLimit { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptySourceDir => write!(f, "GENIUS_SOURCE_DIR must not be blank"),
            ConfigError::EmptyUsername => write!(
                f,
                "price username must not be blank (GENIUS_PRICE_USERNAME or --username)"
            ),
            ConfigError::InvalidReportLimit { value } => {
                write!(f, "GENIUS_REPORT_LIMIT must be a non-negative integer, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
