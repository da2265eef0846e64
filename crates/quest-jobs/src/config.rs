//! Configuration loading for the Quest jobs.
//!
//! Settings live in `quest-config.yaml` (path overridable through
//! `QUEST_CONFIG`). Every section and field has a default, so an absent file
//! or an empty document is a valid configuration. Environment variables are
//! applied on top of the file.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `DATA_BUCKET` | `storage.bucket` |
//! | `STORE_BACKEND` | `storage.backend` (`memory`, `local`, `s3`) |
//! | `STORE_ROOT` | `storage.root` |
//! | `BLS_PREFIX` | `bls.prefix` |
//! | `BLS_INDEX_URL` | `bls.index_url` |
//! | `POPULATION_RAW_PREFIX` | `population.raw_prefix` |
//! | `POPULATION_TABLE_PREFIX` | `population.table_prefix` |
//! | `DATAUSA_API_URL` | `population.api_url` |
//! | `ANALYTICS_OUTPUT_PREFIX` | `analytics.output_prefix` |
//! | `CONTACT_EMAIL` | `http.contact_email` |
//! | `HTTP_TIMEOUT_SECS` | `http.timeout_secs` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use quest_analytics::AnalyticsConfig;
use quest_ingest::bls::DEFAULT_INDEX_URL;
use quest_ingest::population::DEFAULT_API_URL;
use quest_ingest::{BlsSyncConfig, DataUsaConfig};
use quest_types::StoreLocation;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "QUEST_CONFIG";

/// Configuration file used when [`CONFIG_PATH_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "quest-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override holds an unusable value.
    #[error("invalid {var}: {message}")]
    Invalid {
        /// The offending variable.
        var: String,
        /// What was wrong with it.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

/// Top-level job configuration. Mirrors `quest-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobConfig {
    /// Object store selection and bucket.
    #[serde(default)]
    pub storage: StorageConfig,

    /// BLS mirror settings.
    #[serde(default)]
    pub bls: BlsConfig,

    /// DataUSA population settings.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Analytics output settings.
    #[serde(default)]
    pub analytics: AnalyticsOutputConfig,

    /// Outbound HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Which object store implementation backs the jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-local, discarded on exit.
    Memory,
    /// One directory per bucket under `storage.root`.
    #[default]
    Local,
    /// Amazon S3, credentials from the `AWS_*` environment.
    S3,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "local" => Ok(Self::Local),
            "s3" => Ok(Self::S3),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// Object store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Backend implementation.
    #[serde(default)]
    pub backend: BackendKind,

    /// Root directory for the `local` backend.
    #[serde(default = "default_store_root")]
    pub root: PathBuf,

    /// Bucket holding every dataset.
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            root: default_store_root(),
            bucket: default_bucket(),
        }
    }
}

/// BLS mirror settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlsConfig {
    /// Destination prefix.
    #[serde(default = "default_bls_prefix")]
    pub prefix: String,

    /// Directory listing to mirror.
    #[serde(default = "default_index_url")]
    pub index_url: String,
}

impl Default for BlsConfig {
    fn default() -> Self {
        Self {
            prefix: default_bls_prefix(),
            index_url: default_index_url(),
        }
    }
}

/// DataUSA population settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Prefix for the raw API response.
    #[serde(default = "default_raw_prefix")]
    pub raw_prefix: String,

    /// Prefix for the normalized tables.
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,

    /// Population API URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            raw_prefix: default_raw_prefix(),
            table_prefix: default_table_prefix(),
            api_url: default_api_url(),
        }
    }
}

/// Analytics output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AnalyticsOutputConfig {
    /// Prefix for the result objects. Results are not persisted when unset.
    #[serde(default)]
    pub output_prefix: Option<String>,
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Contact address sent in the `User-Agent` header.
    #[serde(default = "default_contact_email")]
    pub contact_email: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl HttpConfig {
    /// Per-request timeout.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            contact_email: default_contact_email(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl JobConfig {
    /// Load the configuration the binaries use: the file named by
    /// `QUEST_CONFIG` (or [`DEFAULT_CONFIG_PATH`]), then the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed, or if an override is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        let mut config = Self::from_optional_file(Path::new(&path))?;
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Parse the file at `path`, or return defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for read errors other than a missing file,
    /// or [`ConfigError::Yaml`] for invalid content.
    pub fn from_optional_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse configuration from a YAML string. Environment overrides are not
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `STORE_BACKEND` or
    /// `HTTP_TIMEOUT_SECS` cannot be parsed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |var: &str, field: &mut String| {
            if let Some(val) = lookup(var) {
                *field = val;
            }
        };
        set("DATA_BUCKET", &mut self.storage.bucket);
        set("BLS_PREFIX", &mut self.bls.prefix);
        set("BLS_INDEX_URL", &mut self.bls.index_url);
        set("POPULATION_RAW_PREFIX", &mut self.population.raw_prefix);
        set("POPULATION_TABLE_PREFIX", &mut self.population.table_prefix);
        set("DATAUSA_API_URL", &mut self.population.api_url);
        set("CONTACT_EMAIL", &mut self.http.contact_email);

        if let Some(val) = lookup("STORE_ROOT") {
            self.storage.root = PathBuf::from(val);
        }
        if let Some(val) = lookup("ANALYTICS_OUTPUT_PREFIX") {
            self.analytics.output_prefix = Some(val).filter(|p| !p.is_empty());
        }
        if let Some(val) = lookup("STORE_BACKEND") {
            self.storage.backend = val.parse().map_err(|message| ConfigError::Invalid {
                var: String::from("STORE_BACKEND"),
                message,
            })?;
        }
        if let Some(val) = lookup("HTTP_TIMEOUT_SECS") {
            self.http.timeout_secs = val.trim().parse().map_err(|e| ConfigError::Invalid {
                var: String::from("HTTP_TIMEOUT_SECS"),
                message: format!("{e}"),
            })?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Component configs
    // -----------------------------------------------------------------------

    /// Settings for the BLS sync.
    pub fn bls_sync(&self) -> BlsSyncConfig {
        BlsSyncConfig {
            bucket: self.storage.bucket.clone(),
            prefix: self.bls.prefix.clone(),
            index_url: self.bls.index_url.clone(),
        }
    }

    /// Settings for the population fetch.
    pub fn datausa(&self) -> DataUsaConfig {
        DataUsaConfig {
            bucket: self.storage.bucket.clone(),
            raw_prefix: self.population.raw_prefix.clone(),
            table_prefix: self.population.table_prefix.clone(),
            api_url: self.population.api_url.clone(),
        }
    }

    /// Settings for the analytics run, reading what the ingest job writes.
    pub fn analytics(&self) -> AnalyticsConfig {
        let bucket = &self.storage.bucket;
        let config = AnalyticsConfig::new(
            StoreLocation::new(bucket, &self.bls.prefix),
            StoreLocation::new(bucket, &self.population.table_prefix),
        );
        match &self.analytics.output_prefix {
            Some(prefix) => config.with_output(StoreLocation::new(bucket, prefix)),
            None => config,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (required by serde's `default = "..."` attribute)
// ---------------------------------------------------------------------------

fn default_store_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_bucket() -> String {
    "placeholder-bucket".to_owned()
}

fn default_bls_prefix() -> String {
    "bls/".to_owned()
}

fn default_index_url() -> String {
    DEFAULT_INDEX_URL.to_owned()
}

fn default_raw_prefix() -> String {
    "population/raw/".to_owned()
}

fn default_table_prefix() -> String {
    "population/tables/".to_owned()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_contact_email() -> String {
    "data@example.com".to_owned()
}

const fn default_timeout_secs() -> u64 {
    30
}
