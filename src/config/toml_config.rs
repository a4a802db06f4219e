use crate::config::{
    validate_provider, DEFAULT_ACTOR_TAG, DEFAULT_CONCURRENT_REQUESTS, DEFAULT_DELAY_MS,
    DEFAULT_LOCATION_TAG, DEFAULT_OUTPUT_FILENAME, DEFAULT_RETRY_ATTEMPTS,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_SECS,
};
use crate::core::matrix::DEFAULT_ACTOR_HEADER;
use crate::core::query::DEFAULT_ENDPOINT;
use crate::core::{ConfigProvider, UnmatchedRowPolicy};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// File-based run configuration.
///
/// ```toml
/// [input]
/// path = "staff.csv"
/// unmatched_rows = "fail"
///
/// [source]
/// timeout_seconds = 20
///
/// [fetch]
/// concurrent_requests = 3
///
/// [load]
/// output_path = "./out"
/// details_filename = "durations_detail.csv"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
    pub actor_tag: Option<String>,
    pub location_tag: Option<String>,
    #[serde(default)]
    pub unmatched_rows: UnmatchedRowPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    pub concurrent_requests: Option<usize>,
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_filename: Option<String>,
    pub details_filename: Option<String>,
    pub actor_header: Option<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: ".".to_string(),
            output_filename: None,
            details_filename: None,
            actor_header: None,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${INPUT_CSV})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let mut missing = None;
        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            })
        });

        match missing {
            Some(field) => Err(EtlError::MissingConfigError { field }),
            None => Ok(result.into_owned()),
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_filename(&self) -> &str {
        self.load
            .output_filename
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_FILENAME)
    }

    fn details_filename(&self) -> Option<&str> {
        self.load.details_filename.as_deref()
    }

    fn actor_tag(&self) -> &str {
        self.input.actor_tag.as_deref().unwrap_or(DEFAULT_ACTOR_TAG)
    }

    fn location_tag(&self) -> &str {
        self.input
            .location_tag
            .as_deref()
            .unwrap_or(DEFAULT_LOCATION_TAG)
    }

    fn actor_header(&self) -> &str {
        self.load
            .actor_header
            .as_deref()
            .unwrap_or(DEFAULT_ACTOR_HEADER)
    }

    fn unmatched_rows(&self) -> UnmatchedRowPolicy {
        self.input.unmatched_rows
    }

    fn endpoint(&self) -> &str {
        self.source.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    fn max_concurrent_requests(&self) -> usize {
        self.fetch
            .concurrent_requests
            .unwrap_or(DEFAULT_CONCURRENT_REQUESTS)
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(self.fetch.delay_ms.unwrap_or(DEFAULT_DELAY_MS))
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    fn retry_attempts(&self) -> u32 {
        self.source.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS)
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.source.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
