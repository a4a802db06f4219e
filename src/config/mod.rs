pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_distinct_tags, validate_file_name, validate_non_empty_string, validate_path,
    validate_range, validate_url,
};

pub const DEFAULT_OUTPUT_FILENAME: &str = "durations.csv";
pub const DEFAULT_ACTOR_TAG: &str = "Teacher";
pub const DEFAULT_LOCATION_TAG: &str = "School";
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 5;
pub const MAX_CONCURRENT_REQUESTS: usize = 100;
pub const DEFAULT_DELAY_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 2;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;

/// Checks shared by every config source.
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_path("input", config.input_path())?;
    validate_path("output_path", config.output_path())?;
    validate_file_name("output_filename", config.output_filename())?;
    if let Some(details) = config.details_filename() {
        validate_file_name("details_filename", details)?;
    }
    validate_distinct_tags(config.actor_tag(), config.location_tag())?;
    validate_non_empty_string("actor_header", config.actor_header())?;
    validate_url("endpoint", config.endpoint())?;
    validate_range(
        "concurrent_requests",
        config.max_concurrent_requests(),
        1,
        MAX_CONCURRENT_REQUESTS,
    )?;
    validate_range("timeout_secs", config.request_timeout().as_secs(), 1, 600)?;
    validate_range("retry_attempts", config.retry_attempts(), 0, 10)?;
    Ok(())
}

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use super::*;
    use crate::core::query::DEFAULT_ENDPOINT;
    use crate::core::matrix::DEFAULT_ACTOR_HEADER;
    use crate::core::UnmatchedRowPolicy;
    use crate::utils::validation::Validate;
    use clap::Args;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Clone, Serialize, Deserialize, Args)]
    pub struct CliConfig {
        /// Input CSV: tag,name,address rows after a header
        #[arg(short, long, default_value = "input.csv")]
        pub input: String,

        /// Directory the output files are written to
        #[arg(long, default_value = ".")]
        pub output_path: String,

        #[arg(long, default_value = DEFAULT_OUTPUT_FILENAME)]
        pub output_filename: String,

        /// Also write a per-pair CSV with arrival times and errors
        #[arg(long)]
        pub details_filename: Option<String>,

        #[arg(long, default_value = DEFAULT_ACTOR_TAG)]
        pub actor_tag: String,

        #[arg(long, default_value = DEFAULT_LOCATION_TAG)]
        pub location_tag: String,

        #[arg(long, default_value = DEFAULT_ACTOR_HEADER)]
        pub actor_header: String,

        #[arg(long, value_enum, default_value_t = UnmatchedRowPolicy::Warn)]
        pub unmatched_rows: UnmatchedRowPolicy,

        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        pub endpoint: String,

        #[arg(long, default_value_t = DEFAULT_CONCURRENT_REQUESTS)]
        pub concurrent_requests: usize,

        /// Pause before each request, in milliseconds
        #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
        pub delay_ms: u64,

        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        pub timeout_secs: u64,

        #[arg(long, default_value_t = DEFAULT_RETRY_ATTEMPTS)]
        pub retry_attempts: u32,

        #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_MS)]
        pub retry_delay_ms: u64,
    }

    impl CliConfig {
        /// Defaults for everything but the input file.
        pub fn with_input(input: impl Into<String>) -> Self {
            Self {
                input: input.into(),
                output_path: ".".to_string(),
                output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
                details_filename: None,
                actor_tag: DEFAULT_ACTOR_TAG.to_string(),
                location_tag: DEFAULT_LOCATION_TAG.to_string(),
                actor_header: DEFAULT_ACTOR_HEADER.to_string(),
                unmatched_rows: UnmatchedRowPolicy::Warn,
                endpoint: DEFAULT_ENDPOINT.to_string(),
                concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
                delay_ms: DEFAULT_DELAY_MS,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                retry_attempts: DEFAULT_RETRY_ATTEMPTS,
                retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            }
        }
    }

    impl ConfigProvider for CliConfig {
        fn input_path(&self) -> &str {
            &self.input
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_filename(&self) -> &str {
            &self.output_filename
        }

        fn details_filename(&self) -> Option<&str> {
            self.details_filename.as_deref()
        }

        fn actor_tag(&self) -> &str {
            &self.actor_tag
        }

        fn location_tag(&self) -> &str {
            &self.location_tag
        }

        fn actor_header(&self) -> &str {
            &self.actor_header
        }

        fn unmatched_rows(&self) -> UnmatchedRowPolicy {
            self.unmatched_rows
        }

        fn endpoint(&self) -> &str {
            &self.endpoint
        }

        fn max_concurrent_requests(&self) -> usize {
            self.concurrent_requests
        }

        fn request_delay(&self) -> Duration {
            Duration::from_millis(self.delay_ms)
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(self.timeout_secs)
        }

        fn retry_attempts(&self) -> u32 {
            self.retry_attempts
        }

        fn retry_delay(&self) -> Duration {
            Duration::from_millis(self.retry_delay_ms)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_provider(self)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::utils::error::EtlError;
        use clap::Parser;

        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            config: CliConfig,
        }

        #[test]
        fn test_cli_defaults_match_original_behaviour() {
            let cli = TestCli::parse_from(["train-times", "--input", "staff.csv"]);
            let config = cli.config;
            assert_eq!(config.input_path(), "staff.csv");
            assert_eq!(config.output_filename(), "durations.csv");
            assert_eq!(config.request_delay(), Duration::from_secs(1));
            assert_eq!(config.unmatched_rows(), UnmatchedRowPolicy::Warn);
            assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_cli_overrides() {
            let cli = TestCli::parse_from([
                "train-times",
                "--unmatched-rows",
                "fail",
                "--concurrent-requests",
                "2",
                "--details-filename",
                "detail.csv",
            ]);
            assert_eq!(cli.config.unmatched_rows(), UnmatchedRowPolicy::Fail);
            assert_eq!(cli.config.max_concurrent_requests(), 2);
            assert_eq!(cli.config.details_filename(), Some("detail.csv"));
        }

        #[test]
        fn test_zero_concurrency_rejected() {
            let mut config = CliConfig::with_input("staff.csv");
            config.concurrent_requests = 0;
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_oversized_concurrency_rejected() {
            let mut config = CliConfig::with_input("staff.csv");
            config.concurrent_requests = MAX_CONCURRENT_REQUESTS;
            assert!(config.validate().is_ok());

            config.concurrent_requests = usize::MAX;
            match config.validate() {
                Err(EtlError::InvalidConfigValueError { field, .. }) => {
                    assert_eq!(field, "concurrent_requests")
                }
                other => panic!("expected InvalidConfigValueError, got {:?}", other),
            }
        }
    }
}
