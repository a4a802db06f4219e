use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cannot read input file '{path}': {message}")]
    InputFileError { path: String, message: String },

    #[error("Cannot extract route summary: {message}")]
    ExtractionError { message: String },

    #[error("Row {line} matches neither actor nor location tag: {row:?}")]
    UnmatchedRowError { line: usize, row: Vec<String> },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Input,
    Output,
    Config,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::HttpError(_) | EtlError::HttpStatusError { .. } => ErrorCategory::Network,
            EtlError::InputFileError { .. }
            | EtlError::CsvError(_)
            | EtlError::UnmatchedRowError { .. } => ErrorCategory::Input,
            EtlError::IoError(_) | EtlError::SerializationError(_) => ErrorCategory::Output,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Config,
            EtlError::ExtractionError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Processing => ErrorSeverity::Low,
            ErrorCategory::Input | ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            EtlError::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            EtlError::HttpStatusError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::InputFileError { path, .. } => {
                format!("Could not open the input file '{}'", path)
            }
            EtlError::UnmatchedRowError { line, .. } => {
                format!("Input row {} is neither a teacher nor a school", line)
            }
            EtlError::IoError(_) => "Could not write the output file".to_string(),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity or raise --timeout-secs",
            ErrorCategory::Input => "Check the input CSV path and that every row carries a known tag",
            ErrorCategory::Output => "Check that the output directory exists and is writable",
            ErrorCategory::Config => "Fix the configuration value named above",
            ErrorCategory::Processing => "The route page layout may have changed",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
