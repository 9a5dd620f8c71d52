use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObservatoryError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Data source {url} answered with HTTP {status}")]
    FetchStatusError { url: String, status: u16 },

    #[error("Unexpected payload: {message}")]
    PayloadError { message: String },

    #[error("Basemap error: {message}")]
    BasemapError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ObservatoryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::FetchStatusError { .. } | Self::BasemapError { .. } => {
                ErrorCategory::Network
            }
            Self::PayloadError { .. } | Self::SerializationError(_) | Self::CsvError(_) => {
                ErrorCategory::Data
            }
            Self::IoError(_) => ErrorCategory::Storage,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 底圖失敗只影響地圖
            Self::BasemapError { .. } => ErrorSeverity::Low,
            Self::ApiError(_) | Self::FetchStatusError { .. } => ErrorSeverity::Medium,
            Self::PayloadError { .. } | Self::SerializationError(_) | Self::CsvError(_) => {
                ErrorSeverity::High
            }
            Self::IoError(_) => ErrorSeverity::Critical,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ApiError(_) => {
                "Check network connectivity and that the data endpoint is reachable".to_string()
            }
            Self::FetchStatusError { status, .. } if *status >= 500 => {
                "The data server is failing; try again later".to_string()
            }
            Self::FetchStatusError { .. } => {
                "Verify the --api-endpoint path and any required access rights".to_string()
            }
            Self::PayloadError { .. } | Self::SerializationError(_) => {
                "The endpoint must return a JSON array of job postings".to_string()
            }
            Self::BasemapError { .. } => {
                "The map view is disabled; check --basemap-endpoint".to_string()
            }
            Self::CsvError(_) | Self::IoError(_) => {
                "Check that the output path exists and is writable".to_string()
            }
            Self::ConfigError { .. } => "Review the configuration file syntax".to_string(),
            Self::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' and run again", field)
            }
            Self::MissingConfigError { field } => {
                format!("Provide '{}' via the command line or the config file", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not fetch data: {}", self),
            ErrorCategory::Data => format!("The dataset could not be read: {}", self),
            ErrorCategory::Storage => format!("Could not write the results: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ObservatoryError>;
