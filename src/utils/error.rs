use thiserror::Error;

#[derive(Error, Debug)]
pub enum FaultEtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("{message}")]
    ValidationError {
        message: String,
        details: Vec<String>,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Chart rendering error: {message}")]
    ChartError { message: String },
}

pub type Result<T> = std::result::Result<T, FaultEtlError>;
