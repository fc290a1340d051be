use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Malformed record '{customer_id}': field '{field}' is missing or non-numeric")]
    MalformedRecord { customer_id: String, field: String },

    #[error("Insufficient data: {needed} clusters require at least {needed} records, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Bad CLI/TOML input, fixable by the user.
    Config,
    /// A failure inside the segmentation pipeline.
    Processing,
    /// The environment failed us (filesystem, serialization).
    System,
}

impl EtlError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorSeverity::Config,
            EtlError::MalformedRecord { .. }
            | EtlError::InsufficientData { .. }
            | EtlError::ProcessingError { .. } => ErrorSeverity::Processing,
            EtlError::IoError(_) | EtlError::SerializationError(_) => ErrorSeverity::System,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Processing => 1,
            ErrorSeverity::Config => 2,
            ErrorSeverity::System => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
