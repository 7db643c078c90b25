use thiserror::Error;

#[derive(Error, Debug)]
pub enum FunnelError {
    #[error("workbook contains no sheets")]
    EmptyWorkbook,

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("workbook parsing failed: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, FunnelError>;
