use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Content store request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Content store returned {status}: {description}")]
    StoreError { status: u16, description: String },

    #[error("Unexpected content store response: {message}")]
    UnexpectedResponse { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Response,
    Configuration,
    Input,
    System,
}

impl ContentError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ContentError::HttpError(_) => ErrorCategory::Transport,
            ContentError::StoreError { .. }
            | ContentError::UnexpectedResponse { .. }
            | ContentError::SerializationError(_) => ErrorCategory::Response,
            ContentError::ConfigError { .. }
            | ContentError::InvalidConfigValueError { .. }
            | ContentError::MissingConfigError { .. }
            | ContentError::UrlError(_) => ErrorCategory::Configuration,
            ContentError::ValidationError { .. } => ErrorCategory::Input,
            ContentError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Transport => "Check network access to the content store host",
            ErrorCategory::Response => "Check the dataset contents and the API version in use",
            ErrorCategory::Configuration => {
                "Set SANITY_PROJECT_ID (lowercase letters, digits, dashes) and SANITY_DATASET"
            }
            ErrorCategory::Input => "Check the supplied filter values",
            ErrorCategory::System => "Check that the file exists and is readable",
        }
    }
}

pub type Result<T> = std::result::Result<T, ContentError>;
