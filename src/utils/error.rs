use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotoMapError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("EXIF parsing error: {0}")]
    ExifError(#[from] exif::Error),

    #[error("Background task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Images directory not found: {}", path.display())]
    ImagesDirNotFound { path: PathBuf },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PhotoMapError {
    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::ImagesDirNotFound { .. } => ErrorCategory::Input,
            Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::ImageError(_)
            | Self::ExifError(_)
            | Self::ProcessingError { .. } => ErrorCategory::Processing,
            Self::IoError(_) | Self::TaskError(_) => ErrorCategory::System,
        }
    }

    /// Maps onto the process exit code: Low 0, Medium 2, High 1, Critical 3.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ConfigValidationError { field, .. } => {
                format!("Check the '{}' setting in your configuration file", field)
            }
            Self::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' and run again", field)
            }
            Self::MissingConfigError { field } => {
                format!("Add the '{}' field to your configuration", field)
            }
            Self::ImagesDirNotFound { .. } => {
                "Pass an existing folder with --images, or try --demo".to_string()
            }
            Self::IoError(_) => {
                "Check that the output directory is writable and the disk is not full".to_string()
            }
            Self::CsvError(_) | Self::SerializationError(_) => {
                "Re-run with --verbose to see which record could not be written".to_string()
            }
            Self::ImageError(_) | Self::ExifError(_) => {
                "The file may be corrupt or in an unsupported format".to_string()
            }
            Self::TaskError(_) | Self::ProcessingError { .. } => {
                "Re-run with --verbose for details".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Input problem: {}", self),
            ErrorCategory::Processing => format!("Processing failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

impl From<toml::de::Error> for PhotoMapError {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, PhotoMapError>;

/// Runs `f`, turning a panic into a `ProcessingError` carrying the panic message.
/// Used around third-party decoders so one malformed file cannot abort a run.
pub fn catch_panic<T>(f: impl FnOnce() -> T) -> Result<T> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        PhotoMapError::processing(format!("panic: {}", message))
    })
}
