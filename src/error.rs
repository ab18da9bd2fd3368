use thiserror::Error;

#[derive(Error, Debug)]
pub enum BedrockError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Base64 decode error: {0}")]
    DecodeError(#[from] base64::DecodeError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("AWS error: {0}")]
    AwsError(String),

    #[error("AWS service error: {0}")]
    AwsServiceError(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BedrockError {
    /// Message safe to show an end user. Details stay in the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            BedrockError::InvalidInput(_) => "Error processing user inputs",
            BedrockError::ImageError(_) | BedrockError::DecodeError(_) => {
                "Error processing image"
            }
            BedrockError::AwsError(_)
            | BedrockError::AwsServiceError(_)
            | BedrockError::ResponseError(_) => "An error occurred while generating images",
            _ => "An unexpected error occurred. Please try again later.",
        }
    }
}

pub type Result<T> = std::result::Result<T, BedrockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = BedrockError::ResponseError("No images returned from the model".into());
        assert_eq!(
            err.to_string(),
            "Response error: No images returned from the model"
        );

        let err = BedrockError::AwsServiceError("ValidationException - bad".into());
        assert!(err.to_string().starts_with("AWS service error"));
    }

    #[test]
    fn test_user_messages_are_generic() {
        let err = BedrockError::AwsError("dispatch failure: timeout".into());
        assert_eq!(err.user_message(), "An error occurred while generating images");
        assert!(!err.user_message().contains("timeout"));

        let err = BedrockError::InvalidInput("position out of range".into());
        assert_eq!(err.user_message(), "Error processing user inputs");
    }

    #[test]
    fn test_from_serde_error() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: BedrockError = parse.unwrap_err().into();
        assert!(matches!(err, BedrockError::SerializationError(_)));
    }
}
