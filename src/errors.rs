use thiserror::Error;

/// Error taxonomy for the orchestration layer.
///
/// Declaration problems surface as `Validation` before any cloud call is
/// attempted; `Deploy` covers materialization failures (conflicts, quota,
/// transport), which trigger a rollback of everything created so far.
#[derive(Debug, Error)]
pub enum StackError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid stack declaration: {0}")]
    Validation(String),

    #[error("Failed to synthesize template: {0}")]
    Synthesis(String),

    #[error("Failed to materialize stack: {0}")]
    Deploy(String),
}

impl From<serde_json::Error> for StackError {
    fn from(error: serde_json::Error) -> Self {
        StackError::Synthesis(error.to_string())
    }
}

impl From<std::io::Error> for StackError {
    fn from(error: std::io::Error) -> Self {
        StackError::Deploy(error.to_string())
    }
}

// Generic implementation for AWS SDK errors
impl<E, R> From<aws_sdk_s3::error::SdkError<E, R>> for StackError
where
    E: std::fmt::Debug,
    R: std::fmt::Debug,
{
    fn from(error: aws_sdk_s3::error::SdkError<E, R>) -> Self {
        StackError::Deploy(format!("{error:?}"))
    }
}
