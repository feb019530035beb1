use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bundle format error: {0}")]
    Format(String),

    #[error("entry not found: {0}")]
    NotFound(String),

    #[error("cannot decode entry `{entry}`: {reason}")]
    Decode { entry: String, reason: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ChartError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
