pub type WatermarkResult<T> = Result<T, WatermarkError>;

#[derive(thiserror::Error, Debug)]
pub enum WatermarkError {
    /// Argument missing or of the wrong kind.
    #[error("type error: {0}")]
    Type(String),

    /// Argument of the right kind but outside its domain.
    #[error("value error: {0}")]
    Value(String),

    #[error("font error: {0}")]
    Font(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WatermarkError {
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::Type(msg.into())
    }

    pub fn value(msg: impl Into<String>) -> Self {
        Self::Value(msg.into())
    }

    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    pub fn is_type_error(&self) -> bool {
        matches!(self, Self::Type(_))
    }

    pub fn is_value_error(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}
