/// Result alias that carries the custom [`FireworksError`] type.
pub type Result<T> = std::result::Result<T, FireworksError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum FireworksError {
    /// Free-form error used where no richer variant applies yet.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A caller handed the core something it cannot work with.
    #[error("{0}")]
    InvalidInput(&'static str),
    /// The drawing surface could not be created or written out.
    #[error("render: {0}")]
    Render(String),
    /// A font blob could not be parsed into a usable face.
    #[error("font: {0}")]
    Font(String),
}

impl FireworksError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for FireworksError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for FireworksError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
