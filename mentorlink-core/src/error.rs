use thiserror::Error;

#[derive(Error, Debug)]
pub enum MentorlinkError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Other error: {0}")]
    Other(String),
}

impl MentorlinkError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// True for failures the user can fix by changing their input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound(_) | Self::Unauthorized
        )
    }
}
