use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Invalid combination of arguments
    #[error("Usage error: {0}")]
    Usage(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Library database error
    #[error("Database error: {0}")]
    Database(String),

    /// Plex or TMDB client setup failed
    #[error("Client error: {0}")]
    Client(String),

    /// Collection could not be resolved or applied
    #[error("Collection error: {0}")]
    Collection(String),

    /// Bulk sync could not run or had failures
    #[error("Sync error: {0}")]
    Sync(String),

    /// One or more server actions failed
    #[error("{0}")]
    Action(String),
}

impl CliError {
    pub(crate) fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub(crate) fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }

    pub(crate) fn collection(msg: impl Into<String>) -> Self {
        Self::Collection(msg.into())
    }

    pub(crate) fn sync(msg: impl Into<String>) -> Self {
        Self::Sync(msg.into())
    }

    pub(crate) fn action(msg: impl Into<String>) -> Self {
        Self::Action(msg.into())
    }
}
