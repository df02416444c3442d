use serde::Serialize;

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(
        #[from]
        #[serde(skip)]
        std::io::Error,
    ),

    #[error("Serialization error: {0}")]
    Serialization(
        #[from]
        #[serde(skip)]
        serde_json::Error,
    ),
}

impl ServiceError {
    /// Convenience constructor for collaborator failures that carry only a message.
    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::Internal(message.into())
    }

    /// Short machine-readable code, used in structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::InvalidCoordinate(_) => "invalid_coordinate",
            ServiceError::Catalog(_) => "catalog_error",
            ServiceError::Config(_) => "config_error",
            ServiceError::Internal(_) => "internal_error",
            ServiceError::Io(_) => "io_error",
            ServiceError::Serialization(_) => "serialization_error",
        }
    }
}
