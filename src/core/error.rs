use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unit not found: {0:?}")]
    UnitNotFound(crate::core::types::UnitId),

    #[error("Minefield not found: {0:?}")]
    MinefieldNotFound(crate::core::types::MinefieldId),

    #[error("Unknown unit removal condition code: {0}")]
    UnknownRemovalCondition(u8),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
