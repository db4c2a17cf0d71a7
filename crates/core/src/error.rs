use thiserror::Error;

#[derive(Error, Debug)]
pub enum TitlecastError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Presence feed error: {0}")]
    Feed(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for TitlecastError {
    fn from(e: serde_json::Error) -> Self {
        TitlecastError::Serialize(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TitlecastError>;
