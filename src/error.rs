use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum HearthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Validation(String),

    #[error("Unknown {kind}: {id}")]
    UnknownItem { kind: &'static str, id: i64 },

    #[error("Not logged in. Run `hearth login --token <TOKEN>` first.")]
    NotLoggedIn,
}

pub type Result<T> = std::result::Result<T, HearthError>;
