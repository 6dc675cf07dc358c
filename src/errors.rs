use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid preferences json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("invalid catalog json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("table defined twice in catalog: {0}")]
    DuplicateTable(String),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AnimationError {
    #[error("no tokio runtime available to drive the animation timer")]
    NoRuntime,
}
