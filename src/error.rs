use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Location '{0}' is already registered")]
    DuplicateLocation(String),
    #[error("Unknown location '{0}'")]
    UnknownLocation(String),
    #[error("Unknown node {0}")]
    UnknownNode(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WorldError>;
