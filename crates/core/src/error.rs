use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read {path}: {source}", path = path.display())]
    FileRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}", path = path.display())]
    FileWrite {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create output directory: {0}")]
    OutputDirCreation(std::io::Error),
    #[error("failed to serialize JSON: {0}")]
    JsonSerialization(serde_json::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
}

pub type SchemaResult<T> = std::result::Result<T, SchemaError>;
