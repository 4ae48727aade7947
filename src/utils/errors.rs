use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FdmError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Malformed input: {0}")]
    Malformed(String),

    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParameters(Vec<String>),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Config error: {0}")]
    InvalidConfig(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML write error: {0}")]
    Xml(String),

    #[error("Engine error: {0}")]
    Engine(String),
}

impl FdmError {
    /// Process exit code used by the pipeline binaries.
    pub fn exit_code(&self) -> i32 {
        match self {
            FdmError::MissingFile(_) => 1,
            FdmError::Malformed(_)
            | FdmError::MissingParameters(_)
            | FdmError::InvalidValue(_)
            | FdmError::InvalidConfig(_)
            | FdmError::Yaml(_)
            | FdmError::Json(_) => 2,
            FdmError::Io(_) | FdmError::Xml(_) => 3,
            FdmError::Engine(_) => 4,
        }
    }
}

impl From<csv::Error> for FdmError {
    fn from(e: csv::Error) -> Self {
        FdmError::Malformed(e.to_string())
    }
}

impl From<quick_xml::Error> for FdmError {
    fn from(e: quick_xml::Error) -> Self {
        FdmError::Xml(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FdmError>;
