use thiserror::Error;

/// Result alias for core operations.
pub type LocksmithResult<T> = Result<T, LocksmithError>;

#[derive(Error, Debug)]
pub enum LocksmithError {
    #[error("[LS1000] io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("[LS1001] toml config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("[LS1002] yaml config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("[LS1100] configuration error: {0}")]
    InvalidConfig(String),

    #[error("[LS1200] invalid key `{key}`: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("[LS2000] external tool failure: {0}")]
    Process(String),

    #[error("[LS2100] no tag has been found")]
    TagNotFound,
}

impl LocksmithError {
    pub fn code(&self) -> &'static str {
        match self {
            LocksmithError::Io(_) => "LS1000",
            LocksmithError::Toml(_) => "LS1001",
            LocksmithError::Yaml(_) => "LS1002",
            LocksmithError::InvalidConfig(_) => "LS1100",
            LocksmithError::InvalidKey { .. } => "LS1200",
            LocksmithError::Process(_) => "LS2000",
            LocksmithError::TagNotFound => "LS2100",
        }
    }
}
