use thiserror::Error;

#[derive(Debug, Error)]
pub enum JikkoError {
    #[error("invalid command path '{0}': segments must be non-empty and must not start with '-'")]
    InvalidCommandPath(String),

    #[error("command already registered: {0}")]
    DuplicateCommand(String),

    #[error("'{path}' maps to handler {identifier}, already taken by '{existing}'")]
    IdentifierCollision {
        path: String,
        identifier: String,
        existing: String,
    },

    #[error("invalid config {path}: {reason}")]
    ConfigParse { path: String, reason: String },

    #[error("'{command}' exited with status {code}")]
    CommandFailed { command: String, code: i32 },

    #[error("'{0}' not found on PATH")]
    ToolNotFound(String),

    #[error("version not found in {0}")]
    VersionNotFound(String),

    #[error("no supported project found (looked for Cargo.toml, pyproject.toml, package.json, lib/**/version.rb)")]
    NoProjectFound,

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, JikkoError>;
