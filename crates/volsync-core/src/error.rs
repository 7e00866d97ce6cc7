use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while parsing addresses or building configuration
#[derive(Error, Debug)]
pub enum CoreError {
    /// Not a dotted-quad IPv4 address
    #[error("invalid IPv4 address: {0}")]
    InvalidAddress(String),

    /// Sync type is not one of NEXT, FIRST or ALL
    #[error("unknown sync type: {0}")]
    UnknownStrategy(String),

    /// Extra tool arguments could not be tokenized
    #[error("invalid extra arguments: {0}")]
    ExtraArgs(String),

    /// Configuration file is malformed
    #[error("config error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
