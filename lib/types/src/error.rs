/// Error taxonomy shared by every core crate. Variant names match the
/// "kinds, not type names" taxonomy in the design notes — callers
/// match on variants, not on message text, except for the port
/// classifier which is documented as string-matching by design.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("already exists: {0}")]
  AlreadyExists(String),

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("unsupported: {0}")]
  Unsupported(String),

  #[error("port in use: {0}")]
  PortInUse(String),

  #[error("not ready: {0}")]
  NotReady(String),

  #[error("not running: {0}")]
  NotRunning(String),

  #[error("already running: {0}")]
  AlreadyRunning(String),

  #[error("binary missing: {engine} ({hint})")]
  BinaryMissing { engine: String, hint: String },

  #[error("failed to spawn process: {0}")]
  SpawnError(String),

  #[error("process exited non-zero ({code}): {stderr}")]
  NonZeroExit { code: i32, stderr: String },

  #[error("io error: {0}")]
  Io(String),

  #[error("network error: {0}")]
  Network(String),

  #[error("corrupt artifact: {0}")]
  CorruptArtifact(String),

  #[error("timeout: {0}")]
  Timeout(String),
}

impl From<std::io::Error> for Error {
  fn from(e: std::io::Error) -> Self {
    Error::Io(e.to_string())
  }
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self {
    Error::CorruptArtifact(e.to_string())
  }
}

pub type Result<T> = std::result::Result<T, Error>;
