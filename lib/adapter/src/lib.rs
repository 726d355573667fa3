//! The polymorphic capability set every engine implements, and the
//! name-to-adapter registry that dispatches to it. Adapters are
//! grouped by wire family (`engines::postgres`, `engines::mysql`,
//! `engines::redis`, `engines::mongo`, `engines::http`) plus one
//! deviating family for file-embedded engines (`engines::file_embedded`),
//! rather than one struct per engine — each family struct is
//! parameterized by a small [`profile::EngineProfile`] descriptor.

mod common;
pub mod engines;
pub mod profile;
pub mod registry;
pub mod retry;

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use spindb_types::{ContainerConfig, CredentialBundle, Engine, Result};

pub use registry::AdapterRegistry;
pub use retry::{RetryOpts, StartWithRetryOutcome, start_with_retry};

/// Result of a successful `start`.
#[derive(Debug, Clone)]
pub struct StartOutcome {
  pub port: u16,
  pub connection_string: String,
}

/// Result of `status`.
#[derive(Debug, Clone)]
pub struct StatusOutcome {
  pub running: bool,
  pub message: String,
}

/// Engine-specific option map passed to `init_data_dir`.
pub type InitOpts = BTreeMap<String, String>;

/// Exactly one of `file`/`sql` is set; enforced by the variants
/// rather than by a runtime check.
#[derive(Debug, Clone)]
pub enum ScriptInput {
  File(PathBuf),
  Sql(String),
}

#[derive(Debug, Clone, Default)]
pub struct ExecuteQueryOpts {
  pub database: Option<String>,
}

#[derive(Debug, Clone)]
pub struct QueryResult {
  pub columns: Vec<String>,
  pub rows: Vec<Vec<String>>,
  pub row_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BackupOpts {
  pub database: Option<String>,
  pub format: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BackupOutcome {
  pub path: PathBuf,
  pub format: String,
  pub size: u64,
}

#[derive(Debug, Clone)]
pub struct DetectedFormat {
  pub format: String,
  pub description: String,
  pub restore_command: String,
}

#[derive(Debug, Clone, Default)]
pub struct RestoreOpts {
  pub database: Option<String>,
  pub format: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RestoreOutcome {
  pub format: String,
}

#[derive(Debug, Clone)]
pub struct DumpOutcome {
  pub file_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CreateUserOpts {
  pub username: String,
  pub password: String,
  pub database: Option<String>,
}

/// The capability set every adapter exposes. Implementations select
/// the subset they support and return `Error::Unsupported` from the
/// rest — there is no inheritance hierarchy beyond this interface and
/// the shared helpers in [`common`] and [`profile`].
#[async_trait]
pub trait EngineAdapter: Send + Sync {
  fn engine(&self) -> Engine;

  fn install_hint(&self) -> &str;

  /// Resolves the primary binary, populating a bundled cache if the
  /// adapter maintains one. Plain `which`-style PATH resolution here;
  /// no caching layer exists in this system (out of scope per the
  /// binary downloader exclusion).
  async fn ensure_binaries(&self, version: &str) -> Result<PathBuf>;

  fn verify_binary(&self) -> bool;

  async fn init_data_dir(
    &self,
    name: &str,
    version: &str,
    opts: &InitOpts,
  ) -> Result<PathBuf>;

  async fn start(&self, config: &ContainerConfig) -> Result<StartOutcome>;

  async fn stop(&self, config: &ContainerConfig) -> Result<()>;

  async fn status(&self, config: &ContainerConfig) -> Result<StatusOutcome>;

  fn get_connection_string(
    &self,
    config: &ContainerConfig,
    database: Option<&str>,
  ) -> String;

  async fn create_database(
    &self,
    _config: &ContainerConfig,
    _name: &str,
  ) -> Result<()> {
    Err(unsupported(self.engine(), "create_database"))
  }

  async fn drop_database(
    &self,
    _config: &ContainerConfig,
    _name: &str,
  ) -> Result<()> {
    Err(unsupported(self.engine(), "drop_database"))
  }

  async fn run_script(
    &self,
    _config: &ContainerConfig,
    _input: ScriptInput,
    _database: Option<&str>,
  ) -> Result<()> {
    Err(unsupported(self.engine(), "run_script"))
  }

  async fn execute_query(
    &self,
    _config: &ContainerConfig,
    _query: &str,
    _opts: &ExecuteQueryOpts,
  ) -> Result<QueryResult> {
    Err(unsupported(self.engine(), "execute_query"))
  }

  async fn backup(
    &self,
    _config: &ContainerConfig,
    _out_path: &std::path::Path,
    _opts: &BackupOpts,
  ) -> Result<BackupOutcome> {
    Err(unsupported(self.engine(), "backup"))
  }

  fn detect_backup_format(
    &self,
    path: &std::path::Path,
  ) -> Result<DetectedFormat> {
    common::sniff_backup_format(path)
  }

  async fn restore(
    &self,
    _config: &ContainerConfig,
    _in_path: &std::path::Path,
    _opts: &RestoreOpts,
  ) -> Result<RestoreOutcome> {
    Err(unsupported(self.engine(), "restore"))
  }

  async fn dump_from_connection_string(
    &self,
    _conn: &str,
    _out_path: &std::path::Path,
  ) -> Result<DumpOutcome> {
    Err(unsupported(self.engine(), "dump_from_connection_string"))
  }

  async fn create_user(
    &self,
    _config: &ContainerConfig,
    _opts: &CreateUserOpts,
  ) -> Result<CredentialBundle> {
    Err(unsupported(self.engine(), "create_user"))
  }

  async fn fetch_available_versions(
    &self,
  ) -> Result<BTreeMap<String, Vec<String>>> {
    Err(unsupported(self.engine(), "fetch_available_versions"))
  }
}

fn unsupported(engine: Engine, op: &str) -> spindb_types::Error {
  spindb_types::Error::Unsupported(format!("{engine} does not support {op}"))
}

/// Scans `PATH` for an executable named `name` (`name.exe` is also
/// tried on Windows). Returns `None` rather than erroring — callers
/// turn that into `Error::BinaryMissing` with their own install hint.
pub(crate) fn resolve_binary(name: &str) -> Option<PathBuf> {
  let path_var = std::env::var_os("PATH")?;
  for dir in std::env::split_paths(&path_var) {
    let candidate = dir.join(name);
    if is_executable(&candidate) {
      return Some(candidate);
    }
    #[cfg(windows)]
    {
      let with_ext = dir.join(format!("{name}.exe"));
      if is_executable(&with_ext) {
        return Some(with_ext);
      }
    }
  }
  None
}

#[cfg(unix)]
fn is_executable(path: &std::path::Path) -> bool {
  use std::os::unix::fs::PermissionsExt;
  std::fs::metadata(path)
    .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
    .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &std::path::Path) -> bool {
  path.is_file()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolve_binary_finds_a_binary_known_to_be_on_path() {
    assert!(resolve_binary("sh").is_some() || resolve_binary("cmd.exe").is_some());
  }

  #[test]
  fn resolve_binary_returns_none_for_nonsense_name() {
    assert!(resolve_binary("this-binary-does-not-exist-anywhere").is_none());
  }
}
