//! Computes every derived path from a small set of roots. No path
//! ever escapes `root()`; `name` is validated before it is used in a
//! path segment. The only I/O here is `mkdir -p` on demand, done by
//! the callers that actually need the directory to exist (container
//! manager, credential manager), not by the accessors themselves.

use std::path::{Path, PathBuf};

use spindb_types::{Engine, Error, Result};
use spindb_validations::validate_container_name;

/// `$HOME/.spindb`, or the platform equivalent via the `dirs` crate.
/// Can be overridden for tests via [`Layout::with_root`].
#[derive(Debug, Clone)]
pub struct Layout {
  root: PathBuf,
}

impl Default for Layout {
  fn default() -> Self {
    let root = dirs::home_dir()
      .map(|home| home.join(".spindb"))
      .unwrap_or_else(|| PathBuf::from(".spindb"));
    Layout { root }
  }
}

impl Layout {
  pub fn with_root(root: impl Into<PathBuf>) -> Self {
    Layout { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// `<root>/<engine>/<name>`
  pub fn container_path(
    &self,
    name: &str,
    engine: Engine,
  ) -> Result<PathBuf> {
    validate_container_name(name)?;
    Ok(self.root.join(engine.dir_name()).join(name))
  }

  /// `<root>/<engine>/<name>/data`
  pub fn data_dir(&self, name: &str, engine: Engine) -> Result<PathBuf> {
    Ok(self.container_path(name, engine)?.join("data"))
  }

  /// `<root>/<engine>/<name>/log`
  pub fn log_dir(&self, name: &str, engine: Engine) -> Result<PathBuf> {
    Ok(self.container_path(name, engine)?.join("log"))
  }

  /// `<root>/<engine>/<name>/log/<engine>.log`
  pub fn log_path(&self, name: &str, engine: Engine) -> Result<PathBuf> {
    Ok(self.log_dir(name, engine)?.join(format!("{engine}.log")))
  }

  /// `<root>/<engine>/<name>/<engine>.pid`
  pub fn pid_path(&self, name: &str, engine: Engine) -> Result<PathBuf> {
    Ok(
      self
        .container_path(name, engine)?
        .join(format!("{engine}.pid")),
    )
  }

  /// `<root>/<engine>/<name>/credentials`
  pub fn credentials_dir(
    &self,
    name: &str,
    engine: Engine,
  ) -> Result<PathBuf> {
    Ok(self.container_path(name, engine)?.join("credentials"))
  }

  /// `<root>/<engine>` — the per-engine subtree root, used to list
  /// every container directory for an engine family.
  pub fn engine_root(&self, engine: Engine) -> PathBuf {
    self.root.join(engine.dir_name())
  }

  /// `<root>/catalogue.json` — the single process-wide catalogue
  /// file, flat over the `(engine, name)` keyspace.
  pub fn catalogue_path(&self) -> PathBuf {
    self.root.join("catalogue.json")
  }

  /// `<root>/<engine>-registry.json`
  pub fn embedded_registry_path(&self, engine: Engine) -> Result<PathBuf> {
    if !engine.is_file_embedded() {
      return Err(Error::Unsupported(format!(
        "{engine} is not a file-embedded engine"
      )));
    }
    Ok(self.root.join(format!("{engine}-registry.json")))
  }

  /// Null device path, used to silence stdio for detached spawns.
  pub fn null_device() -> &'static Path {
    #[cfg(unix)]
    {
      Path::new("/dev/null")
    }
    #[cfg(windows)]
    {
      Path::new("NUL")
    }
  }

  /// Ensures the full per-container directory tree exists:
  /// `data`, `log`, `credentials`. Does not create the PID file
  /// (written by the engine binary on start).
  pub fn materialize(&self, name: &str, engine: Engine) -> Result<()> {
    std::fs::create_dir_all(self.data_dir(name, engine)?)?;
    std::fs::create_dir_all(self.log_dir(name, engine)?)?;
    std::fs::create_dir_all(self.credentials_dir(name, engine)?)?;
    Ok(())
  }

  /// Removes the full per-container directory tree. No-op if it
  /// does not exist.
  pub fn remove(&self, name: &str, engine: Engine) -> Result<()> {
    let path = self.container_path(name, engine)?;
    if path.exists() {
      std::fs::remove_dir_all(path)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn paths_never_escape_root() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout::with_root(tmp.path());
    let data = layout.data_dir("pg1", Engine::Postgres).unwrap();
    assert!(data.starts_with(tmp.path()));
  }

  #[test]
  fn invalid_name_is_rejected_before_any_path_is_formed() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout::with_root(tmp.path());
    assert!(layout.data_dir("../escape", Engine::Postgres).is_err());
    assert!(!tmp.path().join("..").join("escape").exists());
  }

  #[test]
  fn materialize_creates_expected_subtree() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout::with_root(tmp.path());
    layout.materialize("pg1", Engine::Postgres).unwrap();
    assert!(layout.data_dir("pg1", Engine::Postgres).unwrap().is_dir());
    assert!(layout.log_dir("pg1", Engine::Postgres).unwrap().is_dir());
    assert!(
      layout
        .credentials_dir("pg1", Engine::Postgres)
        .unwrap()
        .is_dir()
    );
  }

  #[test]
  fn embedded_registry_path_rejects_server_engines() {
    let layout = Layout::with_root("/tmp/x");
    assert!(layout.embedded_registry_path(Engine::Postgres).is_err());
    assert!(layout.embedded_registry_path(Engine::Sqlite).is_ok());
  }
}
