//! Thin orchestrator over [`spindb_adapter::EngineAdapter`]: composes
//! the per-engine output path, dispatches to `backup`/`restore`, and
//! chains the two through a scratch temp file for `clone`. All the
//! actual dump/restore work happens inside the adapter; this layer
//! only owns path composition and the temp-file lifetime.

use std::path::{Path, PathBuf};

use spindb_adapter::{
  AdapterRegistry, BackupOpts, BackupOutcome, DetectedFormat, RestoreOpts,
  RestoreOutcome,
};
use spindb_container::{ContainerManager, CreateOpts};
use spindb_paths::Layout;
use spindb_types::{ContainerConfig, Engine, Error, Result};

/// Per-engine backup file extension for engines the adapter layer
/// has no [`spindb_adapter::profile::EngineProfile`] for (the two
/// file-embedded engines back up to a raw copy of themselves).
fn backup_extension(engine: Engine) -> &'static str {
  match engine {
    Engine::Sqlite => ".sqlite",
    Engine::DuckDb => ".duckdb",
    other => spindb_adapter::profile::profile_for(other)
      .map(|p| p.backup_ext)
      .unwrap_or(".bak"),
  }
}

pub struct BackupOrchestrator {
  adapters: AdapterRegistry,
  manager: ContainerManager,
}

impl BackupOrchestrator {
  pub fn new(layout: Layout) -> Self {
    BackupOrchestrator {
      adapters: AdapterRegistry::new(layout.clone()),
      manager: ContainerManager::new(layout),
    }
  }

  fn require_config(&self, name: &str, engine: Engine) -> Result<ContainerConfig> {
    self
      .manager
      .get_config(name, engine)?
      .ok_or_else(|| Error::NotFound(format!("container '{name}' not found")))
  }

  /// Composes `<outDir>/<outName><ext>` and dispatches to
  /// `adapter.backup`. `out_name` defaults to `name` (the container
  /// being backed up) but callers may override it, e.g. `backup src
  /// /out -n b1` names the artifact `b1<ext>` while still reading
  /// from container `src`.
  pub async fn backup(
    &self,
    name: &str,
    engine: Engine,
    out_dir: &Path,
    out_name: Option<&str>,
    opts: BackupOpts,
  ) -> Result<BackupOutcome> {
    let config = self.require_config(name, engine)?;
    let adapter = self.adapters.get_for_engine(engine)?;
    std::fs::create_dir_all(out_dir)?;
    let out_path = out_dir.join(format!(
      "{}{}",
      out_name.unwrap_or(name),
      backup_extension(engine)
    ));
    adapter.backup(&config, &out_path, &opts).await
  }

  /// Consults `adapter.detect_backup_format` first when the caller
  /// didn't force a format, then dispatches to `adapter.restore`.
  pub async fn restore(
    &self,
    name: &str,
    engine: Engine,
    in_path: &Path,
    mut opts: RestoreOpts,
  ) -> Result<RestoreOutcome> {
    let config = self.require_config(name, engine)?;
    let adapter = self.adapters.get_for_engine(engine)?;
    if opts.format.is_none() {
      if let Ok(detected) = adapter.detect_backup_format(in_path) {
        opts.format = Some(detected.format);
      }
    }
    adapter.restore(&config, in_path, &opts).await
  }

  pub fn detect_backup_format(
    &self,
    engine: Engine,
    path: &Path,
  ) -> Result<DetectedFormat> {
    self.adapters.get_for_engine(engine)?.detect_backup_format(path)
  }

  /// `backup(source) → restore(target)` through a scratch file.
  /// `target` must already exist in the catalogue (callers create it
  /// first so the target's own `database`/`port` are known); this
  /// only moves data, it doesn't provision the container. The temp
  /// file is a [`tempfile::NamedTempFile`], which removes itself on
  /// drop regardless of whether backup or restore failed.
  pub async fn clone_into(
    &self,
    source_name: &str,
    target_name: &str,
    engine: Engine,
  ) -> Result<RestoreOutcome> {
    let source = self.require_config(source_name, engine)?;
    let target = self.require_config(target_name, engine)?;
    let adapter = self.adapters.get_for_engine(engine)?;

    let scratch = tempfile::NamedTempFile::new()?;
    let scratch_path: PathBuf = scratch.path().to_path_buf();

    adapter
      .backup(&source, &scratch_path, &BackupOpts::default())
      .await?;
    let detected = adapter.detect_backup_format(&scratch_path)?;
    adapter
      .restore(
        &target,
        &scratch_path,
        &RestoreOpts {
          database: None,
          format: Some(detected.format),
        },
      )
      .await
  }

  /// Registers `target_name` in the catalogue as a clone of
  /// `source_name` (status `created`, `clonedFrom` set), without
  /// touching any data yet. Callers run `clone_into` afterwards.
  pub fn register_clone_target(
    &self,
    source_name: &str,
    target_name: &str,
    engine: Engine,
    database: String,
  ) -> Result<ContainerConfig> {
    let source = self.require_config(source_name, engine)?;
    self.manager.create(
      target_name,
      engine,
      CreateOpts {
        version: source.version.clone(),
        port: None,
        database,
        databases: source.databases.clone(),
        cloned_from: Some(source_name.to_string()),
        remote: None,
      },
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn backup_extension_falls_back_for_file_embedded_engines() {
    assert_eq!(backup_extension(Engine::Sqlite), ".sqlite");
    assert_eq!(backup_extension(Engine::DuckDb), ".duckdb");
  }

  #[test]
  fn backup_extension_uses_profile_table_for_server_engines() {
    assert_eq!(backup_extension(Engine::Postgres), ".sql");
    assert_eq!(backup_extension(Engine::Redis), ".rdb");
  }

  #[tokio::test]
  async fn backup_of_unknown_container_fails_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout::with_root(tmp.path());
    let orchestrator = BackupOrchestrator::new(layout);
    let out_dir = tmp.path().join("out");
    let result = orchestrator
      .backup("ghost", Engine::Postgres, &out_dir, None, BackupOpts::default())
      .await;
    assert!(matches!(result, Err(Error::NotFound(_))));
  }
}
