//! The single-writer catalogue of containers. Mutation is serialized
//! by construction — one `ContainerManager` per process, talking to
//! one catalogue file via atomic temp-file-then-rename — so
//! concurrent writers within this process never interleave a
//! partial write. Cross-process concurrency is out of scope (single
//! user tool), matching the design notes.

use std::path::Path;

use spindb_paths::Layout;
use spindb_types::{
  ContainerConfig, ContainerConfigPatch, ContainerStatus, Engine,
  Error, RemoteConfig, Result, spindb_timestamp,
};
use spindb_validations::validate_container_name;

pub struct ContainerManager {
  layout: Layout,
}

#[derive(Debug, Clone, Default)]
pub struct CreateOpts {
  pub version: String,
  /// `None` pre-allocates (stored as port `0`); `Some(p)` assigns a
  /// concrete port up front. Ignored (forced to `0`) for
  /// file-embedded engines.
  pub port: Option<u16>,
  pub database: String,
  pub databases: Vec<String>,
  pub cloned_from: Option<String>,
  pub remote: Option<RemoteConfig>,
}

impl ContainerManager {
  pub fn new(layout: Layout) -> Self {
    ContainerManager { layout }
  }

  fn catalogue_path(&self) -> std::path::PathBuf {
    self.layout.catalogue_path()
  }

  fn load_all(&self) -> Result<Vec<ContainerConfig>> {
    let path = self.catalogue_path();
    let contents = match std::fs::read_to_string(&path) {
      Ok(c) => c,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Ok(Vec::new());
      }
      Err(e) => return Err(e.into()),
    };
    if contents.trim().is_empty() {
      return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&contents)?)
  }

  fn save_all(&self, records: &[ContainerConfig]) -> Result<()> {
    let path = self.catalogue_path();
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_string_pretty(records)?)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
  }

  /// Validates the name, asserts `(engine, name)` uniqueness,
  /// materializes the directory tree, and persists the record with
  /// status `created`.
  pub fn create(
    &self,
    name: &str,
    engine: Engine,
    opts: CreateOpts,
  ) -> Result<ContainerConfig> {
    validate_container_name(name)?;
    let mut records = self.load_all()?;
    if records
      .iter()
      .any(|r| r.name == name && r.engine == engine)
    {
      return Err(Error::AlreadyExists(format!(
        "container '{name}' already exists for engine {engine}"
      )));
    }

    let port = if engine.is_file_embedded() {
      0
    } else {
      opts.port.unwrap_or(0)
    };

    self.layout.materialize(name, engine)?;

    let now = spindb_timestamp();
    let record = ContainerConfig {
      name: name.to_string(),
      engine,
      version: opts.version,
      port,
      database: opts.database,
      databases: opts.databases,
      status: ContainerStatus::Created,
      created: now.clone(),
      modified: now,
      cloned_from: opts.cloned_from,
      remote: opts.remote,
    };
    records.push(record.clone());
    self.save_all(&records)?;
    Ok(record)
  }

  /// Returns every configuration, with `status` re-probed live:
  /// server engines via the process supervisor's PID liveness check,
  /// file-embedded engines via filesystem existence. Never mutates
  /// the stored records.
  pub fn list(&self) -> Result<Vec<ContainerConfig>> {
    let mut records = self.load_all()?;
    for record in &mut records {
      record.status = self.probe_status(record)?;
    }
    Ok(records)
  }

  fn probe_status(
    &self,
    record: &ContainerConfig,
  ) -> Result<ContainerStatus> {
    if record.engine.is_file_embedded() {
      return Ok(if Path::new(&record.database).exists() {
        ContainerStatus::Running
      } else {
        ContainerStatus::Missing
      });
    }
    let pid_path = self.layout.pid_path(&record.name, record.engine)?;
    Ok(if spindb_process::is_running(&pid_path) {
      ContainerStatus::Running
    } else {
      ContainerStatus::Stopped
    })
  }

  /// A single lookup; returns the persisted `status` verbatim
  /// (no re-probe — callers that need live status use [`Self::list`]).
  pub fn get_config(
    &self,
    name: &str,
    engine: Engine,
  ) -> Result<Option<ContainerConfig>> {
    Ok(
      self
        .load_all()?
        .into_iter()
        .find(|r| r.name == name && r.engine == engine),
    )
  }

  fn find_index(
    records: &[ContainerConfig],
    name: &str,
    engine: Engine,
  ) -> Result<usize> {
    records
      .iter()
      .position(|r| r.name == name && r.engine == engine)
      .ok_or_else(|| {
        Error::NotFound(format!("container '{name}' ({engine}) not found"))
      })
  }

  /// Merges allowed fields from `patch` onto the stored record.
  /// Rejects changes to `name`/`engine` by construction — they are
  /// not fields of [`ContainerConfigPatch`]. Atomic write.
  pub fn update_config(
    &self,
    name: &str,
    engine: Engine,
    patch: ContainerConfigPatch,
  ) -> Result<ContainerConfig> {
    let mut records = self.load_all()?;
    let idx = Self::find_index(&records, name, engine)?;
    records[idx].apply_patch(patch);
    let updated = records[idx].clone();
    self.save_all(&records)?;
    Ok(updated)
  }

  /// Requires the container be stopped. Renames the catalogue key
  /// and the on-disk directory tree. Path-bearing artifacts (log,
  /// PID) are recomputed on demand from the new name and need no
  /// rewrite.
  pub fn rename(
    &self,
    old_name: &str,
    new_name: &str,
    engine: Engine,
  ) -> Result<ContainerConfig> {
    validate_container_name(new_name)?;
    let mut records = self.load_all()?;
    let idx = Self::find_index(&records, old_name, engine)?;

    if records[idx].status == ContainerStatus::Running
      || self.probe_status(&records[idx])? == ContainerStatus::Running
    {
      return Err(Error::AlreadyRunning(format!(
        "container '{old_name}' must be stopped before rename"
      )));
    }
    if records
      .iter()
      .any(|r| r.name == new_name && r.engine == engine)
    {
      return Err(Error::AlreadyExists(format!(
        "container '{new_name}' already exists for engine {engine}"
      )));
    }

    let old_path = self.layout.container_path(old_name, engine)?;
    let new_path = self.layout.container_path(new_name, engine)?;
    if old_path.exists() {
      std::fs::rename(&old_path, &new_path)?;
    }

    records[idx].name = new_name.to_string();
    records[idx].modified = spindb_timestamp();
    let updated = records[idx].clone();
    self.save_all(&records)?;
    Ok(updated)
  }

  /// Refuses if running unless `force`. Removes the configuration
  /// record and then the directory tree. Deleting an already-deleted
  /// target succeeds silently (idempotent), matching the propagation
  /// policy for `stop`/`delete`.
  pub fn delete(
    &self,
    name: &str,
    engine: Engine,
    force: bool,
  ) -> Result<()> {
    let mut records = self.load_all()?;
    let Some(idx) = records
      .iter()
      .position(|r| r.name == name && r.engine == engine)
    else {
      return Ok(());
    };

    if !force && self.probe_status(&records[idx])? == ContainerStatus::Running
    {
      return Err(Error::AlreadyRunning(format!(
        "container '{name}' is running; pass force to delete anyway"
      )));
    }

    records.remove(idx);
    self.save_all(&records)?;
    self.layout.remove(name, engine)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn manager() -> (tempfile::TempDir, ContainerManager) {
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout::with_root(tmp.path());
    (tmp, ContainerManager::new(layout))
  }

  #[test]
  fn create_then_get_round_trips() {
    let (_tmp, mgr) = manager();
    mgr
      .create(
        "pg1",
        Engine::Postgres,
        CreateOpts {
          version: "16".into(),
          database: "pg1".into(),
          ..Default::default()
        },
      )
      .unwrap();
    let record = mgr.get_config("pg1", Engine::Postgres).unwrap().unwrap();
    assert_eq!(record.name, "pg1");
    assert_eq!(record.status, ContainerStatus::Created);
  }

  #[test]
  fn duplicate_create_fails_with_already_exists() {
    let (_tmp, mgr) = manager();
    let opts = CreateOpts {
      version: "16".into(),
      database: "pg1".into(),
      ..Default::default()
    };
    mgr.create("pg1", Engine::Postgres, opts.clone()).unwrap();
    assert!(matches!(
      mgr.create("pg1", Engine::Postgres, opts),
      Err(Error::AlreadyExists(_))
    ));
  }

  #[test]
  fn same_name_different_engine_is_allowed() {
    let (_tmp, mgr) = manager();
    mgr
      .create(
        "db1",
        Engine::Postgres,
        CreateOpts {
          database: "db1".into(),
          ..Default::default()
        },
      )
      .unwrap();
    assert!(
      mgr
        .create(
          "db1",
          Engine::Mysql,
          CreateOpts {
            database: "db1".into(),
            ..Default::default()
          },
        )
        .is_ok()
    );
  }

  #[test]
  fn fold_of_update_patches_matches_persisted_record() {
    let (_tmp, mgr) = manager();
    mgr
      .create(
        "pg1",
        Engine::Postgres,
        CreateOpts {
          database: "pg1".into(),
          ..Default::default()
        },
      )
      .unwrap();
    mgr
      .update_config(
        "pg1",
        Engine::Postgres,
        ContainerConfigPatch {
          port: Some(5433),
          ..Default::default()
        },
      )
      .unwrap();
    mgr
      .update_config(
        "pg1",
        Engine::Postgres,
        ContainerConfigPatch {
          status: Some(ContainerStatus::Running),
          ..Default::default()
        },
      )
      .unwrap();
    let record = mgr.get_config("pg1", Engine::Postgres).unwrap().unwrap();
    assert_eq!(record.port, 5433);
    assert_eq!(record.status, ContainerStatus::Running);
  }

  #[test]
  fn rename_moves_key_and_directory_preserving_port() {
    let (tmp, mgr) = manager();
    mgr
      .create(
        "old",
        Engine::Postgres,
        CreateOpts {
          port: Some(5454),
          database: "old".into(),
          ..Default::default()
        },
      )
      .unwrap();
    mgr.rename("old", "new", Engine::Postgres).unwrap();
    assert!(mgr.get_config("old", Engine::Postgres).unwrap().is_none());
    let renamed = mgr.get_config("new", Engine::Postgres).unwrap().unwrap();
    assert_eq!(renamed.port, 5454);
    assert!(
      tmp
        .path()
        .join("postgres")
        .join("new")
        .join("data")
        .is_dir()
    );
  }

  #[test]
  fn delete_removes_record_and_directory() {
    let (tmp, mgr) = manager();
    mgr
      .create(
        "pg1",
        Engine::Postgres,
        CreateOpts {
          database: "pg1".into(),
          ..Default::default()
        },
      )
      .unwrap();
    mgr.delete("pg1", Engine::Postgres, false).unwrap();
    assert!(mgr.get_config("pg1", Engine::Postgres).unwrap().is_none());
    assert!(!tmp.path().join("postgres").join("pg1").exists());
  }

  #[test]
  fn delete_on_missing_container_succeeds_silently() {
    let (_tmp, mgr) = manager();
    assert!(mgr.delete("ghost", Engine::Postgres, false).is_ok());
  }

  #[test]
  fn file_embedded_create_forces_port_zero() {
    let (_tmp, mgr) = manager();
    let record = mgr
      .create(
        "cache1",
        Engine::Sqlite,
        CreateOpts {
          port: Some(9999),
          database: "/tmp/cache1.sqlite".into(),
          ..Default::default()
        },
      )
      .unwrap();
    assert_eq!(record.port, 0);
  }
}
