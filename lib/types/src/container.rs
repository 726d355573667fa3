use serde::{Deserialize, Serialize};

use crate::Engine;

/// One of {`created`, `running`, `stopped`, `missing`}. `missing`
/// applies only to file-embedded engines whose backing file no
/// longer exists.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
  Created,
  Running,
  Stopped,
  Missing,
}

/// Connection metadata for a container that links to an external,
/// already-running instance rather than one this system started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
  pub host: String,
  pub scheme: String,
  #[serde(default)]
  pub ssl: bool,
}

/// A single container's persisted configuration record. Keyed by the
/// tuple `(engine, name)` within the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
  pub name: String,
  pub engine: Engine,
  /// Free-form; engines may parse it as semver but the catalogue
  /// stores it verbatim.
  pub version: String,
  /// `0` denotes "not applicable" (file-embedded engines).
  pub port: u16,
  /// Primary logical database name for server engines, or the
  /// absolute file path for file-embedded engines.
  pub database: String,
  #[serde(default)]
  pub databases: Vec<String>,
  pub status: ContainerStatus,
  pub created: String,
  pub modified: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cloned_from: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub remote: Option<RemoteConfig>,
}

impl ContainerConfig {
  /// Fields the container manager will merge from an `update_config`
  /// patch. `name` and `engine` are immutable after creation.
  pub fn apply_patch(&mut self, patch: ContainerConfigPatch) {
    if let Some(port) = patch.port {
      self.port = port;
    }
    if let Some(status) = patch.status {
      self.status = status;
    }
    if let Some(database) = patch.database {
      self.database = database;
    }
    if let Some(cloned_from) = patch.cloned_from {
      self.cloned_from = Some(cloned_from);
    }
    if let Some(databases) = patch.databases {
      self.databases = databases;
    }
    self.modified = crate::spindb_timestamp();
  }
}

/// Allowed mutable fields for `update_config`. Any field left `None`
/// is left untouched on the stored record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerConfigPatch {
  pub port: Option<u16>,
  pub status: Option<ContainerStatus>,
  pub database: Option<String>,
  pub cloned_from: Option<String>,
  pub databases: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn base() -> ContainerConfig {
    ContainerConfig {
      name: "pg1".into(),
      engine: Engine::Postgres,
      version: "16".into(),
      port: 5432,
      database: "pg1".into(),
      databases: vec![],
      status: ContainerStatus::Created,
      created: "t0".into(),
      modified: "t0".into(),
      cloned_from: None,
      remote: None,
    }
  }

  #[test]
  fn patch_only_touches_present_fields() {
    let mut cfg = base();
    cfg.apply_patch(ContainerConfigPatch {
      port: Some(5433),
      ..Default::default()
    });
    assert_eq!(cfg.port, 5433);
    assert_eq!(cfg.database, "pg1");
    assert_eq!(cfg.status, ContainerStatus::Created);
  }

  #[test]
  fn fold_of_patches_matches_sequential_application() {
    let mut cfg = base();
    let patches = [
      ContainerConfigPatch {
        port: Some(5433),
        ..Default::default()
      },
      ContainerConfigPatch {
        status: Some(ContainerStatus::Running),
        ..Default::default()
      },
      ContainerConfigPatch {
        database: Some("renamed".into()),
        ..Default::default()
      },
    ];
    for patch in patches {
      cfg.apply_patch(patch);
    }
    assert_eq!(cfg.port, 5433);
    assert_eq!(cfg.status, ContainerStatus::Running);
    assert_eq!(cfg.database, "renamed");
  }
}
