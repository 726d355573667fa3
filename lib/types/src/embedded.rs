use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One entry in the embedded-file registry: a named file-embedded
/// database container that has no server process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedEntry {
  pub name: String,
  pub file_path: String,
  pub created: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_verified: Option<String>,
}

/// The full on-disk registry for one file-embedded engine:
/// `<root>/<engine>-registry.json`.
///
/// `version` lets a forward-compatible reader tolerate unknown
/// fields (`#[serde(default)]` everywhere) and refuse to open a
/// higher version than it understands (checked by
/// `spindb_embedded::Registry::load`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedRegistry {
  pub version: u32,
  #[serde(default)]
  pub entries: Vec<EmbeddedEntry>,
  #[serde(default)]
  pub ignore_folders: BTreeMap<String, bool>,
}

/// The current schema version this build understands. Matches §6:
/// `{version:1, entries:[...], ignoreFolders:{path:true}}`.
pub const EMBEDDED_REGISTRY_VERSION: u32 = 1;

impl Default for EmbeddedRegistry {
  fn default() -> Self {
    EmbeddedRegistry {
      version: EMBEDDED_REGISTRY_VERSION,
      entries: Vec::new(),
      ignore_folders: BTreeMap::new(),
    }
  }
}
