//! The parallel catalogue for file-embedded engines (SQLite, DuckDB),
//! one JSON file per engine at `<root>/<engine>-registry.json`. Kept
//! separate from the server-engine catalogue because a file-embedded
//! container has no server state to track, only a path.

mod scan;

use std::path::Path;

use spindb_paths::Layout;
use spindb_types::{
  EMBEDDED_REGISTRY_VERSION, EmbeddedEntry, EmbeddedRegistry, Engine,
  Error, Result, spindb_timestamp,
};

pub use scan::{ScanHit, scan_for_embedded_files};

pub struct EmbeddedFileRegistry {
  layout: Layout,
  engine: Engine,
}

impl EmbeddedFileRegistry {
  pub fn open(layout: Layout, engine: Engine) -> Result<Self> {
    if !engine.is_file_embedded() {
      return Err(Error::Unsupported(format!(
        "{engine} has no embedded-file registry"
      )));
    }
    Ok(EmbeddedFileRegistry { layout, engine })
  }

  fn path(&self) -> Result<std::path::PathBuf> {
    self.layout.embedded_registry_path(self.engine)
  }

  fn load(&self) -> Result<EmbeddedRegistry> {
    let path = self.path()?;
    let contents = match std::fs::read_to_string(&path) {
      Ok(c) => c,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Ok(EmbeddedRegistry::default());
      }
      Err(e) => return Err(e.into()),
    };
    let registry: EmbeddedRegistry = serde_json::from_str(&contents)?;
    if registry.version > EMBEDDED_REGISTRY_VERSION {
      return Err(Error::CorruptArtifact(format!(
        "registry version {} is newer than supported version {}",
        registry.version, EMBEDDED_REGISTRY_VERSION
      )));
    }
    Ok(registry)
  }

  fn save(&self, registry: &EmbeddedRegistry) -> Result<()> {
    let path = self.path()?;
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_string_pretty(registry)?)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
  }

  pub fn add(&self, entry: EmbeddedEntry) -> Result<()> {
    let mut registry = self.load()?;
    if registry.entries.iter().any(|e| e.name == entry.name) {
      return Err(Error::AlreadyExists(format!(
        "embedded entry '{}' already registered",
        entry.name
      )));
    }
    registry.entries.push(entry);
    self.save(&registry)
  }

  pub fn get(&self, name: &str) -> Result<Option<EmbeddedEntry>> {
    Ok(
      self
        .load()?
        .entries
        .into_iter()
        .find(|e| e.name == name),
    )
  }

  pub fn update(
    &self,
    name: &str,
    patch: impl FnOnce(&mut EmbeddedEntry),
  ) -> Result<EmbeddedEntry> {
    let mut registry = self.load()?;
    let entry = registry
      .entries
      .iter_mut()
      .find(|e| e.name == name)
      .ok_or_else(|| {
        Error::NotFound(format!("embedded entry '{name}' not found"))
      })?;
    patch(entry);
    let updated = entry.clone();
    self.save(&registry)?;
    Ok(updated)
  }

  pub fn remove(&self, name: &str) -> Result<()> {
    let mut registry = self.load()?;
    let before = registry.entries.len();
    registry.entries.retain(|e| e.name != name);
    if registry.entries.len() == before {
      return Err(Error::NotFound(format!(
        "embedded entry '{name}' not found"
      )));
    }
    self.save(&registry)
  }

  pub fn list(&self) -> Result<Vec<EmbeddedEntry>> {
    Ok(self.load()?.entries)
  }

  pub fn is_path_registered(&self, abs_path: &Path) -> Result<bool> {
    let abs_path = abs_path.to_string_lossy();
    Ok(
      self
        .load()?
        .entries
        .iter()
        .any(|e| e.file_path == abs_path),
    )
  }

  pub fn add_ignore_folder(&self, path: &Path) -> Result<()> {
    let mut registry = self.load()?;
    registry
      .ignore_folders
      .insert(path.to_string_lossy().into_owned(), true);
    self.save(&registry)
  }

  pub fn remove_ignore_folder(&self, path: &Path) -> Result<()> {
    let mut registry = self.load()?;
    registry
      .ignore_folders
      .remove(path.to_string_lossy().as_ref());
    self.save(&registry)
  }

  pub fn is_folder_ignored(&self, path: &Path) -> Result<bool> {
    Ok(
      self
        .load()?
        .ignore_folders
        .get(path.to_string_lossy().as_ref())
        .copied()
        .unwrap_or(false),
    )
  }

  /// Reports entries whose `filePath` no longer exists. Never
  /// removes them automatically — the caller decides whether to
  /// call [`Self::remove`] for each.
  pub fn find_orphans(&self) -> Result<Vec<EmbeddedEntry>> {
    Ok(
      self
        .load()?
        .entries
        .into_iter()
        .filter(|e| !Path::new(&e.file_path).exists())
        .collect(),
    )
  }

  pub fn new_entry(name: impl Into<String>, file_path: impl Into<String>) -> EmbeddedEntry {
    EmbeddedEntry {
      name: name.into(),
      file_path: file_path.into(),
      created: spindb_timestamp(),
      last_verified: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn registry() -> (tempfile::TempDir, EmbeddedFileRegistry) {
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout::with_root(tmp.path());
    (
      tmp,
      EmbeddedFileRegistry::open(layout, Engine::Sqlite).unwrap(),
    )
  }

  #[test]
  fn add_then_get_round_trips() {
    let (_tmp, reg) = registry();
    reg
      .add(EmbeddedFileRegistry::new_entry("x", "/tmp/x/db.sqlite"))
      .unwrap();
    let entry = reg.get("x").unwrap().unwrap();
    assert_eq!(entry.file_path, "/tmp/x/db.sqlite");
  }

  #[test]
  fn duplicate_add_fails() {
    let (_tmp, reg) = registry();
    reg
      .add(EmbeddedFileRegistry::new_entry("x", "/tmp/x/db.sqlite"))
      .unwrap();
    assert!(
      reg
        .add(EmbeddedFileRegistry::new_entry("x", "/tmp/other.sqlite"))
        .is_err()
    );
  }

  #[test]
  fn update_relocates_file_path() {
    let (_tmp, reg) = registry();
    reg
      .add(EmbeddedFileRegistry::new_entry("x", "/tmp/x/db.sqlite"))
      .unwrap();
    reg
      .update("x", |e| e.file_path = "/tmp/y/db.sqlite".into())
      .unwrap();
    assert_eq!(
      reg.get("x").unwrap().unwrap().file_path,
      "/tmp/y/db.sqlite"
    );
  }

  #[test]
  fn remove_deletes_entry_unconditionally_of_file_existence() {
    let (_tmp, reg) = registry();
    reg
      .add(EmbeddedFileRegistry::new_entry(
        "x",
        "/nonexistent/db.sqlite",
      ))
      .unwrap();
    reg.remove("x").unwrap();
    assert!(reg.get("x").unwrap().is_none());
  }

  #[test]
  fn orphans_are_reported_but_not_removed() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout::with_root(tmp.path());
    let reg =
      EmbeddedFileRegistry::open(layout, Engine::Sqlite).unwrap();
    let real_path = tmp.path().join("real.sqlite");
    std::fs::write(&real_path, b"").unwrap();
    reg
      .add(EmbeddedFileRegistry::new_entry(
        "real",
        real_path.to_string_lossy(),
      ))
      .unwrap();
    reg
      .add(EmbeddedFileRegistry::new_entry("ghost", "/gone/db.sqlite"))
      .unwrap();
    let orphans = reg.find_orphans().unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].name, "ghost");
    assert!(reg.get("ghost").unwrap().is_some());
  }

  #[test]
  fn ignore_folders_round_trip() {
    let (_tmp, reg) = registry();
    let path = Path::new("/tmp/ignored");
    assert!(!reg.is_folder_ignored(path).unwrap());
    reg.add_ignore_folder(path).unwrap();
    assert!(reg.is_folder_ignored(path).unwrap());
    reg.remove_ignore_folder(path).unwrap();
    assert!(!reg.is_folder_ignored(path).unwrap());
  }
}
