//! On-demand directory scan for un-registered file-embedded
//! databases. Run only when the caller nominates a directory to
//! walk — never automatic, never on a timer.

use std::path::{Path, PathBuf};

use spindb_validations::{derive_container_name_from_stem, validate_container_name};

#[derive(Debug, Clone)]
pub struct ScanHit {
  pub proposed_name: String,
  pub file_path: PathBuf,
}

const EXTENSIONS: &[&str] = &["sqlite", "sqlite3", "db"];

/// Walks `root` looking for files matching `*.{sqlite,sqlite3,db}`
/// (case-insensitive) whose parent directory is not in
/// `ignore_folders`. Proposes a container name for each hit per the
/// scan protocol; hits whose derived name fails
/// [`validate_container_name`] are skipped.
pub fn scan_for_embedded_files(
  root: &Path,
  is_folder_ignored: impl Fn(&Path) -> bool,
) -> Vec<ScanHit> {
  let mut hits = Vec::new();
  walk(root, &is_folder_ignored, &mut hits);
  hits
}

fn walk(
  dir: &Path,
  is_folder_ignored: &impl Fn(&Path) -> bool,
  hits: &mut Vec<ScanHit>,
) {
  if is_folder_ignored(dir) {
    return;
  }
  let Ok(entries) = std::fs::read_dir(dir) else {
    return;
  };
  for entry in entries.flatten() {
    let path = entry.path();
    if path.is_dir() {
      walk(&path, is_folder_ignored, hits);
      continue;
    }
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
      continue;
    };
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
      continue;
    };
    if !EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
      continue;
    }
    let proposed_name = derive_container_name_from_stem(stem);
    if validate_container_name(&proposed_name).is_ok() {
      hits.push(ScanHit {
        proposed_name,
        file_path: path,
      });
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn finds_matching_files_and_skips_ignored_folders() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("orders.sqlite"), b"").unwrap();
    std::fs::write(tmp.path().join("notes.txt"), b"").unwrap();
    let ignored_dir = tmp.path().join("skip");
    std::fs::create_dir(&ignored_dir).unwrap();
    std::fs::write(ignored_dir.join("hidden.db"), b"").unwrap();

    let ignored_path = ignored_dir.clone();
    let hits = scan_for_embedded_files(tmp.path(), move |p| {
      p == ignored_path
    });

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].proposed_name, "orders");
  }

  #[test]
  fn derives_prefixed_name_for_numeric_leading_stem() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("2024_backup.db"), b"").unwrap();
    let hits = scan_for_embedded_files(tmp.path(), |_| false);
    assert_eq!(hits[0].proposed_name, "db-2024_backup");
  }

  #[test]
  fn case_insensitive_extension_match() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("orders.SQLITE3"), b"").unwrap();
    let hits = scan_for_embedded_files(tmp.path(), |_| false);
    assert_eq!(hits.len(), 1);
  }
}
