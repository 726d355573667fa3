//! Per-(container, engine, username) credential files, stored as
//! `.env.<username>` inside the container's `credentials/` directory.
//! Directory mode `0700`, file mode `0600` on platforms that honor
//! POSIX bits; Windows relies on the per-user profile ACL instead,
//! same as the teacher's `secret_file` handling of key material.

mod encoding;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::distr::Alphanumeric;
use spindb_paths::Layout;
use spindb_types::{CredentialBundle, Engine, Error, Result};
use spindb_validations::validate_username;

/// Options for [`generate_password`]. Default length 20,
/// cryptographically secure via `rand`'s OS-backed RNG.
#[derive(Debug, Clone, Copy)]
pub struct PasswordOptions {
  pub length: usize,
  pub alphanumeric_only: bool,
}

impl Default for PasswordOptions {
  fn default() -> Self {
    PasswordOptions {
      length: 20,
      alphanumeric_only: false,
    }
  }
}

const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{}";

/// Generates a cryptographically secure random password.
/// `alphanumeric_only` excludes symbols entirely.
pub fn generate_password(opts: PasswordOptions) -> String {
  let mut rng = rand::rng();
  if opts.alphanumeric_only {
    (&mut rng)
      .sample_iter(&Alphanumeric)
      .take(opts.length)
      .map(char::from)
      .collect()
  } else {
    (0..opts.length)
      .map(|_| {
        if rng.random_bool(0.25) {
          SYMBOLS[rng.random_range(0..SYMBOLS.len())] as char
        } else {
          (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(1)
            .map(char::from)
            .next()
            .unwrap()
        }
      })
      .collect()
  }
}

/// The default username a fresh credential should be saved under,
/// per engine category: search engines get `search_key`, vector
/// engines get `api_key`, everything else gets `admin`.
pub fn default_username(engine: Engine) -> &'static str {
  match engine {
    Engine::Meilisearch => "search_key",
    Engine::Qdrant | Engine::Weaviate => "api_key",
    _ => "admin",
  }
}

pub struct CredentialStore {
  layout: Layout,
}

impl CredentialStore {
  pub fn new(layout: Layout) -> Self {
    CredentialStore { layout }
  }

  fn file_path(
    &self,
    name: &str,
    engine: Engine,
    username: &str,
  ) -> Result<PathBuf> {
    // Filename derivation must fail before any path is formed.
    validate_username(username)?;
    Ok(
      self
        .layout
        .credentials_dir(name, engine)?
        .join(format!(".env.{username}")),
    )
  }

  /// Creates `credentials_dir` at `0700` if absent, writes
  /// `.env.<username>` at `0600`.
  pub fn save(
    &self,
    name: &str,
    engine: Engine,
    username: &str,
    bundle: &CredentialBundle,
  ) -> Result<PathBuf> {
    let path = self.file_path(name, engine, username)?;
    let dir = self.layout.credentials_dir(name, engine)?;
    std::fs::create_dir_all(&dir)?;
    set_dir_mode(&dir, 0o700)?;

    let mut contents = String::new();
    for (key, value) in bundle.to_fields() {
      contents.push_str(key);
      contents.push('=');
      contents.push_str(&encoding::encode_value(&value));
      contents.push('\n');
    }
    std::fs::write(&path, contents)?;
    set_file_mode(&path, 0o600)?;
    Ok(path)
  }

  /// Returns `None` if the file is missing; `CorruptArtifact` if
  /// required keys are absent.
  pub fn load(
    &self,
    name: &str,
    engine: Engine,
    username: &str,
  ) -> Result<Option<CredentialBundle>> {
    let path = self.file_path(name, engine, username)?;
    let contents = match std::fs::read_to_string(&path) {
      Ok(c) => c,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Ok(None);
      }
      Err(e) => return Err(e.into()),
    };
    let fields = parse_env_file(&contents)?;
    CredentialBundle::from_fields(&fields).map(Some)
  }

  /// Scans the credentials directory for files matching `.env.*`
  /// and returns the usernames.
  pub fn list(&self, name: &str, engine: Engine) -> Result<Vec<String>> {
    let dir = self.layout.credentials_dir(name, engine)?;
    if !dir.exists() {
      return Ok(Vec::new());
    }
    let mut usernames = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
      let entry = entry?;
      if let Some(file_name) = entry.file_name().to_str() {
        if let Some(username) = file_name.strip_prefix(".env.") {
          usernames.push(username.to_string());
        }
      }
    }
    usernames.sort();
    Ok(usernames)
  }

  pub fn exists(
    &self,
    name: &str,
    engine: Engine,
    username: &str,
  ) -> Result<bool> {
    Ok(self.file_path(name, engine, username)?.exists())
  }
}

fn parse_env_file(contents: &str) -> Result<BTreeMap<String, String>> {
  let mut fields = BTreeMap::new();
  for line in contents.lines() {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
      continue;
    }
    let (key, value) = trimmed.split_once('=').ok_or_else(|| {
      Error::CorruptArtifact(format!(
        "credential line missing '=': {trimmed}"
      ))
    })?;
    fields.insert(key.to_string(), encoding::decode_value(value)?);
  }
  Ok(fields)
}

#[cfg(unix)]
fn set_dir_mode(path: &Path, mode: u32) -> Result<()> {
  use std::os::unix::fs::PermissionsExt;
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
  Ok(())
}

#[cfg(not(unix))]
fn set_dir_mode(_path: &Path, _mode: u32) -> Result<()> {
  Ok(())
}

#[cfg(unix)]
fn set_file_mode(path: &Path, mode: u32) -> Result<()> {
  use std::os::unix::fs::PermissionsExt;
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
  Ok(())
}

#[cfg(not(unix))]
fn set_file_mode(_path: &Path, _mode: u32) -> Result<()> {
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use spindb_types::PasswordCredential;

  fn store() -> (tempfile::TempDir, CredentialStore) {
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout::with_root(tmp.path());
    (tmp, CredentialStore::new(layout))
  }

  #[test]
  fn save_then_load_round_trips_special_characters() {
    let (_tmp, store) = store();
    let bundle = CredentialBundle::Password(PasswordCredential {
      db_user: "admin".into(),
      db_password: "p=w\n\"q\\\\".into(),
      db_host: "127.0.0.1".into(),
      db_port: "5432".into(),
      db_name: "pg1".into(),
      db_url: "postgresql://admin@127.0.0.1:5432/pg1".into(),
    });
    store
      .save("pg1", Engine::Postgres, "admin", &bundle)
      .unwrap();
    let loaded =
      store.load("pg1", Engine::Postgres, "admin").unwrap().unwrap();
    assert_eq!(loaded, bundle);
  }

  #[test]
  fn load_missing_file_returns_none() {
    let (_tmp, store) = store();
    assert!(
      store.load("pg1", Engine::Postgres, "admin").unwrap().is_none()
    );
  }

  #[test]
  fn save_rejects_invalid_username_before_touching_filesystem() {
    let (tmp, store) = store();
    let bundle = CredentialBundle::Password(PasswordCredential {
      db_user: "x".into(),
      db_password: "x".into(),
      db_host: "x".into(),
      db_port: "x".into(),
      db_name: "x".into(),
      db_url: "x".into(),
    });
    let result = store.save("pg1", Engine::Postgres, "_bad", &bundle);
    assert!(result.is_err());
    assert!(!tmp.path().join("postgres").exists());
  }

  #[test]
  fn list_returns_saved_usernames() {
    let (_tmp, store) = store();
    let bundle = CredentialBundle::Password(PasswordCredential {
      db_user: "x".into(),
      db_password: "x".into(),
      db_host: "x".into(),
      db_port: "x".into(),
      db_name: "x".into(),
      db_url: "x".into(),
    });
    store.save("pg1", Engine::Postgres, "admin", &bundle).unwrap();
    store.save("pg1", Engine::Postgres, "reader", &bundle).unwrap();
    assert_eq!(
      store.list("pg1", Engine::Postgres).unwrap(),
      vec!["admin".to_string(), "reader".to_string()]
    );
  }

  #[test]
  fn default_usernames_follow_engine_category() {
    assert_eq!(default_username(Engine::Meilisearch), "search_key");
    assert_eq!(default_username(Engine::Qdrant), "api_key");
    assert_eq!(default_username(Engine::Postgres), "admin");
    assert_eq!(default_username(Engine::CouchDb), "admin");
  }

  #[cfg(unix)]
  #[test]
  fn credentials_directory_and_file_have_restrictive_permissions() {
    use std::os::unix::fs::PermissionsExt;
    let (_tmp, store) = store();
    let bundle = CredentialBundle::Password(PasswordCredential {
      db_user: "x".into(),
      db_password: "x".into(),
      db_host: "x".into(),
      db_port: "x".into(),
      db_name: "x".into(),
      db_url: "x".into(),
    });
    let path =
      store.save("pg1", Engine::Postgres, "admin", &bundle).unwrap();
    let file_mode =
      std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(file_mode, 0o600);
    let dir_mode = std::fs::metadata(path.parent().unwrap())
      .unwrap()
      .permissions()
      .mode()
      & 0o777;
    assert_eq!(dir_mode, 0o700);
  }
}
