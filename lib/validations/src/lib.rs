//! Input validation for the values that end up embedded in file
//! paths or used as catalogue keys. These are enforced *before* any
//! path is formed or any filesystem call is made, matching the
//! "filename derivation fails with InvalidUsername before any path
//! is formed" requirement on the credential store.

use std::sync::OnceLock;

use regex::Regex;
use spindb_types::{Error, Result};

/// `^[A-Za-z][A-Za-z0-9_-]{0,62}$` — container names. Matches a
/// single leading letter followed by up to 62 letters, digits,
/// underscores or hyphens (63 chars total).
pub fn validate_container_name(name: &str) -> Result<()> {
  static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
  let regex = NAME_REGEX.get_or_init(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_-]{0,62}$")
      .expect("failed to compile container name regex")
  });
  if regex.is_match(name) {
    Ok(())
  } else {
    Err(Error::InvalidInput(format!(
      "'{name}' is not a valid container name: must start with a letter and contain only letters, digits, '_' or '-' (max 63 chars)"
    )))
  }
}

/// `^[A-Za-z][A-Za-z0-9_]{0,62}$` — usernames. Shared by
/// `create_user` and the credential store: both must reject a bad
/// username before deriving a filename from it.
pub fn validate_username(username: &str) -> Result<()> {
  static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
  let regex = USERNAME_REGEX.get_or_init(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,62}$")
      .expect("failed to compile username regex")
  });
  if regex.is_match(username) {
    Ok(())
  } else {
    Err(Error::InvalidInput(format!(
      "'{username}' is not a valid username: must start with a letter and contain only letters, digits, or '_' (max 63 chars)"
    )))
  }
}

/// Derives a candidate container name from a scanned file's stem,
/// per the embedded-file scan protocol:
///
/// 1. Strip the matched extension (already done by the caller).
/// 2. Replace every character outside `[A-Za-z0-9_-]` with `-`.
/// 3. Collapse runs of `-` into a single `-`.
/// 4. If the result does not begin with a letter, prepend `db-`.
///
/// The result still must pass [`validate_container_name`].
pub fn derive_container_name_from_stem(stem: &str) -> String {
  static NON_NAME_CHAR: OnceLock<Regex> = OnceLock::new();
  static DASH_RUN: OnceLock<Regex> = OnceLock::new();
  let non_name_char = NON_NAME_CHAR
    .get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]").unwrap());
  let dash_run = DASH_RUN.get_or_init(|| Regex::new(r"-+").unwrap());

  let replaced = non_name_char.replace_all(stem, "-");
  let collapsed = dash_run.replace_all(&replaced, "-");
  if collapsed
    .chars()
    .next()
    .map(|c| c.is_ascii_alphabetic())
    .unwrap_or(false)
  {
    collapsed.into_owned()
  } else {
    format!("db-{collapsed}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_well_formed_names() {
    assert!(validate_container_name("pg1").is_ok());
    assert!(validate_container_name("a").is_ok());
    assert!(validate_container_name("my-db_01").is_ok());
  }

  #[test]
  fn rejects_leading_digit_or_bad_chars() {
    assert!(validate_container_name("1db").is_err());
    assert!(validate_container_name("db name").is_err());
    assert!(validate_container_name("").is_err());
  }

  #[test]
  fn rejects_names_over_63_chars() {
    let too_long = format!("a{}", "b".repeat(63));
    assert!(validate_container_name(&too_long).is_err());
  }

  #[test]
  fn username_rejects_underscore_leading_or_symbols() {
    assert!(validate_username("admin").is_ok());
    assert!(validate_username("_admin").is_err());
    assert!(validate_username("ad-min").is_err());
  }

  #[test]
  fn derive_name_replaces_and_collapses() {
    assert_eq!(
      derive_container_name_from_stem("My Cool DB!!"),
      "My-Cool-DB-"
    );
    assert_eq!(derive_container_name_from_stem("a---b"), "a-b");
  }

  #[test]
  fn derive_name_prefixes_when_not_starting_with_letter() {
    assert_eq!(derive_container_name_from_stem("2024_backup"), "db-2024_backup");
  }
}
