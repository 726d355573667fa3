use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A saved credential, either a password bundle or an API-key
/// bundle. Serialized to/from `KEY=VALUE` files by
/// `spindb_credentials`, never directly to JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialBundle {
  Password(PasswordCredential),
  ApiKey(ApiKeyCredential),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCredential {
  pub db_user: String,
  pub db_password: String,
  pub db_host: String,
  pub db_port: String,
  pub db_name: String,
  pub db_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyCredential {
  pub api_key_name: String,
  pub api_key: String,
  pub api_url: String,
}

impl CredentialBundle {
  /// Converts to the flat `KEY=VALUE` map written to disk, in a
  /// stable field order.
  pub fn to_fields(&self) -> BTreeMap<&'static str, String> {
    let mut map = BTreeMap::new();
    match self {
      CredentialBundle::Password(p) => {
        map.insert("DB_USER", p.db_user.clone());
        map.insert("DB_PASSWORD", p.db_password.clone());
        map.insert("DB_HOST", p.db_host.clone());
        map.insert("DB_PORT", p.db_port.clone());
        map.insert("DB_NAME", p.db_name.clone());
        map.insert("DB_URL", p.db_url.clone());
      }
      CredentialBundle::ApiKey(a) => {
        map.insert("API_KEY_NAME", a.api_key_name.clone());
        map.insert("API_KEY", a.api_key.clone());
        map.insert("API_URL", a.api_url.clone());
      }
    }
    map
  }

  /// Reconstructs a bundle from the parsed `KEY=VALUE` map. An
  /// API-key bundle requires `API_KEY_NAME`, `API_KEY`, `API_URL`; a
  /// password bundle requires `DB_USER`, `DB_PASSWORD` (empty
  /// allowed), `DB_URL`. Fails with `CorruptCredentials` (mapped to
  /// `Error::CorruptArtifact`) if neither required set is complete.
  pub fn from_fields(
    fields: &BTreeMap<String, String>,
  ) -> crate::Result<Self> {
    if let (Some(name), Some(key), Some(url)) = (
      fields.get("API_KEY_NAME"),
      fields.get("API_KEY"),
      fields.get("API_URL"),
    ) {
      return Ok(CredentialBundle::ApiKey(ApiKeyCredential {
        api_key_name: name.clone(),
        api_key: key.clone(),
        api_url: url.clone(),
      }));
    }
    if let (Some(user), Some(password), Some(url)) = (
      fields.get("DB_USER"),
      fields.get("DB_PASSWORD"),
      fields.get("DB_URL"),
    ) {
      return Ok(CredentialBundle::Password(PasswordCredential {
        db_user: user.clone(),
        db_password: password.clone(),
        db_host: fields.get("DB_HOST").cloned().unwrap_or_default(),
        db_port: fields.get("DB_PORT").cloned().unwrap_or_default(),
        db_name: fields.get("DB_NAME").cloned().unwrap_or_default(),
        db_url: url.clone(),
      }));
    }
    Err(crate::Error::CorruptArtifact(
      "credential file is missing required keys".into(),
    ))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn password_bundle_round_trips_through_fields() {
    let bundle = CredentialBundle::Password(PasswordCredential {
      db_user: "admin".into(),
      db_password: "p=w\n\"q\\\\".into(),
      db_host: "127.0.0.1".into(),
      db_port: "5432".into(),
      db_name: "pg1".into(),
      db_url: "postgresql://admin@127.0.0.1:5432/pg1".into(),
    });
    let fields: BTreeMap<String, String> = bundle
      .to_fields()
      .into_iter()
      .map(|(k, v)| (k.to_string(), v))
      .collect();
    let parsed = CredentialBundle::from_fields(&fields).unwrap();
    assert_eq!(parsed, bundle);
  }

  #[test]
  fn missing_required_keys_is_corrupt() {
    let mut fields = BTreeMap::new();
    fields.insert("DB_USER".to_string(), "admin".to_string());
    assert!(CredentialBundle::from_fields(&fields).is_err());
  }
}
