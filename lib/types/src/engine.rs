use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

/// A database implementation variant managed by this system.
///
/// Lookup by name is case-insensitive and goes through
/// `spindb_adapter::registry`, which also knows about aliases
/// (`pg` -> Postgres, `cockroach` -> CockroachDb). This enum is the
/// canonical identity used as half of the catalogue key
/// `(engine, name)`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Engine {
  Postgres,
  Mysql,
  MariaDb,
  Sqlite,
  DuckDb,
  MongoDb,
  FerretDb,
  Redis,
  Valkey,
  ClickHouse,
  Qdrant,
  Meilisearch,
  CouchDb,
  CockroachDb,
  SurrealDb,
  QuestDb,
  TypeDb,
  TigerBeetle,
  Weaviate,
}

impl Engine {
  /// File-embedded engines have no server process; their "instance"
  /// is a file on disk.
  pub fn is_file_embedded(self) -> bool {
    matches!(self, Engine::Sqlite | Engine::DuckDb)
  }

  /// The directory name used under the user root, e.g. `postgres`,
  /// `mariadb`. Distinct from the wire/CLI name map owned by the
  /// adapter registry.
  pub fn dir_name(self) -> &'static str {
    self.as_ref()
  }
}

impl std::fmt::Display for Engine {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_ref())
  }
}

impl FromStr for Engine {
  type Err = crate::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    use Engine::*;
    let normalized = s.to_ascii_lowercase();
    Ok(match normalized.as_str() {
      "postgres" | "postgresql" | "pg" => Postgres,
      "mysql" => Mysql,
      "mariadb" | "maria" => MariaDb,
      "sqlite" | "sqlite3" => Sqlite,
      "duckdb" => DuckDb,
      "mongodb" | "mongo" => MongoDb,
      "ferretdb" | "ferret" => FerretDb,
      "redis" => Redis,
      "valkey" => Valkey,
      "clickhouse" | "ch" => ClickHouse,
      "qdrant" => Qdrant,
      "meilisearch" | "meili" => Meilisearch,
      "couchdb" | "couch" => CouchDb,
      "cockroachdb" | "cockroach" | "crdb" => CockroachDb,
      "surrealdb" | "surreal" => SurrealDb,
      "questdb" | "quest" => QuestDb,
      "typedb" | "type" => TypeDb,
      "tigerbeetle" | "tb" => TigerBeetle,
      "weaviate" => Weaviate,
      other => {
        return Err(crate::Error::InvalidInput(format!(
          "unknown engine '{other}'"
        )));
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn aliases_resolve_to_canonical_engine() {
    assert_eq!("pg".parse::<Engine>().unwrap(), Engine::Postgres);
    assert_eq!(
      "cockroach".parse::<Engine>().unwrap(),
      Engine::CockroachDb
    );
    assert_eq!("sqlite3".parse::<Engine>().unwrap(), Engine::Sqlite);
  }

  #[test]
  fn unknown_engine_is_invalid_input() {
    assert!(matches!(
      "fakedb".parse::<Engine>(),
      Err(crate::Error::InvalidInput(_))
    ));
  }

  #[test]
  fn file_embedded_classification() {
    assert!(Engine::Sqlite.is_file_embedded());
    assert!(Engine::DuckDb.is_file_embedded());
    assert!(!Engine::Postgres.is_file_embedded());
  }
}
