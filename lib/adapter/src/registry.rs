//! Name-to-adapter lookup. Alias resolution is delegated to
//! `Engine::from_str` (case-insensitive, already knows every alias);
//! this module owns only the engine-to-adapter-instance mapping and
//! platform filtering.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use spindb_paths::Layout;
use spindb_types::{Engine, Error, Result};
use strum::IntoEnumIterator;

use crate::EngineAdapter;
use crate::engines::{file_embedded, http, mongo, mysql, postgres, redis};

/// Returns `false` for the handful of engine/platform combinations
/// that genuinely have no supported build, so `list_adapters_for_platform`
/// can filter them out rather than advertising an adapter that will
/// only ever fail with `BinaryMissing`.
fn supported_on_current_platform(engine: Engine) -> bool {
  match engine {
    #[cfg(windows)]
    Engine::TigerBeetle => false,
    _ => true,
  }
}

pub struct AdapterRegistry {
  adapters: HashMap<Engine, Arc<dyn EngineAdapter>>,
}

impl AdapterRegistry {
  /// Builds one adapter instance per engine, all sharing the same
  /// [`Layout`]. Cheap — adapters hold no state beyond their profile
  /// reference and a cloned `Layout`.
  pub fn new(layout: Layout) -> Self {
    let mut adapters: HashMap<Engine, Arc<dyn EngineAdapter>> = HashMap::new();

    for engine in [Engine::Postgres, Engine::CockroachDb] {
      adapters.insert(
        engine,
        Arc::new(postgres::PgWireAdapter::new(engine, layout.clone())),
      );
    }
    for engine in [Engine::Mysql, Engine::MariaDb] {
      adapters.insert(
        engine,
        Arc::new(mysql::MysqlWireAdapter::new(engine, layout.clone())),
      );
    }
    for engine in [Engine::Redis, Engine::Valkey] {
      adapters.insert(
        engine,
        Arc::new(redis::RedisWireAdapter::new(engine, layout.clone())),
      );
    }
    for engine in [Engine::MongoDb, Engine::FerretDb] {
      adapters.insert(
        engine,
        Arc::new(mongo::MongoWireAdapter::new(engine, layout.clone())),
      );
    }
    for engine in [
      Engine::ClickHouse,
      Engine::Qdrant,
      Engine::Meilisearch,
      Engine::CouchDb,
      Engine::SurrealDb,
      Engine::QuestDb,
      Engine::TypeDb,
      Engine::TigerBeetle,
      Engine::Weaviate,
    ] {
      adapters.insert(
        engine,
        Arc::new(http::HttpAdapter::new(engine, layout.clone())),
      );
    }
    for engine in [Engine::Sqlite, Engine::DuckDb] {
      adapters.insert(
        engine,
        Arc::new(file_embedded::FileEmbeddedAdapter::new(
          engine,
          layout.clone(),
        )),
      );
    }

    AdapterRegistry { adapters }
  }

  /// Case-insensitive lookup by canonical name or alias.
  pub fn get(&self, name_or_alias: &str) -> Result<Arc<dyn EngineAdapter>> {
    let engine = Engine::from_str(name_or_alias)?;
    self
      .adapters
      .get(&engine)
      .cloned()
      .ok_or_else(|| Error::Unsupported(format!("no adapter registered for {engine}")))
  }

  pub fn get_for_engine(&self, engine: Engine) -> Result<Arc<dyn EngineAdapter>> {
    self
      .adapters
      .get(&engine)
      .cloned()
      .ok_or_else(|| Error::Unsupported(format!("no adapter registered for {engine}")))
  }

  /// Every distinct engine this registry knows about, filtered to
  /// what the current platform supports. Backs the `engines list`
  /// command-surface entry.
  pub fn list_adapters_for_platform(&self) -> Vec<Engine> {
    Engine::iter()
      .filter(|e| supported_on_current_platform(*e))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn registry() -> AdapterRegistry {
    AdapterRegistry::new(Layout::with_root("/tmp/spindb-test-registry"))
  }

  #[test]
  fn lookup_resolves_canonical_name_and_alias_to_the_same_engine() {
    let reg = registry();
    assert_eq!(reg.get("postgres").unwrap().engine(), Engine::Postgres);
    assert_eq!(reg.get("pg").unwrap().engine(), Engine::Postgres);
    assert_eq!(reg.get("PG").unwrap().engine(), Engine::Postgres);
  }

  #[test]
  fn lookup_fails_for_unknown_name() {
    let reg = registry();
    assert!(reg.get("fakedb").is_err());
  }

  #[test]
  fn every_engine_has_exactly_one_registered_adapter() {
    let reg = registry();
    for engine in Engine::iter() {
      assert!(reg.get_for_engine(engine).is_ok(), "{engine} unregistered");
    }
  }

  #[test]
  fn platform_listing_has_no_duplicates() {
    let reg = registry();
    let listed = reg.list_adapters_for_platform();
    let mut sorted = listed.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(listed.len(), sorted.len());
  }
}
