pub mod backup;
pub mod clone;
pub mod create;
pub mod delete;
pub mod engines;
pub mod info;
pub mod list;
pub mod query;
pub mod rename;
pub mod restore;
pub mod run;
pub mod start;
pub mod stop;
pub mod users;

use spindb_adapter::AdapterRegistry;
use spindb_backup::BackupOrchestrator;
use spindb_container::ContainerManager;
use spindb_credentials::CredentialStore;
use spindb_paths::Layout;

/// Everything a command handler needs, built once in `main` and
/// shared by reference. Each collaborator is cheap to construct and
/// holds only a cloned `Layout`, so there's no reason to build more
/// than one of each.
pub struct Ctx {
  pub manager: ContainerManager,
  pub adapters: AdapterRegistry,
  pub backups: BackupOrchestrator,
  pub credentials: CredentialStore,
  pub json: bool,
}

impl Ctx {
  pub fn new(layout: Layout, json: bool) -> Self {
    Ctx {
      manager: ContainerManager::new(layout.clone()),
      adapters: AdapterRegistry::new(layout.clone()),
      backups: BackupOrchestrator::new(layout.clone()),
      credentials: CredentialStore::new(layout),
      json,
    }
  }
}
