mod container;
mod credential;
mod embedded;
mod engine;
mod error;

pub use container::*;
pub use credential::*;
pub use embedded::*;
pub use engine::*;
pub use error::*;

/// Sortable, human-readable timestamp used throughout the catalogue
/// and registry files. RFC 3339 in UTC, e.g. `2026-07-26T10:03:12Z`.
pub fn spindb_timestamp() -> String {
  chrono::Utc::now().to_rfc3339()
}
