//! One submodule per wire family. Each exposes a single adapter
//! struct parameterized by a [`crate::profile::EngineProfile`]; the
//! struct, not the module, is the unit the registry instantiates once
//! per covered engine.

pub mod file_embedded;
pub mod http;
pub mod mongo;
pub mod mysql;
pub mod postgres;
pub mod redis;
