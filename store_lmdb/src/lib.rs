//! LMDB storage backend for the jury case lifecycle.
//!
//! Implements all storage traits from `jury-store` using the `heed` LMDB
//! bindings. Each logical store maps to one or more LMDB databases within a
//! single environment, so a case closure and the matching reward credit can
//! share one write transaction.

pub mod case;
pub mod environment;
pub mod error;
pub mod integrity;
pub mod rewards;
pub mod vote;

pub use environment::{LmdbEnvironment, CURRENT_SCHEMA_VERSION};
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
