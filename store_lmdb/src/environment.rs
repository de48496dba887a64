//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::LmdbError;

/// The schema version that the current code writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// Number of named databases opened by [`LmdbEnvironment::open`].
pub const DATABASE_COUNT: u32 = 5;

/// Wraps the LMDB environment and all database handles.
///
/// Implements every `jury-store` trait, so one `Arc<LmdbEnvironment>` can be
/// handed to the lifecycle as its `JuryStore`.
pub struct LmdbEnvironment {
    pub(crate) env: Arc<Env>,
    /// `case_id` → bincode `CaseRecord`.
    pub(crate) cases_db: Database<Bytes, Bytes>,
    /// `case_id ++ voter` → bincode `VoteRecord`.
    pub(crate) votes_db: Database<Bytes, Bytes>,
    /// `user` → bincode `UserRewards`.
    pub(crate) rewards_db: Database<Bytes, Bytes>,
    /// `created_at (big-endian) ++ case_id` → empty. Holds open cases only.
    pub(crate) open_cases_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process for this path
        // and never from a second handle concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs.max(DATABASE_COUNT))
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let cases_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("cases"))?;
        let votes_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("votes"))?;
        let rewards_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("rewards"))?;
        let open_cases_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("open_cases"))?;
        let meta_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("meta"))?;

        let stored = match meta_db.get(&wtxn, SCHEMA_VERSION_KEY)? {
            Some(bytes) => decode_version(bytes)?,
            None => 0,
        };
        if stored > CURRENT_SCHEMA_VERSION {
            return Err(LmdbError::SchemaTooNew {
                found: stored,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        if stored < CURRENT_SCHEMA_VERSION {
            tracing::info!(
                from = stored,
                to = CURRENT_SCHEMA_VERSION,
                "initialising database schema"
            );
            meta_db.put(
                &mut wtxn,
                SCHEMA_VERSION_KEY,
                &CURRENT_SCHEMA_VERSION.to_le_bytes(),
            )?;
        }
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), "LMDB environment opened");

        Ok(Self {
            env: Arc::new(env),
            cases_db,
            votes_db,
            rewards_db,
            open_cases_db,
            meta_db,
        })
    }

    /// The underlying heed environment.
    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// The schema version recorded in the meta database.
    pub fn schema_version(&self) -> Result<u32, LmdbError> {
        let rtxn = self.env.read_txn()?;
        match self.meta_db.get(&rtxn, SCHEMA_VERSION_KEY)? {
            Some(bytes) => decode_version(bytes),
            None => Ok(0),
        }
    }
}

fn decode_version(bytes: &[u8]) -> Result<u32, LmdbError> {
    let arr: [u8; 4] = bytes.try_into().map_err(|_| {
        LmdbError::Serialization(format!(
            "schema version has invalid length: expected 4, got {}",
            bytes.len()
        ))
    })?;
    Ok(u32::from_le_bytes(arr))
}
