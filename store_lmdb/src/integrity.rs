//! LMDB database integrity checks.
//!
//! Run on startup to detect corruption early, before the node begins
//! serving requests or sweeping cases.

use std::path::Path;

use jury_store::CaseRecord;

use crate::case::open_case_key;
use crate::environment::LmdbEnvironment;
use crate::LmdbError;

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub open_cases: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check LMDB database integrity on startup.
///
/// Counts the entries of every database and cross-checks the open-case index
/// against the case records: every open case must be indexed, and nothing
/// else may be. Read failures are recorded in the report rather than causing
/// a hard error.
pub fn check_integrity(env: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();
    let rtxn = env.env.read_txn()?;

    let databases = [
        ("cases", env.cases_db),
        ("votes", env.votes_db),
        ("rewards", env.rewards_db),
        ("open_cases", env.open_cases_db),
        ("meta", env.meta_db),
    ];
    for (name, db) in databases {
        report.databases_checked += 1;
        match db.len(&rtxn) {
            Ok(count) => report.total_entries += count,
            Err(e) => report
                .errors
                .push(format!("failed to read database '{}': {}", name, e)),
        }
    }

    let mut indexed_open = 0u64;
    for result in env.cases_db.iter(&rtxn)? {
        let (key, val) = match result {
            Ok(entry) => entry,
            Err(e) => {
                report.errors.push(format!("failed to iterate cases: {}", e));
                break;
            }
        };
        let case: CaseRecord = match bincode::deserialize(val) {
            Ok(case) => case,
            Err(e) => {
                report
                    .errors
                    .push(format!("undecodable case record {:02x?}: {}", key, e));
                continue;
            }
        };
        let indexed = env
            .open_cases_db
            .get(&rtxn, &open_case_key(case.created_at, &case.id))?
            .is_some();
        match (case.is_open(), indexed) {
            (true, true) => {
                report.open_cases += 1;
                indexed_open += 1;
            }
            (true, false) => report
                .errors
                .push(format!("open case {} missing from index", case.id)),
            (false, true) => {
                indexed_open += 1;
                report
                    .errors
                    .push(format!("closed case {} still indexed as open", case.id))
            }
            (false, false) => {}
        }
    }

    let index_len = env.open_cases_db.len(&rtxn)?;
    if index_len != indexed_open {
        report.errors.push(format!(
            "open case index has {} entries but only {} match a case",
            index_len, indexed_open
        ));
    }

    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing, which suggests
/// corruption or misconfiguration.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(format!(
            "LMDB directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}
