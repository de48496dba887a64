//! Case submission and validation.

use std::sync::atomic::Ordering;

use serde::{Deserialize, Serialize};
use tracing::info;

use jury_store::{CaseRecord, StoreError};
use jury_types::{CaseId, Category, Timestamp, UserId};

use crate::engine::CaseLifecycle;
use crate::error::LifecycleError;
use crate::events::LifecycleEvent;

pub const TITLE_MIN_CHARS: usize = 10;
pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MIN_CHARS: usize = 20;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const SIDE_LABEL_MAX_CHARS: usize = 50;

pub const DEFAULT_SIDE_A_LABEL: &str = "Side A";
pub const DEFAULT_SIDE_B_LABEL: &str = "Side B";

/// Attempts at finding an unused id before giving up.
const MAX_ID_ATTEMPTS: u32 = 8;

/// A case as submitted by its owner, before validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSubmission {
    pub title: String,
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub side_a_label: Option<String>,
    #[serde(default)]
    pub side_b_label: Option<String>,
}

/// Validated, trimmed submission fields.
struct ValidSubmission {
    title: String,
    description: String,
    category: Category,
    side_a_label: String,
    side_b_label: String,
}

impl CaseSubmission {
    fn validate(&self) -> Result<ValidSubmission, LifecycleError> {
        let title = self.title.trim();
        check_length("title", title, TITLE_MIN_CHARS, TITLE_MAX_CHARS)?;
        let description = self.description.trim();
        check_length(
            "description",
            description,
            DESCRIPTION_MIN_CHARS,
            DESCRIPTION_MAX_CHARS,
        )?;

        Ok(ValidSubmission {
            title: title.to_string(),
            description: description.to_string(),
            category: self.category,
            side_a_label: side_label("side A label", &self.side_a_label, DEFAULT_SIDE_A_LABEL)?,
            side_b_label: side_label("side B label", &self.side_b_label, DEFAULT_SIDE_B_LABEL)?,
        })
    }
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), LifecycleError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(LifecycleError::InvalidCase(format!(
            "{field} must be between {min} and {max} characters, got {len}"
        )));
    }
    Ok(())
}

/// A blank or missing label falls back to the default.
fn side_label(
    field: &str,
    label: &Option<String>,
    default: &str,
) -> Result<String, LifecycleError> {
    match label.as_deref().map(str::trim) {
        None | Some("") => Ok(default.to_string()),
        Some(label) => {
            check_length(field, label, 1, SIDE_LABEL_MAX_CHARS)?;
            Ok(label.to_string())
        }
    }
}

impl CaseLifecycle {
    /// Validate a submission and store it as a new open case.
    pub fn open_case(
        &self,
        owner: &UserId,
        submission: &CaseSubmission,
        now: Timestamp,
    ) -> Result<CaseRecord, LifecycleError> {
        let valid = submission.validate()?;
        let mut case = CaseRecord {
            id: CaseId::new([0; CaseId::LEN]),
            owner: owner.clone(),
            title: valid.title,
            description: valid.description,
            category: valid.category,
            side_a_label: valid.side_a_label,
            side_b_label: valid.side_b_label,
            created_at: now,
            closure: None,
        };

        let mut attempts = 0;
        loop {
            let nonce = self.id_nonce.fetch_add(1, Ordering::Relaxed);
            case.id = CaseId::derive(owner, &case.title, now, nonce);
            match self.store.insert_case(&case) {
                Ok(()) => break,
                Err(StoreError::Duplicate(_)) if attempts + 1 < MAX_ID_ATTEMPTS => attempts += 1,
                Err(e) => return Err(e.into()),
            }
        }

        info!(case = %case.id, owner = %owner, category = %case.category, "case opened");
        self.events.emit(&LifecycleEvent::CaseOpened {
            case_id: case.id,
            owner: owner.clone(),
            category: case.category,
        });
        Ok(case)
    }
}
