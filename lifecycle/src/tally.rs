//! Vote tally views.

use serde::{Deserialize, Serialize};

use jury_store::CaseRecord;
use jury_types::{Side, VoteTally};

/// Tally with display percentages, as shown on a case page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallySummary {
    pub side_a_votes: u64,
    pub side_b_votes: u64,
    pub total_votes: u64,
    /// Rounded half-up; an empty tally reads 50/50.
    pub side_a_percent: u8,
    pub side_b_percent: u8,
}

impl From<VoteTally> for TallySummary {
    fn from(tally: VoteTally) -> Self {
        Self {
            side_a_votes: tally.side_a,
            side_b_votes: tally.side_b,
            total_votes: tally.total(),
            side_a_percent: tally.display_percent(Side::SideA),
            side_b_percent: tally.display_percent(Side::SideB),
        }
    }
}

/// A case together with its current tally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseView {
    pub case: CaseRecord,
    pub tally: TallySummary,
}
