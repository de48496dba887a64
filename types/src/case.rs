//! Closed enums describing a case and the votes cast on it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// One of the two mutually exclusive positions a voter can take.
///
/// Side A is, by convention, the case owner's own framing of the dispute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    SideA,
    SideB,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SideA => "SIDE_A",
            Self::SideB => "SIDE_B",
        }
    }
}

impl FromStr for Side {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SIDE_A" => Ok(Self::SideA),
            "SIDE_B" => Ok(Self::SideB),
            other => Err(TypeError::UnknownSide(other.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a case. `Open → Closed` is the only transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Open,
    Closed,
}

impl CaseStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }
}

/// What caused a case to close.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClosureReason {
    /// The owner closed the case explicitly.
    ManualByOwner,
    /// The case reached the maximum lifetime.
    AutoTimeLimit,
    /// The vote split became decisive with enough votes cast.
    AutoVoteThreshold,
}

impl ClosureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManualByOwner => "MANUAL_BY_OWNER",
            Self::AutoTimeLimit => "AUTO_TIME_LIMIT",
            Self::AutoVoteThreshold => "AUTO_VOTE_THRESHOLD",
        }
    }

    /// Whether the closure was triggered by the system rather than a person.
    pub fn is_automatic(&self) -> bool {
        !matches!(self, Self::ManualByOwner)
    }
}

impl fmt::Display for ClosureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved outcome of a closed case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    SideAWins,
    SideBWins,
    Tied,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SideAWins => "SIDE_A_WINS",
            Self::SideBWins => "SIDE_B_WINS",
            Self::Tied => "TIED",
        }
    }

    /// The winning side, if any.
    pub fn winner(&self) -> Option<Side> {
        match self {
            Self::SideAWins => Some(Side::SideA),
            Self::SideBWins => Some(Side::SideB),
            Self::Tied => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic a case is filed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    RoommateDisputes,
    RelationshipIssues,
    WorkplaceConflicts,
    FamilyDrama,
    FriendDisagreements,
    MoneyPayments,
    Politics,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Self::RoommateDisputes,
        Self::RelationshipIssues,
        Self::WorkplaceConflicts,
        Self::FamilyDrama,
        Self::FriendDisagreements,
        Self::MoneyPayments,
        Self::Politics,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoommateDisputes => "ROOMMATE_DISPUTES",
            Self::RelationshipIssues => "RELATIONSHIP_ISSUES",
            Self::WorkplaceConflicts => "WORKPLACE_CONFLICTS",
            Self::FamilyDrama => "FAMILY_DRAMA",
            Self::FriendDisagreements => "FRIEND_DISAGREEMENTS",
            Self::MoneyPayments => "MONEY_PAYMENTS",
            Self::Politics => "POLITICS",
            Self::Other => "OTHER",
        }
    }
}

impl FromStr for Category {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| TypeError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
