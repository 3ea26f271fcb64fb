//! Competitor and Standing data structures.

use crate::models::competition::CompetitionId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a competitor (used in fixtures, orderings and lookups).
pub type CompetitorId = Uuid;

/// Running statistics of a competitor within one competition.
///
/// Mutated only by the standings ledger when a result is confirmed or retracted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: i32,
}

impl Standing {
    /// Matches counted so far (confirmed results only).
    pub fn played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }
}

/// A participant entry scoped to one competition.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    pub name: String,
    /// Backing account, when the entry belongs to a registered user.
    pub account: Option<Uuid>,
    /// Optional team label shown next to the name.
    pub team: Option<String>,
    /// Group (child competition) this entry plays in during a group stage.
    pub group: Option<CompetitionId>,
    pub standing: Standing,
}

impl Competitor {
    /// Create a new competitor with the given name. Statistics start at zero.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            account: None,
            team: None,
            group: None,
            standing: Standing::default(),
        }
    }

    /// Create a competitor with a team label.
    pub fn with_team(name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            team: Some(team.into()),
            ..Self::new(name)
        }
    }
}
