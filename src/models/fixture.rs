//! Fixture: one scheduled match between two competitors.

use crate::models::competitor::CompetitorId;
use crate::models::round::RoundId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a fixture.
pub type FixtureId = Uuid;

/// A single fixture: two competitors, two optional scores and the entry/confirmation flags.
///
/// The competitor order is semantic ("first" vs "second"); in league rounds the
/// orientation alternates so that home fixtures balance out over a season.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub round: RoundId,
    pub competitor1: CompetitorId,
    pub competitor2: CompetitorId,
    /// None until a result has been entered.
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    /// A score has been entered (possibly awaiting confirmation).
    pub finished: bool,
    /// The second party, or the organizer, has accepted the result.
    pub confirmed: bool,
}

impl Fixture {
    pub fn new(round: RoundId, competitor1: CompetitorId, competitor2: CompetitorId) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            competitor1,
            competitor2,
            score1: None,
            score2: None,
            finished: false,
            confirmed: false,
        }
    }

    /// Both entered scores, when the fixture has a result.
    pub fn result(&self) -> Option<(u32, u32)> {
        self.score1.zip(self.score2)
    }

    /// Clear the result and both flags (retraction / rejection).
    pub fn reset(&mut self) {
        self.score1 = None;
        self.score2 = None;
        self.finished = false;
        self.confirmed = false;
    }
}
