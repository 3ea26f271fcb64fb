//! Round: one generated stage of a competition.

use crate::models::competitor::CompetitorId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a round.
pub type RoundId = Uuid;

/// One generated stage: its entrants, the subset promoted out of it and,
/// for league rounds, the competitor pausing that matchday.
///
/// Immutable once its fixtures exist, except for the promotion set which the
/// ledger mutates as knockout results come in.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub name: String,
    /// Ordering key: matchday number for league rounds, generation counter for
    /// bracket rounds.
    pub number: u32,
    /// 1 or 2; second-leg league rounds carry 2.
    pub leg: u8,
    /// Competitors playing in this round.
    pub competitors: Vec<CompetitorId>,
    /// Competitors advancing out of this round (knockout rounds only).
    pub promotion: Vec<CompetitorId>,
    /// Competitor receiving a bye this round (league rounds with an odd roster).
    pub pausing: Option<CompetitorId>,
}

impl Round {
    pub fn new(name: impl Into<String>, number: u32, leg: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            number,
            leg,
            competitors: Vec::new(),
            promotion: Vec::new(),
            pausing: None,
        }
    }
}
