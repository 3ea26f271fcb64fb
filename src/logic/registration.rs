//! Registration close: persisted ordering, play-in math and round counts.

use crate::models::{Competition, CompetitionError, CompetitorId, Format, Registration, Slot};
use rand::seq::SliceRandom;
use rand::RngCore;
use serde::Serialize;

/// What closing registration produced, by format.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseOutcome {
    /// Knockout: projected bracket depth and required play-in fixtures.
    Bracket { rounds: u32, play_in_matches: u32 },
    /// League / group formats: the persisted shuffled ordering.
    Ordering { slots: Vec<Slot> },
}

/// Close registration and fix the inputs every engine derives its schedule
/// from. Knockout computes the play-in count; league and group formats
/// shuffle the roster once into the persisted ordering, appending a bye
/// marker when the count is odd.
pub fn close_registration(
    competition: &mut Competition,
    rng: &mut dyn RngCore,
) -> Result<CloseOutcome, CompetitionError> {
    if competition.registration != Registration::Open {
        return Err(CompetitionError::RegistrationClosed);
    }
    let count = competition.competitors.len();
    let required = competition.format.min_competitors();
    if count < required {
        return Err(CompetitionError::NotEnoughCompetitors { required });
    }

    let outcome = match competition.format {
        Format::Knockout => {
            competition.play_in_matches = play_in_matches(count);
            competition.total_rounds = bracket_rounds(count);
            CloseOutcome::Bracket {
                rounds: competition.total_rounds,
                play_in_matches: competition.play_in_matches,
            }
        }
        Format::League(_) | Format::GroupsThenKnockout(_) => {
            let mut ids: Vec<CompetitorId> =
                competition.competitors.iter().map(|p| p.id).collect();
            ids.shuffle(rng);
            let mut slots: Vec<Slot> = ids.into_iter().map(Slot::Entrant).collect();
            if slots.len() % 2 != 0 {
                slots.push(Slot::Bye);
            }
            competition.ordering = slots.clone();
            CloseOutcome::Ordering { slots }
        }
    };
    competition.registration = Registration::Closed;
    log::debug!(
        "closed registration for '{}' with {} competitors",
        competition.name,
        count
    );
    Ok(outcome)
}

/// Play-in fixtures needed to cut a roster to the next lower power of two.
///
/// Literal size table: exact powers of two need none; sizes strictly between
/// two powers need the distance to the lower one; 120 and above run a full
/// bracket with no play-in.
pub fn play_in_matches(count: usize) -> u32 {
    match count {
        0..=4 => 0,
        5..=7 => (count - 4) as u32,
        8 => 0,
        9..=15 => (count - 8) as u32,
        16 => 0,
        17..=31 => (count - 16) as u32,
        32 => 0,
        33..=63 => (count - 32) as u32,
        64 => 0,
        65..=119 => (count - 64) as u32,
        _ => 0,
    }
}

/// Projected number of bracket rounds for a roster size (literal table).
fn bracket_rounds(count: usize) -> u32 {
    match count {
        0..=7 => 2,
        8..=15 => 3,
        16 => 4,
        17..=32 => 5,
        33..=64 => 6,
        _ => 7,
    }
}
