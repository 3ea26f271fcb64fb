//! Competition logic: registration close, the three scheduling engines,
//! the standings ledger and result operations.

mod groups;
mod knockout;
mod league;
mod ledger;
mod registration;
mod results;

use crate::models::{Competition, CompetitionError, Format, Registration};
use rand::RngCore;
use serde::Serialize;

pub use groups::{generate_groups, generate_knockout_round};
pub use knockout::{generate_round, round_label, FINAL_ROUND};
pub use league::generate_schedule;
pub use ledger::{group_standings, settle, standings, Direction};
pub use registration::{close_registration, play_in_matches, CloseOutcome};
pub use results::{confirm_result, delete_result, enter_result, reject_result, report_result};

/// What one generation call produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Generated {
    /// A bracket round (knockout, play-in or the knockout phase of groups).
    Round {
        round: crate::models::RoundId,
        name: String,
        fixtures: usize,
    },
    /// A complete league schedule.
    Schedule { rounds: u32, fixtures: usize },
    /// A complete group stage: one league schedule per group.
    Groups { groups: usize, rounds_per_group: u32 },
}

/// One scheduling engine per format variant. `generate_initial` produces the
/// first stage from the closed roster, `generate_next` every stage after it.
pub trait FormatEngine {
    fn generate_initial(
        &self,
        competition: &mut Competition,
        rng: &mut dyn RngCore,
    ) -> Result<Generated, CompetitionError>;

    fn generate_next(
        &self,
        competition: &mut Competition,
        rng: &mut dyn RngCore,
    ) -> Result<Generated, CompetitionError>;

    fn is_complete(&self, competition: &Competition) -> bool;
}

/// The engine implementing a format.
pub fn engine(format: Format) -> Box<dyn FormatEngine> {
    match format {
        Format::Knockout => Box::new(knockout::Knockout),
        Format::League(legs) => Box::new(league::League { legs }),
        Format::GroupsThenKnockout(legs) => Box::new(groups::GroupStage { legs }),
    }
}

/// Generate the competition's next stage, whichever engine its format uses.
pub fn generate(
    competition: &mut Competition,
    rng: &mut dyn RngCore,
) -> Result<Generated, CompetitionError> {
    if competition.registration == Registration::Open {
        return Err(CompetitionError::RegistrationOpen);
    }
    let engine = engine(competition.format);
    if competition.stage_started() {
        engine.generate_next(competition, rng)
    } else {
        engine.generate_initial(competition, rng)
    }
}
