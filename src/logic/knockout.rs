//! Single-elimination bracket engine: play-in round, named bracket rounds,
//! random pairing without replacement.

use crate::logic::{FormatEngine, Generated};
use crate::models::{
    Competition, CompetitionError, CompetitorId, Fixture, Registration, Round,
};
use rand::{Rng, RngCore};

/// Name of the last bracket round; confirming its fixture finishes the competition.
pub const FINAL_ROUND: &str = "Final";

/// Bracket round name by pool size.
pub fn round_label(pool: usize) -> String {
    match pool {
        2 => FINAL_ROUND.to_string(),
        4 => "Semi-final".to_string(),
        8 => "Quarter-final".to_string(),
        n => format!("Round of {}", n),
    }
}

pub struct Knockout;

impl FormatEngine for Knockout {
    fn generate_initial(
        &self,
        competition: &mut Competition,
        rng: &mut dyn RngCore,
    ) -> Result<Generated, CompetitionError> {
        generate_round(competition, rng)
    }

    fn generate_next(
        &self,
        competition: &mut Competition,
        rng: &mut dyn RngCore,
    ) -> Result<Generated, CompetitionError> {
        generate_round(competition, rng)
    }

    fn is_complete(&self, competition: &Competition) -> bool {
        competition.finished
    }
}

/// Generate the next bracket round.
///
/// The first call pools the full roster (via a play-in round when the roster
/// size is not a power of two); every later call pools the previous round's
/// promotion set. Refused while any current-round fixture lacks a result, with
/// no state change.
pub fn generate_round(
    competition: &mut Competition,
    rng: &mut dyn RngCore,
) -> Result<Generated, CompetitionError> {
    if competition.registration == Registration::Open {
        return Err(CompetitionError::RegistrationOpen);
    }
    if competition.finished {
        return Err(CompetitionError::CompetitionFinished);
    }
    if !competition.all_fixtures_finished() {
        return Err(CompetitionError::FixturesUnfinished);
    }

    if !competition.play_in_generated && competition.play_in_matches > 0 {
        return generate_play_in(competition, rng);
    }

    let mut pool: Vec<CompetitorId> = match competition.active_round() {
        Some(previous) => previous.promotion.clone(),
        None if competition.knockout_seeded => competition.promoted.clone(),
        None => competition.competitors.iter().map(|p| p.id).collect(),
    };
    if pool.len() < 2 {
        // The previous round has results entered but not yet confirmed, so
        // nobody has been promoted out of it.
        return Err(CompetitionError::FixturesUnfinished);
    }

    let number = competition.rounds.len() as u32 + 1;
    let mut round = Round::new(round_label(pool.len()), number, 1);
    let fixture_count = pool.len() / 2;
    for _ in 0..fixture_count {
        let first = draw(&mut pool, rng);
        let second = draw(&mut pool, rng);
        round.competitors.push(first);
        round.competitors.push(second);
        competition.fixtures.push(Fixture::new(round.id, first, second));
    }

    log::debug!(
        "generated {} with {} fixtures for '{}'",
        round.name,
        fixture_count,
        competition.name
    );
    let generated = Generated::Round {
        round: round.id,
        name: round.name.clone(),
        fixtures: fixture_count,
    };
    competition.current_round = Some(round.id);
    competition.rounds.push(round);
    Ok(generated)
}

/// Preliminary round: randomly drawn pairs play down to the nearest lower
/// power of two; everyone left in the pool advances without playing.
fn generate_play_in(
    competition: &mut Competition,
    rng: &mut dyn RngCore,
) -> Result<Generated, CompetitionError> {
    let mut pool: Vec<CompetitorId> = competition.competitors.iter().map(|p| p.id).collect();
    let fixture_count = competition.play_in_matches as usize;
    let mut round = Round::new("Play-in", competition.rounds.len() as u32 + 1, 1);
    for _ in 0..fixture_count {
        let first = draw(&mut pool, rng);
        let second = draw(&mut pool, rng);
        round.competitors.push(first);
        round.competitors.push(second);
        competition.fixtures.push(Fixture::new(round.id, first, second));
    }
    // The rest of the roster sits the play-in out and is promoted directly.
    round.promotion = pool;

    log::debug!(
        "generated play-in with {} fixtures for '{}'",
        fixture_count,
        competition.name
    );
    let generated = Generated::Round {
        round: round.id,
        name: round.name.clone(),
        fixtures: fixture_count,
    };
    competition.play_in_generated = true;
    competition.current_round = Some(round.id);
    competition.rounds.push(round);
    Ok(generated)
}

/// Remove and return one uniformly random competitor from the pool.
fn draw(pool: &mut Vec<CompetitorId>, rng: &mut dyn RngCore) -> CompetitorId {
    let index = rng.gen_range(0..pool.len());
    pool.swap_remove(index)
}
