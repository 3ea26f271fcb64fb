//! Round-robin engine: circle-method schedule with byes, parity-alternating
//! orientation and an optional mirrored second leg.

use crate::logic::{FormatEngine, Generated};
use crate::models::{
    Competition, CompetitionError, CompetitorId, Fixture, Legs, Registration, Round, Slot,
};
use rand::RngCore;

pub struct League {
    pub legs: Legs,
}

impl FormatEngine for League {
    fn generate_initial(
        &self,
        competition: &mut Competition,
        _rng: &mut dyn RngCore,
    ) -> Result<Generated, CompetitionError> {
        generate_schedule(competition, self.legs)
    }

    fn generate_next(
        &self,
        _competition: &mut Competition,
        _rng: &mut dyn RngCore,
    ) -> Result<Generated, CompetitionError> {
        Err(CompetitionError::ScheduleAlreadyGenerated)
    }

    fn is_complete(&self, competition: &Competition) -> bool {
        competition.schedule_generated && competition.all_fixtures_confirmed()
    }
}

/// Generate the full league schedule from the persisted ordering.
///
/// With L slots (even by construction, a bye slot padding odd rosters) the
/// rotation yields L−1 matchdays; the competitor paired against the bye slot
/// records a bye for that matchday. Orientation alternates with matchday
/// parity, and the double-leg variant mirrors every fixture into a paired
/// matchday at index `n + L − 1`.
pub fn generate_schedule(
    competition: &mut Competition,
    legs: Legs,
) -> Result<Generated, CompetitionError> {
    if competition.registration == Registration::Open {
        return Err(CompetitionError::RegistrationOpen);
    }
    if competition.schedule_generated {
        return Err(CompetitionError::ScheduleAlreadyGenerated);
    }

    let slots = competition.ordering.clone();
    let total = slots.len() as u32;
    let mut rotation = slots;
    let mut rounds_created = 0u32;
    let mut fixtures_created = 0usize;

    for number in 1..total {
        let (pairs, bye) = pair_first_with_last(&rotation);

        let mut round = Round::new(format!("Matchday {}", number), number, 1);
        round.pausing = bye;
        let mut second_leg = match legs {
            Legs::Single => None,
            Legs::Double => {
                let mut r =
                    Round::new(format!("Matchday {}", number + total - 1), number + total - 1, 2);
                r.pausing = bye;
                Some(r)
            }
        };

        for (front, back) in pairs {
            // Even matchdays keep the pairing orientation, odd ones reverse
            // it, so home fixtures balance over the season.
            let (first, second) = if number % 2 == 0 {
                (front, back)
            } else {
                (back, front)
            };
            round.competitors.push(first);
            round.competitors.push(second);
            competition.fixtures.push(Fixture::new(round.id, first, second));
            fixtures_created += 1;
            if let Some(r) = second_leg.as_mut() {
                r.competitors.push(second);
                r.competitors.push(first);
                competition.fixtures.push(Fixture::new(r.id, second, first));
                fixtures_created += 1;
            }
        }

        competition.rounds.push(round);
        rounds_created += 1;
        if let Some(r) = second_leg {
            competition.rounds.push(r);
            rounds_created += 1;
        }

        rotate(&mut rotation);
    }

    competition.schedule_generated = true;
    competition.total_rounds = rounds_created;
    log::debug!(
        "generated {} matchdays with {} fixtures for '{}'",
        rounds_created,
        fixtures_created,
        competition.name
    );
    Ok(Generated::Schedule {
        rounds: rounds_created,
        fixtures: fixtures_created,
    })
}

/// Pair position 0 with position L−1, 1 with L−2, and so on. A pair involving
/// the bye slot instead yields the paused competitor for that matchday.
fn pair_first_with_last(slots: &[Slot]) -> (Vec<(CompetitorId, CompetitorId)>, Option<CompetitorId>) {
    let mut pairs = Vec::new();
    let mut bye = None;
    let mut front = 0;
    let mut back = slots.len().saturating_sub(1);
    while front < back {
        match (slots[front], slots[back]) {
            (Slot::Entrant(a), Slot::Entrant(b)) => pairs.push((a, b)),
            (Slot::Bye, Slot::Entrant(p)) | (Slot::Entrant(p), Slot::Bye) => bye = Some(p),
            // At most one bye slot exists, so two can never meet.
            (Slot::Bye, Slot::Bye) => {}
        }
        front += 1;
        back -= 1;
    }
    (pairs, bye)
}

/// Classic round-robin rotation: the first slot stays put, the last slot
/// moves to position 1 and everything else shifts right.
fn rotate(slots: &mut Vec<Slot>) {
    if let Some(last) = slots.pop() {
        slots.insert(1, last);
    }
}
