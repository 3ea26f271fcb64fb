//! Group-stage composer: balanced round-robin groups, then a knockout
//! bracket seeded from each group's top two.

use crate::logic::{knockout, league, FormatEngine, Generated};
use crate::models::{
    Competition, CompetitionError, CompetitorId, Format, Legs, Registration, Slot,
};
use rand::RngCore;

/// Competitors promoted out of each group into the knockout phase.
const PROMOTED_PER_GROUP: usize = 2;

pub struct GroupStage {
    pub legs: Legs,
}

impl FormatEngine for GroupStage {
    fn generate_initial(
        &self,
        competition: &mut Competition,
        _rng: &mut dyn RngCore,
    ) -> Result<Generated, CompetitionError> {
        generate_groups(competition, self.legs)
    }

    fn generate_next(
        &self,
        competition: &mut Competition,
        rng: &mut dyn RngCore,
    ) -> Result<Generated, CompetitionError> {
        generate_knockout_round(competition, rng)
    }

    fn is_complete(&self, competition: &Competition) -> bool {
        competition.finished
    }
}

/// Number of groups for a roster size.
fn group_count(competitors: usize) -> usize {
    if competitors >= 128 {
        32
    } else if competitors >= 64 {
        16
    } else if competitors >= 32 {
        8
    } else if competitors >= 16 {
        4
    } else {
        2
    }
}

/// Partition the persisted ordering into balanced groups and generate one
/// league schedule per group.
///
/// The parent's bye slot is stripped first; identifiers are dealt one at a
/// time cycling through the groups, and any group left with an odd size gets
/// its own bye slot back. Each group becomes a child league competition with
/// its own ordering and a back-reference to the parent.
pub fn generate_groups(
    competition: &mut Competition,
    legs: Legs,
) -> Result<Generated, CompetitionError> {
    if competition.registration == Registration::Open {
        return Err(CompetitionError::RegistrationOpen);
    }
    if competition.schedule_generated {
        return Err(CompetitionError::ScheduleAlreadyGenerated);
    }

    let ids: Vec<CompetitorId> = competition
        .ordering
        .iter()
        .filter_map(Slot::entrant)
        .collect();
    let count = group_count(competition.competitors.len());
    let mut buckets: Vec<Vec<CompetitorId>> = vec![Vec::new(); count];
    for (index, id) in ids.iter().enumerate() {
        buckets[index % count].push(*id);
    }

    let mut rounds_per_group = 0u32;
    for (index, bucket) in buckets.into_iter().enumerate() {
        let mut slots: Vec<Slot> = bucket.iter().copied().map(Slot::Entrant).collect();
        if slots.len() % 2 != 0 {
            slots.push(Slot::Bye);
        }

        let mut group = Competition::new(
            format!("Group {}", index + 1),
            Format::League(legs),
        )?;
        group.parent = Some(competition.id);
        group.registration = Registration::Closed;
        group.ordering = slots;
        league::generate_schedule(&mut group, legs)?;
        rounds_per_group = rounds_per_group.max(group.total_rounds);

        for id in &bucket {
            if let Some(entry) = competition.competitors.iter_mut().find(|p| p.id == *id) {
                entry.group = Some(group.id);
            }
        }
        competition.groups.push(group);
    }

    competition.schedule_generated = true;
    competition.total_rounds = rounds_per_group;
    log::debug!(
        "generated {} groups of up to {} matchdays for '{}'",
        count,
        rounds_per_group,
        competition.name
    );
    Ok(Generated::Groups {
        groups: count,
        rounds_per_group,
    })
}

/// Generate the next knockout-phase round. The first call requires every
/// group fixture to be finished; it seeds the parent's promotion pool with
/// each group's top two before delegating to the bracket engine.
pub fn generate_knockout_round(
    competition: &mut Competition,
    rng: &mut dyn RngCore,
) -> Result<Generated, CompetitionError> {
    if !competition.knockout_seeded {
        seed_knockout(competition)?;
    }
    knockout::generate_round(competition, rng)
}

fn seed_knockout(competition: &mut Competition) -> Result<(), CompetitionError> {
    if !competition.group_fixtures_finished() {
        return Err(CompetitionError::GroupsUnfinished);
    }
    let mut promoted = Vec::new();
    for group in &competition.groups {
        let table = crate::logic::ledger::group_standings(competition, group.id);
        promoted.extend(table.iter().take(PROMOTED_PER_GROUP).map(|p| p.id));
    }
    competition.promoted = promoted;
    competition.knockout_seeded = true;
    log::debug!(
        "seeded knockout phase with {} competitors for '{}'",
        competition.promoted.len(),
        competition.name
    );
    Ok(())
}
