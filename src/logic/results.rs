//! Result entry, confirmation, rejection and retraction.

use crate::logic::knockout::FINAL_ROUND;
use crate::logic::ledger::{self, Direction};
use crate::models::{Competition, CompetitionError, Fixture, FixtureId, Format};

/// Where a fixture lives inside the aggregate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Site {
    /// Index into the competition's own fixtures (bracket or league).
    Main(usize),
    /// Indexes into a group child and its fixtures.
    Group { group: usize, fixture: usize },
}

fn locate(competition: &Competition, id: FixtureId) -> Result<Site, CompetitionError> {
    if let Some(index) = competition.fixtures.iter().position(|m| m.id == id) {
        return Ok(Site::Main(index));
    }
    for (g, group) in competition.groups.iter().enumerate() {
        if let Some(index) = group.fixtures.iter().position(|m| m.id == id) {
            return Ok(Site::Group { group: g, fixture: index });
        }
    }
    Err(CompetitionError::FixtureNotFound(id))
}

fn site_fixture<'a>(competition: &'a Competition, site: Site) -> &'a Fixture {
    match site {
        Site::Main(index) => &competition.fixtures[index],
        Site::Group { group, fixture } => &competition.groups[group].fixtures[fixture],
    }
}

/// Check that the fixture may receive or lose a result right now.
///
/// Bracket fixtures (knockout, and the knockout phase of group formats) are
/// editable only while their round is the current one; league fixtures any
/// time; group fixtures until the knockout phase has been seeded.
fn gate(competition: &Competition, site: Site) -> Result<(), CompetitionError> {
    match site {
        Site::Main(index) => match competition.format {
            Format::League(_) => Ok(()),
            Format::Knockout | Format::GroupsThenKnockout(_) => {
                let fixture = &competition.fixtures[index];
                if competition.current_round == Some(fixture.round) {
                    Ok(())
                } else {
                    Err(CompetitionError::OutsideCurrentRound)
                }
            }
        },
        Site::Group { .. } => {
            if competition.knockout_seeded {
                Err(CompetitionError::OutsideCurrentRound)
            } else {
                Ok(())
            }
        }
    }
}

/// Draws are forbidden for fixtures owned directly by a knockout-bearing
/// competition (bracket fixtures); group and league fixtures may draw.
fn check_draw(
    competition: &Competition,
    site: Site,
    score1: u32,
    score2: u32,
) -> Result<(), CompetitionError> {
    let bracket = matches!(site, Site::Main(_)) && competition.format.knockout_bearing();
    if bracket && score1 == score2 {
        return Err(CompetitionError::DrawNotAllowed);
    }
    Ok(())
}

/// Apply or reverse the ledger for a fixture at a known site. Bracket
/// fixtures also update their round's promotion set.
fn settle_at(
    competition: &mut Competition,
    site: Site,
    score1: u32,
    score2: u32,
    direction: Direction,
) -> Result<(), CompetitionError> {
    match site {
        Site::Main(index) => {
            let fixture = &competition.fixtures[index];
            let (first, second, round_id) =
                (fixture.competitor1, fixture.competitor2, fixture.round);
            if competition.format.knockout_bearing() {
                let round_index = competition
                    .rounds
                    .iter()
                    .position(|r| r.id == round_id)
                    .ok_or(CompetitionError::RoundNotFound(round_id))?;
                ledger::settle(
                    &mut competition.competitors,
                    Some(&mut competition.rounds[round_index].promotion),
                    first,
                    second,
                    score1,
                    score2,
                    direction,
                )
            } else {
                ledger::settle(
                    &mut competition.competitors,
                    None,
                    first,
                    second,
                    score1,
                    score2,
                    direction,
                )
            }
        }
        Site::Group { group, fixture } => {
            let fixture = &competition.groups[group].fixtures[fixture];
            let (first, second) = (fixture.competitor1, fixture.competitor2);
            // Group statistics live on the parent's roster entries.
            ledger::settle(
                &mut competition.competitors,
                None,
                first,
                second,
                score1,
                score2,
                direction,
            )
        }
    }
}

fn fixture_mut(competition: &mut Competition, site: Site) -> &mut Fixture {
    match site {
        Site::Main(index) => &mut competition.fixtures[index],
        Site::Group { group, fixture } => &mut competition.groups[group].fixtures[fixture],
    }
}

/// True when the fixture is the bracket final of this competition.
fn is_final(competition: &Competition, site: Site) -> bool {
    match site {
        Site::Main(index) => {
            let fixture = &competition.fixtures[index];
            competition.format.knockout_bearing()
                && competition
                    .round(fixture.round)
                    .map(|r| r.name == FINAL_ROUND)
                    .unwrap_or(false)
        }
        Site::Group { .. } => false,
    }
}

/// Organizer entry: validate, stamp the scores, apply the ledger and run the
/// promotion/finish logic in one step.
pub fn enter_result(
    competition: &mut Competition,
    fixture: FixtureId,
    score1: u32,
    score2: u32,
) -> Result<(), CompetitionError> {
    let site = locate(competition, fixture)?;
    if site_fixture(competition, site).finished {
        return Err(CompetitionError::ResultAlreadyEntered);
    }
    gate(competition, site)?;
    check_draw(competition, site, score1, score2)?;

    settle_at(competition, site, score1, score2, Direction::Apply)?;
    let decided_final = is_final(competition, site);
    let entry = fixture_mut(competition, site);
    entry.score1 = Some(score1);
    entry.score2 = Some(score2);
    entry.finished = true;
    entry.confirmed = true;
    if decided_final {
        competition.finished = true;
    }
    Ok(())
}

/// Participant report: stamp the scores and mark the fixture finished. The
/// ledger is not touched until the opponent or organizer confirms.
pub fn report_result(
    competition: &mut Competition,
    fixture: FixtureId,
    score1: u32,
    score2: u32,
) -> Result<(), CompetitionError> {
    let site = locate(competition, fixture)?;
    if site_fixture(competition, site).finished {
        return Err(CompetitionError::ResultAlreadyEntered);
    }
    gate(competition, site)?;
    check_draw(competition, site, score1, score2)?;

    let entry = fixture_mut(competition, site);
    entry.score1 = Some(score1);
    entry.score2 = Some(score2);
    entry.finished = true;
    Ok(())
}

/// Accept a reported result: apply the ledger and mark the fixture confirmed.
pub fn confirm_result(
    competition: &mut Competition,
    fixture: FixtureId,
) -> Result<(), CompetitionError> {
    let site = locate(competition, fixture)?;
    let entry = site_fixture(competition, site);
    if !entry.finished {
        return Err(CompetitionError::ResultNotEntered);
    }
    if entry.confirmed {
        return Err(CompetitionError::ResultAlreadyConfirmed);
    }
    let (score1, score2) = entry
        .result()
        .ok_or(CompetitionError::ResultNotEntered)?;
    gate(competition, site)?;

    settle_at(competition, site, score1, score2, Direction::Apply)?;
    let decided_final = is_final(competition, site);
    fixture_mut(competition, site).confirmed = true;
    if decided_final {
        competition.finished = true;
    }
    Ok(())
}

/// Throw out a reported result that has not been confirmed yet.
pub fn reject_result(
    competition: &mut Competition,
    fixture: FixtureId,
) -> Result<(), CompetitionError> {
    let site = locate(competition, fixture)?;
    let entry = site_fixture(competition, site);
    if !entry.finished {
        return Err(CompetitionError::ResultNotEntered);
    }
    if entry.confirmed {
        return Err(CompetitionError::ResultAlreadyConfirmed);
    }
    fixture_mut(competition, site).reset();
    Ok(())
}

/// Retract a confirmed result: reverse the ledger exactly and reset the
/// fixture to unfinished. The inverse of [`enter_result`]/[`confirm_result`].
pub fn delete_result(
    competition: &mut Competition,
    fixture: FixtureId,
) -> Result<(), CompetitionError> {
    let site = locate(competition, fixture)?;
    let entry = site_fixture(competition, site);
    if !entry.finished {
        return Err(CompetitionError::ResultNotEntered);
    }
    if !entry.confirmed {
        // Reported but never applied to the ledger; reject it instead.
        return Err(CompetitionError::ResultNotConfirmed);
    }
    let (score1, score2) = entry
        .result()
        .ok_or(CompetitionError::ResultNotEntered)?;
    gate(competition, site)?;

    settle_at(competition, site, score1, score2, Direction::Reverse)?;
    let decided_final = is_final(competition, site);
    fixture_mut(competition, site).reset();
    if decided_final {
        competition.finished = false;
    }
    Ok(())
}
