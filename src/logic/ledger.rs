//! Standings ledger: reversible statistics updates and the standings sort.

use crate::models::{Competition, CompetitionError, CompetitionId, Competitor, CompetitorId, Standing};

/// Whether a result is being applied or retracted. Retraction is the exact
/// arithmetic inverse of application; the two share one code path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Apply,
    Reverse,
}

/// Post a result against both competitors' standings and, for bracket
/// fixtures, the active round's promotion set.
///
/// All statistics are computed before anything is written, so a failing call
/// leaves every competitor untouched. Retracting a result that was never
/// applied surfaces as [`CompetitionError::StandingUnderflow`] or
/// [`CompetitionError::PromotionMissing`] rather than corrupting the table.
pub fn settle(
    competitors: &mut [Competitor],
    promotion: Option<&mut Vec<CompetitorId>>,
    first: CompetitorId,
    second: CompetitorId,
    score1: u32,
    score2: u32,
    direction: Direction,
) -> Result<(), CompetitionError> {
    let i1 = competitors
        .iter()
        .position(|p| p.id == first)
        .ok_or(CompetitionError::CompetitorNotFound(first))?;
    let i2 = competitors
        .iter()
        .position(|p| p.id == second)
        .ok_or(CompetitionError::CompetitorNotFound(second))?;

    let shifted1 = shift(competitors[i1].standing, score1, score2, direction)?;
    let shifted2 = shift(competitors[i2].standing, score2, score1, direction)?;

    if let Some(promotion) = promotion {
        // Draws are rejected upstream for bracket fixtures, so one side won.
        let winner = if score1 > score2 { first } else { second };
        match direction {
            Direction::Apply => promotion.push(winner),
            Direction::Reverse => {
                let pos = promotion
                    .iter()
                    .position(|&p| p == winner)
                    .ok_or(CompetitionError::PromotionMissing(winner))?;
                promotion.remove(pos);
            }
        }
    }

    competitors[i1].standing = shifted1;
    competitors[i2].standing = shifted2;
    Ok(())
}

/// One competitor's standing shifted by one result, in either direction.
/// `goal_difference` is recomputed from the shifted totals, not incremented.
fn shift(
    standing: Standing,
    own: u32,
    opponent: u32,
    direction: Direction,
) -> Result<Standing, CompetitionError> {
    let mut s = standing;
    let (wins, draws, losses, points) = match own.cmp(&opponent) {
        std::cmp::Ordering::Greater => (1, 0, 0, 3),
        std::cmp::Ordering::Equal => (0, 1, 0, 1),
        std::cmp::Ordering::Less => (0, 0, 1, 0),
    };
    match direction {
        Direction::Apply => {
            s.wins += wins;
            s.draws += draws;
            s.losses += losses;
            s.points += points;
            s.goals_for += own;
            s.goals_against += opponent;
        }
        Direction::Reverse => {
            s.wins = checked(s.wins, wins)?;
            s.draws = checked(s.draws, draws)?;
            s.losses = checked(s.losses, losses)?;
            s.points -= points;
            if s.points < 0 {
                return Err(CompetitionError::StandingUnderflow);
            }
            s.goals_for = checked(s.goals_for, own)?;
            s.goals_against = checked(s.goals_against, opponent)?;
        }
    }
    s.goal_difference = s.goals_for as i32 - s.goals_against as i32;
    Ok(s)
}

fn checked(value: u32, delta: u32) -> Result<u32, CompetitionError> {
    value
        .checked_sub(delta)
        .ok_or(CompetitionError::StandingUnderflow)
}

/// Standings of the whole competition: points desc, goal difference desc,
/// goals scored desc. The sort is stable, so ties keep registration order.
pub fn standings(competition: &Competition) -> Vec<&Competitor> {
    ordered(competition.competitors.iter().collect())
}

/// Standings of a single group, filtered from the parent's roster.
pub fn group_standings(competition: &Competition, group: CompetitionId) -> Vec<&Competitor> {
    ordered(
        competition
            .competitors
            .iter()
            .filter(|p| p.group == Some(group))
            .collect(),
    )
}

fn ordered(mut rows: Vec<&Competitor>) -> Vec<&Competitor> {
    rows.sort_by(|a, b| {
        b.standing
            .points
            .cmp(&a.standing.points)
            .then(b.standing.goal_difference.cmp(&a.standing.goal_difference))
            .then(b.standing.goals_for.cmp(&a.standing.goals_for))
    });
    rows
}
