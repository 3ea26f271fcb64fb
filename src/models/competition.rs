//! Competition aggregate, format variants and CompetitionError.

use crate::models::competitor::{Competitor, CompetitorId};
use crate::models::fixture::{Fixture, FixtureId};
use crate::models::round::{Round, RoundId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a competition.
pub type CompetitionId = Uuid;

/// Roster cap; brackets and the play-in table are defined up to this size.
pub const MAX_COMPETITORS: usize = 128;
/// Maximum competitor name length.
pub const MAX_COMPETITOR_NAME: usize = 30;
/// Maximum competition name length.
pub const MAX_COMPETITION_NAME: usize = 50;

/// Broad class of a [`CompetitionError`], used by callers to decide how to
/// surface it (bad request vs. internal inconsistency).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Malformed input; nothing was mutated.
    Validation,
    /// Operation invoked in the wrong state; nothing was mutated.
    Precondition,
    /// Roster size outside the format's bounds.
    Capacity,
    /// Caller bug that would corrupt standings if ignored.
    Consistency,
}

/// Errors that can occur during competition operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompetitionError {
    /// Competitor or competition name is empty.
    EmptyName,
    /// Competitor or competition name exceeds the length cap.
    NameTooLong { max: usize },
    /// Equal scores entered for a fixture in a stage that forbids draws.
    DrawNotAllowed,
    /// Registration is still open.
    RegistrationOpen,
    /// Registration has already been closed.
    RegistrationClosed,
    /// Not every fixture of the current stage has a result yet.
    FixturesUnfinished,
    /// The league schedule has already been generated.
    ScheduleAlreadyGenerated,
    /// The fixture does not belong to the currently active round/stage.
    OutsideCurrentRound,
    /// The fixture already has a result entered.
    ResultAlreadyEntered,
    /// The fixture has no result to confirm, reject or retract.
    ResultNotEntered,
    /// The result has already been confirmed.
    ResultAlreadyConfirmed,
    /// The result is reported but not confirmed, so the ledger holds nothing
    /// to retract.
    ResultNotConfirmed,
    /// Not every group fixture is finished yet.
    GroupsUnfinished,
    /// The competition is finished; no further rounds can be generated.
    CompetitionFinished,
    /// The competition is not finished yet (archiving).
    CompetitionNotFinished,
    /// Roster below the format minimum at registration close.
    NotEnoughCompetitors { required: usize },
    /// Roster at the cap.
    TooManyCompetitors,
    /// No fixture with this id in the competition or its groups.
    FixtureNotFound(FixtureId),
    /// No competitor with this id.
    CompetitorNotFound(CompetitorId),
    /// No round with this id.
    RoundNotFound(RoundId),
    /// Reversing a result would drive a statistic below zero.
    StandingUnderflow,
    /// Reversing a result found no matching promotion-set entry.
    PromotionMissing(CompetitorId),
}

impl CompetitionError {
    pub fn kind(&self) -> ErrorKind {
        use CompetitionError::*;
        match self {
            EmptyName | NameTooLong { .. } | DrawNotAllowed | FixtureNotFound(_)
            | CompetitorNotFound(_) | RoundNotFound(_) => ErrorKind::Validation,
            RegistrationOpen | RegistrationClosed | FixturesUnfinished
            | ScheduleAlreadyGenerated | OutsideCurrentRound | ResultAlreadyEntered
            | ResultNotEntered | ResultAlreadyConfirmed | ResultNotConfirmed
            | GroupsUnfinished | CompetitionFinished | CompetitionNotFinished => {
                ErrorKind::Precondition
            }
            NotEnoughCompetitors { .. } | TooManyCompetitors => ErrorKind::Capacity,
            StandingUnderflow | PromotionMissing(_) => ErrorKind::Consistency,
        }
    }
}

impl std::fmt::Display for CompetitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitionError::EmptyName => write!(f, "Name must not be empty"),
            CompetitionError::NameTooLong { max } => {
                write!(f, "Name must be at most {} characters", max)
            }
            CompetitionError::DrawNotAllowed => write!(f, "A knockout fixture cannot end in a draw"),
            CompetitionError::RegistrationOpen => write!(f, "Registration is still open"),
            CompetitionError::RegistrationClosed => write!(f, "Registration is already closed"),
            CompetitionError::FixturesUnfinished => {
                write!(f, "Not all fixtures have a result; enter every result first")
            }
            CompetitionError::ScheduleAlreadyGenerated => {
                write!(f, "The schedule has already been generated")
            }
            CompetitionError::OutsideCurrentRound => {
                write!(f, "The fixture is not part of the currently active stage")
            }
            CompetitionError::ResultAlreadyEntered => {
                write!(f, "The fixture already has a result; retract it first")
            }
            CompetitionError::ResultNotEntered => write!(f, "The fixture has no result"),
            CompetitionError::ResultAlreadyConfirmed => {
                write!(f, "The result has already been confirmed")
            }
            CompetitionError::ResultNotConfirmed => {
                write!(f, "The result has not been confirmed; reject it instead")
            }
            CompetitionError::GroupsUnfinished => {
                write!(f, "Not all group fixtures are finished")
            }
            CompetitionError::CompetitionFinished => write!(f, "The competition is finished"),
            CompetitionError::CompetitionNotFinished => {
                write!(f, "The competition is not finished yet")
            }
            CompetitionError::NotEnoughCompetitors { required } => {
                write!(f, "Need at least {} registered competitors", required)
            }
            CompetitionError::TooManyCompetitors => {
                write!(f, "Roster is full ({} competitors)", MAX_COMPETITORS)
            }
            CompetitionError::FixtureNotFound(_) => write!(f, "Fixture not found"),
            CompetitionError::CompetitorNotFound(_) => write!(f, "Competitor not found"),
            CompetitionError::RoundNotFound(_) => write!(f, "Round not found"),
            CompetitionError::StandingUnderflow => {
                write!(f, "Retracting this result would corrupt the standings")
            }
            CompetitionError::PromotionMissing(_) => {
                write!(f, "No matching promotion entry for this result")
            }
        }
    }
}

/// Number of legs in a league (round-robin) stage.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Legs {
    Single,
    Double,
}

/// Competition format.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Single-elimination bracket, play-in round when needed.
    Knockout,
    /// Round-robin league, one or two legs.
    League(Legs),
    /// Balanced round-robin groups, then a bracket seeded from the top two of each.
    GroupsThenKnockout(Legs),
}

impl Format {
    /// Minimum roster size required to close registration.
    pub fn min_competitors(&self) -> usize {
        match self {
            Format::Knockout | Format::League(_) => 4,
            Format::GroupsThenKnockout(_) => 8,
        }
    }

    /// Whether fixtures owned directly by the competition belong to a bracket
    /// (draws forbidden, winners promoted).
    pub fn knockout_bearing(&self) -> bool {
        matches!(self, Format::Knockout | Format::GroupsThenKnockout(_))
    }
}

/// Registration state of a competition.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Registration {
    #[default]
    Open,
    Closed,
}

/// One element of the persisted ordering: a competitor, or the bye marker
/// injected when the roster count is odd.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Entrant(CompetitorId),
    Bye,
}

impl Slot {
    pub fn entrant(&self) -> Option<CompetitorId> {
        match self {
            Slot::Entrant(id) => Some(*id),
            Slot::Bye => None,
        }
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, Slot::Bye)
    }
}

/// One tournament instance: roster, persisted ordering, rounds, fixtures and,
/// for group formats, the embedded child competitions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub name: String,
    pub format: Format,
    pub registration: Registration,
    /// Registered competitors. For a group-stage child this stays empty;
    /// statistics live on the parent's entries.
    pub competitors: Vec<Competitor>,
    /// One-time-shuffled ordering driving all round-robin pairings.
    /// Immutable once generated.
    pub ordering: Vec<Slot>,
    pub rounds: Vec<Round>,
    pub fixtures: Vec<Fixture>,
    /// Child round-robin competitions (group formats only).
    pub groups: Vec<Competition>,
    /// Back-reference to the parent competition (set on group children).
    pub parent: Option<CompetitionId>,
    /// Competitors seeded into the knockout phase from the group stage.
    pub promoted: Vec<CompetitorId>,
    /// The round currently accepting results (bracket stages only).
    pub current_round: Option<RoundId>,
    /// Number of play-in fixtures needed to cut the roster to a power of two.
    pub play_in_matches: u32,
    pub play_in_generated: bool,
    pub schedule_generated: bool,
    pub knockout_seeded: bool,
    pub finished: bool,
    pub archived: bool,
    /// Rounds generated (league) or projected bracket depth (knockout).
    pub total_rounds: u32,
    pub created_at: DateTime<Utc>,
}

impl Competition {
    /// Create a new competition with an open registration and no competitors.
    /// The name is trimmed and length-checked.
    pub fn new(name: impl Into<String>, format: Format) -> Result<Self, CompetitionError> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(CompetitionError::EmptyName);
        }
        if name.chars().count() > MAX_COMPETITION_NAME {
            return Err(CompetitionError::NameTooLong {
                max: MAX_COMPETITION_NAME,
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            format,
            registration: Registration::Open,
            competitors: Vec::new(),
            ordering: Vec::new(),
            rounds: Vec::new(),
            fixtures: Vec::new(),
            groups: Vec::new(),
            parent: None,
            promoted: Vec::new(),
            current_round: None,
            play_in_matches: 0,
            play_in_generated: false,
            schedule_generated: false,
            knockout_seeded: false,
            finished: false,
            archived: false,
            total_rounds: 0,
            created_at: Utc::now(),
        })
    }

    /// Register a competitor (registration must be open). Returns the new id.
    pub fn add_competitor(
        &mut self,
        name: impl Into<String>,
        team: Option<String>,
    ) -> Result<CompetitorId, CompetitionError> {
        if self.registration != Registration::Open {
            return Err(CompetitionError::RegistrationClosed);
        }
        if self.competitors.len() >= MAX_COMPETITORS {
            return Err(CompetitionError::TooManyCompetitors);
        }
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(CompetitionError::EmptyName);
        }
        if name.chars().count() > MAX_COMPETITOR_NAME {
            return Err(CompetitionError::NameTooLong {
                max: MAX_COMPETITOR_NAME,
            });
        }
        let mut competitor = Competitor::new(name);
        competitor.team = team;
        let id = competitor.id;
        self.competitors.push(competitor);
        Ok(id)
    }

    /// Remove a competitor by id (registration must be open).
    pub fn remove_competitor(&mut self, id: CompetitorId) -> Result<(), CompetitionError> {
        if self.registration != Registration::Open {
            return Err(CompetitionError::RegistrationClosed);
        }
        let idx = self
            .competitors
            .iter()
            .position(|p| p.id == id)
            .ok_or(CompetitionError::CompetitorNotFound(id))?;
        self.competitors.remove(idx);
        Ok(())
    }

    /// Mark a finished competition as archived.
    pub fn archive(&mut self) -> Result<(), CompetitionError> {
        if !self.finished {
            return Err(CompetitionError::CompetitionNotFinished);
        }
        self.archived = true;
        Ok(())
    }

    pub fn competitor(&self, id: CompetitorId) -> Option<&Competitor> {
        self.competitors.iter().find(|p| p.id == id)
    }

    pub fn round(&self, id: RoundId) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == id)
    }

    pub fn fixture(&self, id: FixtureId) -> Option<&Fixture> {
        self.fixtures.iter().find(|m| m.id == id)
    }

    /// The round currently accepting results, if any.
    pub fn active_round(&self) -> Option<&Round> {
        self.current_round.and_then(|id| self.round(id))
    }

    /// True once any stage has been generated.
    pub fn stage_started(&self) -> bool {
        self.schedule_generated || !self.rounds.is_empty()
    }

    /// Every fixture owned directly by this competition has a result entered.
    pub fn all_fixtures_finished(&self) -> bool {
        self.fixtures.iter().all(|m| m.finished)
    }

    /// Every fixture owned directly by this competition has a confirmed result.
    pub fn all_fixtures_confirmed(&self) -> bool {
        self.fixtures.iter().all(|m| m.confirmed)
    }

    /// Every fixture of every group child has a result entered.
    pub fn group_fixtures_finished(&self) -> bool {
        self.groups.iter().all(|g| g.all_fixtures_finished())
    }
}
