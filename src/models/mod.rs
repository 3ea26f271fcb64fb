//! Data structures for the cup engine: competitors, fixtures, rounds, competitions.

mod competition;
mod competitor;
mod fixture;
mod round;

pub use competition::{
    Competition, CompetitionError, CompetitionId, ErrorKind, Format, Legs, Registration, Slot,
    MAX_COMPETITION_NAME, MAX_COMPETITORS, MAX_COMPETITOR_NAME,
};
pub use competitor::{Competitor, CompetitorId, Standing};
pub use fixture::{Fixture, FixtureId};
pub use round::{Round, RoundId};
