//! Cup engine: tournament scheduling and standings library behind a small web app.

pub mod logic;
pub mod models;

pub use logic::{
    close_registration, confirm_result, delete_result, engine, enter_result, generate,
    generate_groups, generate_knockout_round, generate_round, generate_schedule, group_standings,
    play_in_matches, reject_result, report_result, round_label, standings, CloseOutcome,
    Direction, FormatEngine, Generated, FINAL_ROUND,
};
pub use models::{
    Competition, CompetitionError, CompetitionId, Competitor, CompetitorId, ErrorKind, Fixture,
    FixtureId, Format, Legs, Registration, Round, RoundId, Slot, Standing,
};
