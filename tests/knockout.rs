//! Integration tests for the bracket engine: round naming, play-in math,
//! promotion flow and finishing.

use cup_engine_web::{
    close_registration, delete_result, engine, enter_result, generate, play_in_matches,
    CloseOutcome, Competition, CompetitionError, Format, Generated, Standing,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn knockout(n: usize) -> (Competition, StdRng) {
    let mut c = Competition::new("Test cup", Format::Knockout).unwrap();
    for i in 0..n {
        c.add_competitor(format!("P{i}"), None).unwrap();
    }
    (c, StdRng::seed_from_u64(11))
}

/// Enter a 1-0 result for every unfinished fixture of the current round.
fn finish_current_round(c: &mut Competition) {
    let pending: Vec<_> = c
        .fixtures
        .iter()
        .filter(|f| Some(f.round) == c.current_round && !f.finished)
        .map(|f| f.id)
        .collect();
    for fixture in pending {
        enter_result(c, fixture, 1, 0).unwrap();
    }
}

#[test]
fn four_competitors_run_semi_then_final() {
    let (mut c, mut rng) = knockout(4);
    let outcome = close_registration(&mut c, &mut rng).unwrap();
    assert_eq!(
        outcome,
        CloseOutcome::Bracket {
            rounds: 2,
            play_in_matches: 0
        }
    );

    match generate(&mut c, &mut rng).unwrap() {
        Generated::Round { name, fixtures, .. } => {
            assert_eq!(name, "Semi-final");
            assert_eq!(fixtures, 2);
        }
        other => panic!("expected a round, got {other:?}"),
    }
    assert_eq!(c.rounds.len(), 1);
    assert_eq!(c.current_round, Some(c.rounds[0].id));

    // Generation is refused while results are pending, with no state change.
    assert_eq!(
        generate(&mut c, &mut rng),
        Err(CompetitionError::FixturesUnfinished)
    );
    assert_eq!(c.rounds.len(), 1);

    finish_current_round(&mut c);
    assert_eq!(c.rounds[0].promotion.len(), 2);

    match generate(&mut c, &mut rng).unwrap() {
        Generated::Round { name, fixtures, .. } => {
            assert_eq!(name, "Final");
            assert_eq!(fixtures, 1);
        }
        other => panic!("expected a round, got {other:?}"),
    }

    assert!(!engine(c.format).is_complete(&c));
    finish_current_round(&mut c);
    assert!(c.finished);
    assert!(engine(c.format).is_complete(&c));
    assert_eq!(
        generate(&mut c, &mut rng),
        Err(CompetitionError::CompetitionFinished)
    );
}

#[test]
fn draws_are_rejected_in_a_bracket() {
    let (mut c, mut rng) = knockout(4);
    close_registration(&mut c, &mut rng).unwrap();
    generate(&mut c, &mut rng).unwrap();
    let fixture = c.fixtures[0].id;

    assert_eq!(
        enter_result(&mut c, fixture, 2, 2),
        Err(CompetitionError::DrawNotAllowed)
    );
    let entry = c.fixture(fixture).unwrap();
    assert_eq!(entry.result(), None);
    assert!(!entry.finished);
    assert!(c.competitors.iter().all(|p| p.standing == Standing::default()));
}

#[test]
fn five_competitors_get_one_play_in_match() {
    let (mut c, mut rng) = knockout(5);
    let outcome = close_registration(&mut c, &mut rng).unwrap();
    assert_eq!(
        outcome,
        CloseOutcome::Bracket {
            rounds: 2,
            play_in_matches: 1
        }
    );

    match generate(&mut c, &mut rng).unwrap() {
        Generated::Round { name, fixtures, .. } => {
            assert_eq!(name, "Play-in");
            assert_eq!(fixtures, 1);
        }
        other => panic!("expected a round, got {other:?}"),
    }
    // Three of the five advance without playing.
    assert_eq!(c.rounds[0].promotion.len(), 3);
    assert!(c.play_in_generated);

    finish_current_round(&mut c);
    assert_eq!(c.rounds[0].promotion.len(), 4);

    match generate(&mut c, &mut rng).unwrap() {
        Generated::Round { name, fixtures, .. } => {
            assert_eq!(name, "Semi-final");
            assert_eq!(fixtures, 2);
        }
        other => panic!("expected a round, got {other:?}"),
    }
}

#[test]
fn play_in_table_is_the_distance_to_the_lower_power_of_two() {
    let cases = [
        (4, 0),
        (5, 1),
        (7, 3),
        (8, 0),
        (9, 1),
        (15, 7),
        (16, 0),
        (17, 1),
        (31, 15),
        (32, 0),
        (33, 1),
        (63, 31),
        (64, 0),
        (65, 1),
        (119, 55),
        (120, 0),
        (128, 0),
    ];
    for (size, expected) in cases {
        assert_eq!(play_in_matches(size), expected, "roster size {size}");
    }
}

#[test]
fn eleven_competitors_play_down_to_eight() {
    let (mut c, mut rng) = knockout(11);
    close_registration(&mut c, &mut rng).unwrap();
    assert_eq!(c.play_in_matches, 3);

    generate(&mut c, &mut rng).unwrap();
    assert_eq!(c.rounds[0].promotion.len(), 5); // 11 - 2*3 advance untouched
    finish_current_round(&mut c);
    assert_eq!(c.rounds[0].promotion.len(), 8);

    match generate(&mut c, &mut rng).unwrap() {
        Generated::Round { name, fixtures, .. } => {
            assert_eq!(name, "Quarter-final");
            assert_eq!(fixtures, 4);
        }
        other => panic!("expected a round, got {other:?}"),
    }
}

#[test]
fn eight_competitor_bracket_has_three_rounds() {
    let (mut c, mut rng) = knockout(8);
    close_registration(&mut c, &mut rng).unwrap();

    let mut names = Vec::new();
    loop {
        match generate(&mut c, &mut rng) {
            Ok(Generated::Round { name, .. }) => names.push(name),
            Ok(other) => panic!("expected a round, got {other:?}"),
            Err(CompetitionError::CompetitionFinished) => break,
            Err(other) => panic!("unexpected error {other:?}"),
        }
        finish_current_round(&mut c);
    }
    assert_eq!(names, vec!["Quarter-final", "Semi-final", "Final"]);
    assert!(c.finished);

    // Each round halves the field: 4, 2, 1 fixtures.
    let per_round: Vec<usize> = c
        .rounds
        .iter()
        .map(|r| c.fixtures.iter().filter(|f| f.round == r.id).count())
        .collect();
    assert_eq!(per_round, vec![4, 2, 1]);
}

#[test]
fn results_outside_the_current_round_are_locked() {
    let (mut c, mut rng) = knockout(4);
    close_registration(&mut c, &mut rng).unwrap();
    generate(&mut c, &mut rng).unwrap();
    let semi_fixture = c.fixtures[0].id;
    finish_current_round(&mut c);
    generate(&mut c, &mut rng).unwrap();

    // The semi-final is history once the final exists.
    assert_eq!(
        delete_result(&mut c, semi_fixture),
        Err(CompetitionError::OutsideCurrentRound)
    );
}

#[test]
fn deleting_the_final_result_reopens_the_competition() {
    let (mut c, mut rng) = knockout(4);
    close_registration(&mut c, &mut rng).unwrap();
    generate(&mut c, &mut rng).unwrap();
    finish_current_round(&mut c);
    generate(&mut c, &mut rng).unwrap();

    let final_fixture = c
        .fixtures
        .iter()
        .find(|f| Some(f.round) == c.current_round)
        .unwrap()
        .clone();
    enter_result(&mut c, final_fixture.id, 3, 1).unwrap();
    assert!(c.finished);
    let final_round = c.round(final_fixture.round).unwrap();
    assert_eq!(final_round.promotion, vec![final_fixture.competitor1]);
    assert_eq!(
        c.competitor(final_fixture.competitor2).unwrap().standing.losses,
        1
    );

    delete_result(&mut c, final_fixture.id).unwrap();
    assert!(!c.finished);
    assert!(c.round(final_fixture.round).unwrap().promotion.is_empty());
    // Both finalists are back to their pre-final statistics: one win from the semi.
    for id in [final_fixture.competitor1, final_fixture.competitor2] {
        let standing = c.competitor(id).unwrap().standing;
        assert_eq!(standing.wins, 1);
        assert_eq!(standing.losses, 0);
    }
}
