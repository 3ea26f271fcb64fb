//! Integration tests for the round-robin engine: schedule completeness,
//! byes, orientation parity and the double-leg mirror.

use cup_engine_web::{
    close_registration, generate, CloseOutcome, Competition, CompetitionError, CompetitorId,
    Format, Legs, Slot,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};

fn league(n: usize, legs: Legs) -> (Competition, StdRng) {
    let mut c = Competition::new("Test league", Format::League(legs)).unwrap();
    for i in 0..n {
        c.add_competitor(format!("P{i}"), None).unwrap();
    }
    let mut rng = StdRng::seed_from_u64(21);
    close_registration(&mut c, &mut rng).unwrap();
    (c, rng)
}

fn unordered(a: CompetitorId, b: CompetitorId) -> (CompetitorId, CompetitorId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[test]
fn close_registration_requires_four_competitors() {
    let mut c = Competition::new("Tiny", Format::League(Legs::Single)).unwrap();
    for i in 0..3 {
        c.add_competitor(format!("P{i}"), None).unwrap();
    }
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(
        close_registration(&mut c, &mut rng),
        Err(CompetitionError::NotEnoughCompetitors { required: 4 })
    );
    // Registration stays open so the roster can still be fixed.
    assert!(c.add_competitor("P3", None).is_ok());
    assert!(matches!(
        close_registration(&mut c, &mut rng),
        Ok(CloseOutcome::Ordering { .. })
    ));
}

#[test]
fn even_roster_single_leg_is_complete() {
    let (mut c, mut rng) = league(6, Legs::Single);
    assert_eq!(c.ordering.len(), 6); // even roster: no bye slot
    generate(&mut c, &mut rng).unwrap();

    assert_eq!(c.rounds.len(), 5);
    assert_eq!(c.total_rounds, 5);
    assert_eq!(c.fixtures.len(), 15);

    // Each competitor plays exactly once per matchday.
    for round in &c.rounds {
        assert_eq!(round.pausing, None);
        let mut seen = HashSet::new();
        for fixture in c.fixtures.iter().filter(|f| f.round == round.id) {
            assert!(seen.insert(fixture.competitor1));
            assert!(seen.insert(fixture.competitor2));
        }
        assert_eq!(seen.len(), 6);
    }

    // Every unordered pair meets exactly once.
    let mut pairs = HashSet::new();
    for fixture in &c.fixtures {
        assert!(pairs.insert(unordered(fixture.competitor1, fixture.competitor2)));
    }
    assert_eq!(pairs.len(), 15);
}

#[test]
fn odd_roster_is_padded_and_byes_rotate() {
    let (mut c, mut rng) = league(5, Legs::Single);
    assert_eq!(c.ordering.len(), 6);
    assert_eq!(c.ordering.iter().filter(|s| s.is_bye()).count(), 1);
    // The bye slot is appended after the shuffle, so it sits at the end.
    assert!(c.ordering.last().map(Slot::is_bye).unwrap_or(false));

    generate(&mut c, &mut rng).unwrap();
    assert_eq!(c.rounds.len(), 5);
    assert_eq!(c.fixtures.len(), 10);

    let mut byes: HashMap<CompetitorId, u32> = HashMap::new();
    for round in &c.rounds {
        let pausing = round.pausing.expect("every matchday has a bye");
        *byes.entry(pausing).or_insert(0) += 1;
        // Two fixtures per matchday, pausing competitor in neither.
        let playing: Vec<_> = c
            .fixtures
            .iter()
            .filter(|f| f.round == round.id)
            .collect();
        assert_eq!(playing.len(), 2);
        for fixture in playing {
            assert_ne!(fixture.competitor1, pausing);
            assert_ne!(fixture.competitor2, pausing);
        }
    }
    // Over the 5 matchdays, every competitor pauses exactly once.
    assert_eq!(byes.len(), 5);
    assert!(byes.values().all(|&count| count == 1));
}

#[test]
fn orientation_alternates_with_matchday_parity() {
    let (mut c, mut rng) = league(4, Legs::Single);
    let slots: Vec<CompetitorId> = c.ordering.iter().filter_map(Slot::entrant).collect();
    generate(&mut c, &mut rng).unwrap();

    // Matchday 1 (odd): the first-vs-last pairing is reversed, so the last
    // slot hosts the first.
    let first_round = &c.rounds[0];
    assert_eq!(first_round.number, 1);
    let opener = c
        .fixtures
        .iter()
        .find(|f| f.round == first_round.id)
        .unwrap();
    assert_eq!(opener.competitor1, slots[3]);
    assert_eq!(opener.competitor2, slots[0]);
}

#[test]
fn double_leg_mirrors_every_fixture() {
    let (mut c, mut rng) = league(4, Legs::Double);
    generate(&mut c, &mut rng).unwrap();

    assert_eq!(c.rounds.len(), 6);
    assert_eq!(c.total_rounds, 6);
    assert_eq!(c.fixtures.len(), 12);

    let numbers: HashSet<u32> = c.rounds.iter().map(|r| r.number).collect();
    assert_eq!(numbers, (1..=6).collect());
    for round in &c.rounds {
        // Second-leg matchdays sit at n + 3 and carry leg 2.
        assert_eq!(round.leg, if round.number <= 3 { 1 } else { 2 });
    }

    // Each ordered pair occurs exactly once: the return fixture swaps hosts.
    let mut oriented = HashSet::new();
    for fixture in &c.fixtures {
        assert!(oriented.insert((fixture.competitor1, fixture.competitor2)));
    }
    for fixture in &c.fixtures {
        assert!(oriented.contains(&(fixture.competitor2, fixture.competitor1)));
    }
}

#[test]
fn schedule_cannot_be_generated_twice() {
    let (mut c, mut rng) = league(4, Legs::Single);
    generate(&mut c, &mut rng).unwrap();
    assert_eq!(
        generate(&mut c, &mut rng),
        Err(CompetitionError::ScheduleAlreadyGenerated)
    );
}

#[test]
fn generation_requires_closed_registration() {
    let mut c = Competition::new("Open", Format::League(Legs::Single)).unwrap();
    for i in 0..4 {
        c.add_competitor(format!("P{i}"), None).unwrap();
    }
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(
        generate(&mut c, &mut rng),
        Err(CompetitionError::RegistrationOpen)
    );
}
