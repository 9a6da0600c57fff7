//! Integration tests for the lobby → engine flow using scripted validators.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use atlas_game::{
    FaultPolicy, GameConfig, GameEngine, GameError, Lobby, PlaceSet, TurnOrder, Validator,
    ValidatorError,
};
use atlas_protocol::{AnswerStatus, PlayerId, SessionKey, normalize};

// =========================================================================
// Mock validators
// =========================================================================

/// Fails every lookup until switched on, then defers to a place set.
struct Flaky {
    places: PlaceSet,
    healthy: AtomicBool,
    calls: AtomicUsize,
}

impl Flaky {
    fn new(places: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            places: places.iter().collect(),
            healthy: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }
}

impl Validator for Flaky {
    async fn is_valid(&self, normalized: &str) -> Result<bool, ValidatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.healthy.load(Ordering::SeqCst) {
            return Err(ValidatorError::Unavailable("connection refused".into()));
        }
        self.places.is_valid(normalized).await
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn roster(n: u64) -> TurnOrder {
    let mut lobby = Lobby::new(SessionKey(1), pid(1));
    for id in 1..=n {
        lobby.join(pid(id), format!("P{id}")).unwrap();
    }
    lobby.lock().unwrap()
}

fn places() -> Arc<PlaceSet> {
    Arc::new(
        [
            "Mumbai", "Islamabad", "Delhi", "Iceland", "Dublin", "Nairobi", "Oslo", "Lima",
            "Amsterdam", "Madrid", "Düsseldorf", "Finland",
        ]
        .into_iter()
        .collect(),
    )
}

fn engine(n: u64, max_strikes: u32) -> GameEngine<PlaceSet> {
    let config = GameConfig {
        max_strikes,
        ..GameConfig::default()
    };
    GameEngine::new(roster(n), &config, places())
}

fn cursor_is_on_active_player<V: Validator>(engine: &GameEngine<V>) -> bool {
    let state = engine.state();
    state.active_count() == 0 || !state.current_player().is_eliminated(state.max_strikes())
}

// =========================================================================
// Scenarios
// =========================================================================

#[tokio::test]
async fn test_chain_of_valid_answers() {
    let mut e = engine(2, 2);
    assert_eq!(e.submit_answer("Mumbai").await.next_letter, Some('i'));
    assert_eq!(e.submit_answer("Islamabad").await.next_letter, Some('d'));
    let third = e.submit_answer("delhi").await;
    assert_eq!(third.status, AnswerStatus::Valid);
    assert_eq!(third.player.id, pid(1));
    assert_eq!(e.state().used_words().len(), 3);
    assert!(e.state().is_used("delhi"));
}

#[tokio::test]
async fn test_duplicate_answer_is_a_strike() {
    let mut e = engine(3, 2);
    e.submit_answer("Lima").await; // P1, next 'a'
    e.submit_answer("Amsterdam").await; // P2, next 'm'
    e.submit_answer("Madrid").await; // P3, next 'd'
    e.submit_answer("Dublin").await; // P1, next 'n'
    e.submit_answer("Nairobi").await; // P2, next 'i'
    let before = e.state().used_words().len();

    let iceland = e.submit_answer("Iceland").await; // P3, next 'd'
    assert_eq!(iceland.status, AnswerStatus::Valid);
    let again = e.submit_answer("Dublin").await; // P1 repeats
    assert_eq!(again.status, AnswerStatus::AlreadyUsed);
    assert_eq!(again.reason(), "already used");
    assert_eq!(again.player.strikes(), 1);
    assert_eq!(again.next_letter, Some('d'));
    assert_eq!(e.state().used_words().len(), before + 1);
    assert_eq!(e.current_player().id, pid(2));
}

#[tokio::test]
async fn test_duplicate_detected_across_diacritics() {
    let mut e = engine(2, 2);
    e.submit_answer("Islamabad").await; // P1, next 'd'
    e.submit_answer("Düsseldorf").await; // P2, next 'f'
    e.submit_answer("Finland").await; // P1, next 'd'
    let dup = e.submit_answer("DUSSELDORF").await; // P2
    assert_eq!(dup.status, AnswerStatus::AlreadyUsed);
    assert!(e.state().is_used(&normalize("düsseldorf")));
}

#[tokio::test]
async fn test_unknown_place_through_public_api() {
    // P1 blanks once, P2 plays, P1 names a fake place: second strike.
    let mut e = engine(2, 2);
    assert_eq!(e.submit_answer("").await.status, AnswerStatus::Empty);
    assert_eq!(e.submit_answer("Oslo").await.status, AnswerStatus::Valid);
    let fake = e.submit_answer("Fake").await;
    assert_eq!(fake.status, AnswerStatus::WrongLetter);

    let mut e = engine(2, 2);
    e.handle_timeout().unwrap(); // P1: 1 strike
    e.handle_timeout().unwrap(); // P2: 1 strike
    let fake = e.submit_answer("Fake").await; // any letter still allowed
    assert_eq!(fake.status, AnswerStatus::NotAPlace);
    assert!(fake.eliminated);
    assert_eq!(fake.winner.map(|p| p.id), Some(pid(2)));
    assert!(e.is_over());
}

#[tokio::test]
async fn test_three_players_elimination_skips_turns() {
    let mut e = engine(3, 1);
    let out = e.handle_timeout().unwrap(); // P1 out
    assert!(out.eliminated);
    assert_eq!(out.next_player.map(|p| p.id), Some(pid(2)));
    assert_eq!(out.winner, None);

    e.submit_answer("Oslo").await; // P2
    assert_eq!(e.current_player().id, pid(3));
    e.submit_answer("Oman").await; // P3: not a place → out
    assert!(e.is_over());
    assert_eq!(e.winner().map(|p| p.id), Some(pid(2)));
}

#[tokio::test]
async fn test_leave_of_waiting_player_keeps_turn() {
    let mut e = engine(3, 2);
    let out = e.leave_game(pid(3)).unwrap();
    assert!(!out.held_turn);
    assert_eq!(out.next_player.map(|p| p.id), Some(pid(1)));
    assert_eq!(e.current_player().id, pid(1));

    assert_eq!(e.leave_game(pid(3)), Err(GameError::AlreadyEliminated(pid(3))));
    assert_eq!(e.leave_game(pid(42)), Err(GameError::PlayerNotFound(pid(42))));
}

#[tokio::test]
async fn test_leave_down_to_one_player_declares_winner() {
    let mut e = engine(2, 2);
    let out = e.leave_game(pid(1)).unwrap();
    assert!(out.held_turn);
    assert_eq!(out.winner.map(|p| p.id), Some(pid(2)));
    assert_eq!(out.next_player, None);
    assert_eq!(e.leave_game(pid(2)), Err(GameError::GameOver));
}

// =========================================================================
// Validator faults
// =========================================================================

#[tokio::test]
async fn test_fault_counts_as_strike_by_default() {
    let validator = Flaky::new(&["Oslo"]);
    let mut e = GameEngine::new(roster(2), &GameConfig::default(), Arc::clone(&validator));

    let out = e.submit_answer("Oslo").await;
    assert_eq!(out.status, AnswerStatus::NotAPlace);
    assert_eq!(out.player.strikes(), 1);
    assert_eq!(e.current_player().id, pid(2));
    assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fault_is_forgiven_under_forgive_policy() {
    let validator = Flaky::new(&["Oslo"]);
    let config = GameConfig {
        fault_policy: FaultPolicy::Forgive,
        ..GameConfig::default()
    };
    let mut e = GameEngine::new(roster(2), &config, Arc::clone(&validator));

    let out = e.submit_answer("Oslo").await;
    assert_eq!(out.status, AnswerStatus::LookupFailed);
    assert_eq!(out.player.strikes(), 0);
    assert!(!out.status.is_strike());
    assert_eq!(e.current_player().id, pid(1));
    assert!(e.state().used_words().is_empty());

    validator.healthy.store(true, Ordering::SeqCst);
    let out = e.submit_answer("Oslo").await;
    assert_eq!(out.status, AnswerStatus::Valid);
    assert_eq!(e.current_player().id, pid(2));
}

// =========================================================================
// Invariants over a scripted game
// =========================================================================

#[tokio::test]
async fn test_invariants_hold_through_mixed_sequence() {
    let mut e = engine(4, 2);
    let script = [
        "Oslo", "", "Oman", "Oslo", "Nairobi", "Iceland", "Delhi", "xyz", "Dublin",
        "Nairobi", "Lima", "Amsterdam", "Madrid", "Mumbai",
    ];

    let mut words = 0;
    let mut letter = e.state().required_letter();
    for (step, text) in script.iter().enumerate() {
        if e.is_over() {
            break;
        }
        let out = e.submit_answer(text).await;

        assert!(cursor_is_on_active_player(&e), "step {step}");
        assert!(e.state().used_words().len() >= words, "step {step}");
        words = e.state().used_words().len();

        if out.status == AnswerStatus::Valid {
            let last = text.trim().chars().last().unwrap().to_ascii_lowercase();
            assert_eq!(out.next_letter, Some(last), "step {step}");
        } else {
            assert_eq!(out.next_letter, letter, "step {step}");
        }
        assert_eq!(e.state().required_letter(), out.next_letter);
        letter = out.next_letter;

        if e.state().active_count() == 1 {
            assert!(out.winner.is_some());
        }
    }
}

#[tokio::test]
async fn test_timeouts_until_one_player_remains() {
    let mut e = engine(3, 2);
    let mut last = None;
    while !e.is_over() {
        let out = e.handle_timeout().unwrap();
        assert!(cursor_is_on_active_player(&e));
        last = Some(out);
    }
    let last = last.unwrap();
    assert!(last.winner.is_some());
    assert_eq!(e.state().active_count(), 1);
    assert!(e.state().used_words().is_empty());
    assert_eq!(e.state().required_letter(), None);
}
