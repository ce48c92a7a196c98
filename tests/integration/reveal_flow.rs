//! End-to-end reveal flow against an on-disk store
//!
//! Drives the machine the way the draw screen does: draw, persist the
//! outcome, restart, and expect the same place at the table.

use std::time::Instant;

use jaunt::itinerary::ItineraryRepository;
use jaunt::reveal::{DrawAttempt, RevealMachine, TickOutcome};

use super::helpers::*;

/// A full draw lands on the strict successor and survives a restart.
#[test]
fn test_draw_persists_and_restores() {
    let (_tmp, store) = temp_store();
    seed_steps(
        &store,
        &[
            ("1", "Night market crawl", true),
            ("2", "Hot springs", true),
            ("3", "Ferry to the island", false),
        ],
    );
    let repo = ItineraryRepository::new(store.clone());

    let mut machine = RevealMachine::new(
        fast_params(),
        repo.load_steps().expect("Failed to load steps"),
        repo.load_progress().expect("Failed to load progress"),
    );
    assert_eq!(machine.current_step().unwrap().id, "1");
    assert!(machine.next_ready());

    assert_eq!(machine.request_reveal(Instant::now()), DrawAttempt::Started);
    let outcome = run_draw(&mut machine);
    assert_eq!(
        outcome,
        TickOutcome::Revealed {
            step_id: "2".to_string()
        }
    );
    repo.save_progress("2").expect("Failed to save progress");

    // A fresh process sees the reveal and the rebuilt history.
    let restored = RevealMachine::new(
        fast_params(),
        repo.load_steps().unwrap(),
        repo.load_progress().unwrap(),
    );
    assert_eq!(restored.current_step().unwrap().id, "2");
    assert_eq!(
        restored.history(),
        &["1".to_string(), "2".to_string()]
    );
    assert!(!restored.next_ready());
}

/// Drawing against a locked successor raises the banner and changes
/// nothing on disk.
#[test]
fn test_locked_draw_is_refused() {
    let (_tmp, store) = temp_store();
    seed_steps(&store, &[("1", "Arrival", true), ("2", "Secret dinner", false)]);
    let repo = ItineraryRepository::new(store.clone());

    let mut machine = RevealMachine::new(
        fast_params(),
        repo.load_steps().unwrap(),
        repo.load_progress().unwrap(),
    );

    let now = Instant::now();
    assert_eq!(machine.request_reveal(now), DrawAttempt::Locked);
    assert!(machine.banner(now).is_some());
    assert!(repo.load_progress().unwrap().is_none());
}

/// The driver persists exactly one progress write per completed draw.
#[test]
fn test_draw_writes_progress_once() {
    let (_tmp, store) = temp_store();
    seed_steps(&store, &[("1", "Arrival", true), ("2", "Summit hike", true)]);

    let counting = CountingStore::new(store);
    let repo = ItineraryRepository::new(counting.clone());

    let mut machine = RevealMachine::new(
        fast_params(),
        repo.load_steps().unwrap(),
        repo.load_progress().unwrap(),
    );

    let writes_before = counting.writes();
    machine.request_reveal(Instant::now());
    let outcome = run_draw(&mut machine);
    if let TickOutcome::Revealed { step_id } = outcome {
        repo.save_progress(&step_id).unwrap();
    } else {
        panic!("expected a reveal, got {outcome:?}");
    }
    assert_eq!(counting.writes(), writes_before + 1);

    assert_eq!(
        repo.load_progress().unwrap().unwrap().last_drawn_step_id,
        "2"
    );
}

/// A failed save leaves the revealed state on screen; the next restart
/// just starts from the older progress.
#[test]
fn test_reveal_survives_failed_save() {
    let (_tmp, store) = temp_store();
    seed_steps(&store, &[("1", "Arrival", true), ("2", "Summit hike", true)]);
    let repo = ItineraryRepository::new(store.clone());

    let mut machine = RevealMachine::new(
        fast_params(),
        repo.load_steps().unwrap(),
        repo.load_progress().unwrap(),
    );
    machine.request_reveal(Instant::now());
    let outcome = run_draw(&mut machine);
    assert_eq!(
        outcome,
        TickOutcome::Revealed {
            step_id: "2".to_string()
        }
    );

    // Simulate the save never happening: in-session state still shows
    // the reveal.
    assert_eq!(machine.current_step().unwrap().id, "2");
    assert!(machine.is_revealed("2"));

    // Without the save, a restart replays from the start.
    let restored = RevealMachine::new(
        fast_params(),
        repo.load_steps().unwrap(),
        repo.load_progress().unwrap(),
    );
    assert_eq!(restored.current_step().unwrap().id, "1");
    assert!(restored.history().is_empty());
}

/// Relocking the current step from another process falls back to the
/// highest step still unlocked after the next snapshot sync.
#[test]
fn test_relock_falls_back_to_highest_unlocked() {
    let (_tmp, store) = temp_store();
    seed_steps(
        &store,
        &[
            ("1", "Arrival", true),
            ("2", "Hot springs", true),
            ("3", "Finale", true),
        ],
    );
    let repo = ItineraryRepository::new(store.clone());

    let mut machine = RevealMachine::new(
        fast_params(),
        repo.load_steps().unwrap(),
        Some(jaunt::models::ProgressRecord::new("3")),
    );
    assert_eq!(machine.current_step().unwrap().id, "3");

    // Another process relocks the finale.
    seed_steps(&store, &[("3", "Finale", false)]);
    machine.sync_steps(repo.load_steps().unwrap());

    assert_eq!(machine.current_step().unwrap().id, "2");
    assert_eq!(machine.display_step().unwrap().id, "2");
}
