//! Admin unlock flow against an on-disk store

use std::time::Instant;

use jaunt::auth::{add_admin, set_unlocked, AdminDirectory, AdminSource};
use jaunt::errors::Error;
use jaunt::itinerary::ItineraryRepository;
use jaunt::models::Identity;
use jaunt::reveal::RevealMachine;

use super::helpers::*;

fn admin() -> Identity {
    Identity::new("ann@example.com")
}

/// An admin unlock flips readiness for a machine that syncs the next
/// snapshot, without touching the current position.
#[test]
fn test_unlock_recomputes_readiness() {
    let (_tmp, store) = temp_store();
    seed_steps(&store, &[("1", "Arrival", true), ("2", "Secret dinner", false)]);
    let repo = ItineraryRepository::new(store.clone());
    let directory = AdminDirectory::new(
        store.clone(),
        AdminSource::Config,
        vec!["ann@example.com".to_string()],
    );

    let mut machine = RevealMachine::new(
        fast_params(),
        repo.load_steps().unwrap(),
        repo.load_progress().unwrap(),
    );
    assert!(!machine.next_ready());

    set_unlocked(&directory, Some(&admin()), "2", true).expect("Failed to unlock");
    machine.sync_steps(repo.load_steps().unwrap());

    assert!(machine.next_ready());
    assert_eq!(machine.current_step().unwrap().id, "1");
}

/// Non-admins are denied before anything reaches the store.
#[test]
fn test_unlock_denied_for_non_admin() {
    let (_tmp, store) = temp_store();
    seed_steps(&store, &[("1", "Arrival", false)]);
    let directory = AdminDirectory::new(store.clone(), AdminSource::Config, Vec::new());

    let err = set_unlocked(
        &directory,
        Some(&Identity::new("guest@example.com")),
        "1",
        true,
    )
    .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { .. }));

    let repo = ItineraryRepository::new(store);
    assert!(!repo.load_steps().unwrap()[0].is_unlocked);
}

/// Signed-out callers are denied too.
#[test]
fn test_unlock_denied_when_signed_out() {
    let (_tmp, store) = temp_store();
    seed_steps(&store, &[("1", "Arrival", false)]);
    let directory = AdminDirectory::new(store, AdminSource::Config, Vec::new());

    let err = set_unlocked(&directory, None, "1", true).unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { .. }));
}

/// Store-backed membership works end to end on disk, including the
/// case-insensitive match.
#[test]
fn test_store_backed_admins_on_disk() {
    let (_tmp, store) = temp_store();
    seed_steps(&store, &[("1", "Arrival", false)]);
    add_admin(&store, "Ann@Example.com").expect("Failed to add admin");

    let directory = AdminDirectory::new(store.clone(), AdminSource::Store, Vec::new());
    assert!(directory.is_admin(Some(&Identity::new("ANN@example.com"))));

    set_unlocked(&directory, Some(&admin()), "1", true).unwrap();
    let repo = ItineraryRepository::new(store);
    assert!(repo.load_steps().unwrap()[0].is_unlocked);
}

/// Unlocking a step that does not exist is an InvalidStep error, not a
/// silent create.
#[test]
fn test_unlock_unknown_step_fails() {
    let (_tmp, store) = temp_store();
    seed_steps(&store, &[("1", "Arrival", true)]);
    let directory = AdminDirectory::new(
        store.clone(),
        AdminSource::Config,
        vec!["ann@example.com".to_string()],
    );

    let err = set_unlocked(&directory, Some(&admin()), "7", true).unwrap_err();
    assert!(matches!(err, Error::InvalidStep { .. }));

    let repo = ItineraryRepository::new(store);
    assert_eq!(repo.load_steps().unwrap().len(), 1);
}

/// A mid-roll relock by an admin abandons the draw cleanly.
#[test]
fn test_admin_relock_mid_roll_abandons() {
    let (_tmp, store) = temp_store();
    seed_steps(&store, &[("1", "Arrival", true), ("2", "Summit hike", true)]);
    let repo = ItineraryRepository::new(store.clone());
    let directory = AdminDirectory::new(
        store.clone(),
        AdminSource::Config,
        vec!["ann@example.com".to_string()],
    );

    let mut machine = RevealMachine::new(
        fast_params(),
        repo.load_steps().unwrap(),
        Some(jaunt::models::ProgressRecord::new("1")),
    );
    machine.request_reveal(Instant::now());

    set_unlocked(&directory, Some(&admin()), "2", false).unwrap();
    machine.sync_steps(repo.load_steps().unwrap());

    assert_eq!(
        run_draw(&mut machine),
        jaunt::reveal::TickOutcome::Abandoned
    );
    assert_eq!(machine.current_step().unwrap().id, "1");
    assert_eq!(machine.history(), &["1".to_string()]);
}
