//! Cross-process visibility through store and session watchers

use std::sync::mpsc;
use std::time::Duration;

use jaunt::identity::{IdentityProvider, SessionFile};
use jaunt::itinerary::ItineraryRepository;
use jaunt::models::constants::{APP_STATE_COLLECTION, ITINERARY_COLLECTION};
use jaunt::models::Identity;
use jaunt::store::{DocumentStore, FileStore};

use super::helpers::*;

/// A watcher gets the current snapshot immediately, then one per
/// change, across two store handles on the same root.
#[test]
fn test_watch_sees_writes_from_another_handle() {
    let (_tmp, store) = temp_store();
    seed_steps(&store, &[("1", "Arrival", true)]);

    let (tx, rx) = mpsc::channel();
    let handle = store
        .watch(
            ITINERARY_COLLECTION,
            Box::new(move |docs| {
                let _ = tx.send(docs);
            }),
        )
        .expect("Failed to watch");

    let initial = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("no initial snapshot");
    assert_eq!(initial.len(), 1);

    // A second handle plays the other process.
    let writer = FileStore::open(store.root());
    seed_steps(&writer, &[("2", "Hot springs", false)]);

    let updated = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("no update snapshot");
    assert_eq!(updated.len(), 2);
    assert_eq!(updated[1].id, "2");

    handle.stop();
}

/// Steps watching through the repository maps documents to sorted steps.
#[test]
fn test_repository_watch_delivers_sorted_steps() {
    let (_tmp, store) = temp_store();
    seed_steps(&store, &[("10", "Finale", false), ("2", "Hot springs", true)]);
    let repo = ItineraryRepository::new(store.clone());

    let (tx, rx) = mpsc::channel();
    let _handle = repo
        .watch_steps(Box::new(move |steps| {
            let _ = tx.send(steps);
        }))
        .expect("Failed to watch steps");

    let steps = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("no snapshot");
    let ids: Vec<&str> = steps.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "10"]);
}

/// Progress saves land in the appState collection where another
/// process's watcher can see them.
#[test]
fn test_progress_save_is_visible_to_watchers() {
    let (_tmp, store) = temp_store();
    let repo = ItineraryRepository::new(store.clone());

    let (tx, rx) = mpsc::channel();
    let _handle = store
        .watch(
            APP_STATE_COLLECTION,
            Box::new(move |docs| {
                let _ = tx.send(docs);
            }),
        )
        .expect("Failed to watch");

    // Initial snapshot of a store with no progress yet.
    let initial = rx.recv_timeout(Duration::from_secs(2)).expect("no snapshot");
    assert!(initial.is_empty());

    repo.save_progress("3").expect("Failed to save progress");

    let updated = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("no update snapshot");
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].id, "progress");
    assert_eq!(
        updated[0].fields.get("lastDrawnStepId"),
        Some(&serde_json::json!("3"))
    );
}

/// Session watchers see sign-in and sign-out from another handle.
#[test]
fn test_session_watch_tracks_sign_in_state() {
    let (_tmp, store) = temp_store();
    let sessions =
        SessionFile::at_root(store.root()).with_poll_interval(Duration::from_millis(20));

    let (tx, rx) = mpsc::channel();
    let _handle = sessions
        .watch(Box::new(move |identity| {
            let _ = tx.send(identity);
        }))
        .expect("Failed to watch session");

    assert_eq!(rx.recv_timeout(Duration::from_secs(2)).expect("no initial"), None);

    let other = SessionFile::at_root(store.root());
    other
        .sign_in(&Identity::new("kai@example.com"))
        .expect("Failed to sign in");

    let signed_in = wait_for_identity(&rx, |identity| identity.is_some());
    assert_eq!(signed_in.unwrap().email, "kai@example.com");

    other.sign_out().expect("Failed to sign out");
    let signed_out = wait_for_identity(&rx, |identity| identity.is_none());
    assert!(signed_out.is_none());
}

fn wait_for_identity(
    rx: &mpsc::Receiver<Option<Identity>>,
    predicate: impl Fn(&Option<Identity>) -> bool,
) -> Option<Identity> {
    for _ in 0..100 {
        if let Ok(identity) = rx.recv_timeout(Duration::from_millis(100)) {
            if predicate(&identity) {
                return identity;
            }
        }
    }
    panic!("watcher never reported the expected state");
}
