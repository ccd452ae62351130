//! Tests for the reconciliation engine against [`MemoryStore`] and a
//! scripted remote.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

mod common;

use common::{FakeRemote, FlakyStore, death, kill, raw_event, scope};
use killboard_core::{ErrorCategory, Reconciler, SyncSettings, TrackerError};
use killboard_db::{KillboardStore, MemoryStore};
use killboard_remote::EventPage;
use killboard_types::{GuildFilter, GuildId, PlayerId};

const G1: &str = "guild-1";

fn setup() -> (FakeRemote, MemoryStore, Reconciler<FakeRemote, MemoryStore>) {
    let remote = FakeRemote::new()
        .with_guild(G1, "Night Watch")
        .with_guild("guild-2", "Iron Bank");
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(remote.clone(), store.clone());
    (remote, store, reconciler)
}

// ---------------------------------------------------------------------------
// Bind / unbind
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bind_stores_remote_guild() {
    let (_, store, reconciler) = setup();

    let binding = reconciler.bind(&scope("s1"), "  Night Watch ").await.unwrap();

    assert_eq!(binding.external_id.as_str(), G1);
    assert_eq!(binding.name, "Night Watch");
    assert_eq!(binding.death_fame, 1_000);
    assert_eq!(store.binding_count().await, 1);
}

#[tokio::test]
async fn bind_same_guild_twice_to_one_scope_is_rejected() {
    let (_, store, reconciler) = setup();
    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();

    let err = reconciler.bind(&scope("s1"), "Night Watch").await.unwrap_err();

    assert!(matches!(err, TrackerError::AlreadyBound { .. }));
    assert_eq!(err.category(), ErrorCategory::AlreadyExists);
    assert_eq!(store.binding_count().await, 1);
}

#[tokio::test]
async fn scope_with_a_binding_cannot_take_a_second_guild() {
    let (_, _, reconciler) = setup();
    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();

    let err = reconciler.bind(&scope("s1"), "Iron Bank").await.unwrap_err();

    assert!(matches!(err, TrackerError::AlreadyBound { .. }));
}

#[tokio::test]
async fn same_guild_binds_independently_in_two_scopes() {
    let (_, store, reconciler) = setup();

    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();
    reconciler.bind(&scope("s2"), "Night Watch").await.unwrap();

    assert_eq!(store.binding_count().await, 2);
    assert_eq!(
        store.count_bindings_for_guild(&GuildId::new(G1)).await.unwrap(),
        2
    );
}

#[tokio::test]
async fn bind_unknown_guild_is_not_found() {
    let (_, store, reconciler) = setup();

    let err = reconciler.bind(&scope("s1"), "Nobody").await.unwrap_err();

    assert!(matches!(err, TrackerError::RemoteNotFound(_)));
    assert_eq!(err.category(), ErrorCategory::NotFound);
    assert_eq!(store.binding_count().await, 0);
}

#[tokio::test]
async fn bind_blank_name_is_invalid() {
    let (_, _, reconciler) = setup();

    let err = reconciler.bind(&scope("s1"), "   ").await.unwrap_err();

    assert!(matches!(err, TrackerError::InvalidInput(_)));
}

#[tokio::test]
async fn unbind_without_binding_fails() {
    let (_, _, reconciler) = setup();

    let err = reconciler.unbind(&scope("s1")).await.unwrap_err();

    assert!(matches!(err, TrackerError::NoBinding(_)));
}

#[tokio::test]
async fn unbind_keeps_events_while_another_scope_tracks_the_guild() {
    let (_, store, reconciler) = setup();
    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();
    reconciler.bind(&scope("s2"), "Night Watch").await.unwrap();
    store.insert_event(&kill("e1", 1, 100, "a", G1)).await.unwrap();

    let report = reconciler.unbind(&scope("s1")).await.unwrap();

    assert_eq!(report.events_deleted, 0);
    assert_eq!(store.event_count().await, 1);
    assert_eq!(store.binding_count().await, 1);
}

#[tokio::test]
async fn unbind_keeps_kills_scored_by_another_bound_guild() {
    let (_, store, reconciler) = setup();
    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();
    reconciler.bind(&scope("s2"), "Iron Bank").await.unwrap();
    let g2 = GuildFilter::Guild(GuildId::new("guild-2"));
    store
        .insert_event(
            &raw_event("cross", 1, 500, ("k2", Some("guild-2")), ("v1", Some(G1))).into_kill_event(),
        )
        .await
        .unwrap();
    store.insert_event(&kill("own", 2, 100, "k1", G1)).await.unwrap();

    let report = reconciler.unbind(&scope("s1")).await.unwrap();

    assert_eq!(report.events_deleted, 1);
    assert!(store.contains_event("cross").await);
    assert!(!store.contains_event("own").await);
    assert_eq!(store.total_fame(&g2).await.unwrap(), 500);
}

// ---------------------------------------------------------------------------
// Event sync
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_without_binding_fails() {
    let (remote, _, reconciler) = setup();

    let err = reconciler.sync_events(&scope("s1")).await.unwrap_err();

    assert!(matches!(err, TrackerError::NoBinding(_)));
    assert_eq!(remote.event_fetches(), 0);
}

#[tokio::test]
async fn sync_is_idempotent() {
    let (remote, store, reconciler) = setup();
    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();
    remote.set_events(
        G1,
        vec![
            raw_event("e1", 3, 100, ("a", Some(G1)), ("x", None)),
            raw_event("e2", 2, 200, ("x", None), ("b", Some(G1))),
        ],
    );

    let first = reconciler.sync_events(&scope("s1")).await.unwrap();
    let second = reconciler.sync_events(&scope("s1")).await.unwrap();

    assert_eq!(first.inserted(), 2);
    assert_eq!(second.inserted(), 0);
    assert_eq!(second.outcome.unchanged_count(), 2);
    assert_eq!(store.event_count().await, 2);
}

#[tokio::test]
async fn duplicate_ids_in_one_page_insert_once() {
    let (remote, store, reconciler) = setup();
    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();
    let event = raw_event("e1", 1, 100, ("a", Some(G1)), ("x", None));
    remote.set_events(G1, vec![event.clone(), event]);

    let report = reconciler.sync_events(&scope("s1")).await.unwrap();

    assert_eq!(report.fetched, 2);
    assert_eq!(report.inserted(), 1);
    assert_eq!(report.outcome.unchanged_count(), 1);
    assert_eq!(store.event_count().await, 1);
}

#[tokio::test]
async fn events_outside_known_window_fall_back_to_store_conflict() {
    let (remote, store, reconciler) = setup();
    let reconciler = reconciler.with_settings(SyncSettings {
        event_page: EventPage::latest(51),
        known_window: 1,
    });
    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();
    store.insert_event(&kill("old", 1, 10, "a", G1)).await.unwrap();
    store.insert_event(&kill("new", 9, 10, "a", G1)).await.unwrap();
    remote.set_events(
        G1,
        vec![raw_event("old", 1, 10, ("a", Some(G1)), ("outsider", None))],
    );

    let report = reconciler.sync_events(&scope("s1")).await.unwrap();

    assert_eq!(report.inserted(), 0);
    assert!(report.outcome.is_clean());
    assert_eq!(store.event_count().await, 2);
}

#[tokio::test]
async fn sync_fetches_configured_page_size() {
    let (remote, store, reconciler) = setup();
    let reconciler = reconciler.with_settings(SyncSettings {
        event_page: EventPage::latest(2),
        known_window: 100,
    });
    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();
    remote.set_events(
        G1,
        (0..5)
            .map(|i| raw_event(&format!("e{i}"), i, 10, ("a", Some(G1)), ("x", None)))
            .collect(),
    );

    let report = reconciler.sync_events(&scope("s1")).await.unwrap();

    assert_eq!(report.fetched, 2);
    assert_eq!(store.event_count().await, 2);
}

#[tokio::test]
async fn failed_insert_is_skipped_and_batch_continues() {
    let remote = FakeRemote::new().with_guild(G1, "Night Watch");
    let store = FlakyStore::new(MemoryStore::new());
    let reconciler = Reconciler::new(remote.clone(), store.clone());
    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();
    store.fail_event("e2");
    remote.set_events(
        G1,
        vec![
            raw_event("e1", 3, 10, ("a", Some(G1)), ("x", None)),
            raw_event("e2", 2, 10, ("a", Some(G1)), ("x", None)),
            raw_event("e3", 1, 10, ("a", Some(G1)), ("x", None)),
        ],
    );

    let report = reconciler.sync_events(&scope("s1")).await.unwrap();

    assert_eq!(report.inserted(), 2);
    let skipped = report.outcome.skipped_items();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].item, "e2");
    assert!(store.inner.contains_event("e3").await);
}

#[tokio::test]
async fn inserted_ids_follow_remote_order() {
    let (remote, _, reconciler) = setup();
    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();
    remote.set_events(
        G1,
        vec![
            raw_event("e9", 9, 10, ("a", Some(G1)), ("x", None)),
            raw_event("e1", 1, 10, ("a", Some(G1)), ("x", None)),
            raw_event("e5", 5, 10, ("a", Some(G1)), ("x", None)),
        ],
    );

    let report = reconciler.sync_events(&scope("s1")).await.unwrap();

    let ids: Vec<&str> = report
        .outcome
        .applied_items()
        .iter()
        .map(|id| id.as_str())
        .collect();
    assert_eq!(ids, ["e9", "e1", "e5"]);
}

// ---------------------------------------------------------------------------
// Member sync
// ---------------------------------------------------------------------------

#[tokio::test]
async fn prune_removes_only_departed_killers() {
    let (remote, store, reconciler) = setup();
    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();
    store.insert_event(&kill("ka", 1, 10, "a", G1)).await.unwrap();
    store.insert_event(&kill("kb", 2, 10, "b", G1)).await.unwrap();
    store.insert_event(&kill("kc1", 3, 10, "c", G1)).await.unwrap();
    store.insert_event(&kill("kc2", 4, 10, "c", G1)).await.unwrap();
    // Rows where c is the victim are not pruned.
    store.insert_event(&death("dc", 5, "c", G1)).await.unwrap();
    store
        .insert_event(&raw_event("ac", 6, 10, ("a", Some(G1)), ("c", Some(G1))).into_kill_event())
        .await
        .unwrap();
    remote.set_roster(G1, &["a", "b"]);

    let report = reconciler.sync_members(&scope("s1")).await.unwrap();

    assert_eq!(report.removed(), 1);
    assert_eq!(report.rows_deleted, 2);
    assert_eq!(report.roster_size, 2);
    assert_eq!(report.outcome.applied_items(), [PlayerId::new("c")]);
    assert!(store.contains_event("ka").await);
    assert!(store.contains_event("kb").await);
    assert!(store.contains_event("dc").await);
    assert!(store.contains_event("ac").await);
    assert!(!store.contains_event("kc1").await);
    assert!(!store.contains_event("kc2").await);
}

#[tokio::test]
async fn prune_with_full_roster_is_a_no_op() {
    let (remote, store, reconciler) = setup();
    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();
    store.insert_event(&kill("ka", 1, 10, "a", G1)).await.unwrap();
    remote.set_roster(G1, &["a", "z"]);

    let first = reconciler.sync_members(&scope("s1")).await.unwrap();
    let second = reconciler.sync_members(&scope("s1")).await.unwrap();

    assert_eq!(first.removed(), 0);
    assert_eq!(second.removed(), 0);
    assert_eq!(store.event_count().await, 1);
}

#[tokio::test]
async fn prune_failure_for_one_player_does_not_stop_others() {
    let remote = FakeRemote::new().with_guild(G1, "Night Watch");
    let store = FlakyStore::new(MemoryStore::new());
    let reconciler = Reconciler::new(remote.clone(), store.clone());
    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();
    store.insert_event(&kill("kc", 1, 10, "c", G1)).await.unwrap();
    store.insert_event(&kill("kd", 2, 10, "d", G1)).await.unwrap();
    store.fail_killer("c");
    remote.set_roster(G1, &[]);

    let report = reconciler.sync_members(&scope("s1")).await.unwrap();

    assert_eq!(report.removed(), 1);
    assert_eq!(report.outcome.skipped_items()[0].item, "c");
    assert!(store.inner.contains_event("kc").await);
    assert!(!store.inner.contains_event("kd").await);
}

#[tokio::test]
async fn roster_fetch_failure_aborts_before_any_delete() {
    let (_, store, reconciler) = setup();
    reconciler.bind(&scope("s1"), "Night Watch").await.unwrap();
    store.insert_event(&kill("ka", 1, 10, "a", G1)).await.unwrap();

    // No roster scripted: the fake answers 503.
    let err = reconciler.sync_members(&scope("s1")).await.unwrap_err();

    assert!(matches!(err, TrackerError::Remote(_)));
    assert_eq!(err.category(), ErrorCategory::Internal);
    assert_eq!(store.event_count().await, 1);
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bind_then_sync_with_one_known_event() {
    let (remote, store, reconciler) = setup();
    reconciler.bind(&scope("S1"), "Night Watch").await.unwrap();
    store.insert_event(&kill("e1", 1, 100, "a", G1)).await.unwrap();
    remote.set_events(
        G1,
        vec![
            raw_event("e3", 3, 300, ("a", Some(G1)), ("x", None)),
            raw_event("e2", 2, 200, ("b", Some(G1)), ("y", None)),
            raw_event("e1", 1, 100, ("a", Some(G1)), ("outsider", None)),
        ],
    );

    let first = reconciler.sync_events(&scope("S1")).await.unwrap();
    let second = reconciler.sync_events(&scope("S1")).await.unwrap();

    assert_eq!(first.inserted(), 2);
    assert_eq!(second.inserted(), 0);
    assert_eq!(store.event_count().await, 3);
}

#[tokio::test]
async fn unbind_removes_binding_and_events_then_sync_fails() {
    let (remote, store, reconciler) = setup();
    reconciler.bind(&scope("S1"), "Night Watch").await.unwrap();
    remote.set_events(
        G1,
        vec![
            raw_event("e1", 1, 100, ("a", Some(G1)), ("x", None)),
            raw_event("e2", 2, 100, ("x", None), ("a", Some(G1))),
        ],
    );
    reconciler.sync_events(&scope("S1")).await.unwrap();
    store.insert_event(&kill("other", 3, 10, "q", "guild-2")).await.unwrap();

    let report = reconciler.unbind(&scope("S1")).await.unwrap();

    assert_eq!(report.events_deleted, 2);
    assert_eq!(store.binding_count().await, 0);
    assert_eq!(store.event_count().await, 1);
    let err = reconciler.sync_events(&scope("S1")).await.unwrap_err();
    assert!(matches!(err, TrackerError::NoBinding(_)));
}
