mod common;

use std::rc::Rc;
use std::time::Duration;

use anystate::{register_field, DeferredState, FieldConfig, LogConfig, ManualSpawner, TokioLocalSpawner};
use common::{deferred_state, shared_host, RecordingHost};
use serde_json::json;

#[test]
fn same_field_writes_coalesce_into_one_commit_with_last_value() {
    let host = shared_host(RecordingHost::with_empty_state());
    let spawner = ManualSpawner::new();
    let state = deferred_state(&host, Rc::new(spawner.clone()));
    let count = register_field("count", FieldConfig::new().with_initial(json!(0)));

    count.set(&state, 1);
    count.set(&state, 2);

    // Cancel-and-replace leaves exactly one live scheduled commit.
    assert_eq!(spawner.scheduled(), 1);
    assert_eq!(count.value(&state), json!(2));

    spawner.run_pending();

    let host = host.borrow();
    assert_eq!(host.merges.len(), 1);
    assert_eq!(host.merges[0].get("count"), Some(&json!(2)));
    assert_eq!(host.live("count"), Some(json!(2)));
}

#[test]
fn distinct_field_writes_coalesce_into_one_batched_commit() {
    let host = shared_host(RecordingHost::with_empty_state());
    let spawner = ManualSpawner::new();
    let state = deferred_state(&host, Rc::new(spawner.clone()));
    let count = register_field("count", FieldConfig::new());
    let label = register_field("label", FieldConfig::new());

    count.set(&state, 3);
    label.set(&state, "ready");

    spawner.run_pending();

    let host = host.borrow();
    assert_eq!(host.merges.len(), 1);
    assert_eq!(host.merges[0].len(), 2);
    assert_eq!(host.merges[0].get("count"), Some(&json!(3)));
    assert_eq!(host.merges[0].get("label"), Some(&json!("ready")));
}

#[test]
fn buffer_is_cleared_after_the_commit_fires() {
    let host = shared_host(RecordingHost::with_empty_state());
    let spawner = ManualSpawner::new();
    let state = deferred_state(&host, Rc::new(spawner.clone()));
    let count = register_field("count", FieldConfig::new().with_initial(json!(0)));

    count.set(&state, 2);
    spawner.run_pending();

    // Read now falls through to live state, not the buffer.
    assert!(!state.has_pending_commit());
    assert_eq!(count.value(&state), json!(2));

    // A later write starts a fresh cycle.
    count.set(&state, 9);
    spawner.run_pending();
    assert_eq!(host.borrow().merges.len(), 2);
}

#[test]
fn commit_now_flushes_synchronously_and_is_idempotent() {
    let host = shared_host(RecordingHost::with_empty_state());
    let spawner = ManualSpawner::new();
    let state = deferred_state(&host, Rc::new(spawner.clone()));
    let count = register_field("count", FieldConfig::new());

    count.set(&state, 4);
    state.commit_now();

    assert_eq!(host.borrow().merges.len(), 1);
    assert_eq!(host.borrow().live("count"), Some(json!(4)));

    // Second flush with no intervening writes: empty buffer, no-op.
    state.commit_now();
    assert_eq!(host.borrow().merges.len(), 1);

    // The superseded scheduled commit was cancelled.
    assert_eq!(spawner.run_pending(), 0);
    assert_eq!(host.borrow().merges.len(), 1);
}

#[test]
fn commit_now_before_any_write_is_a_noop() {
    let host = shared_host(RecordingHost::with_empty_state());
    let spawner = ManualSpawner::new();
    let state = deferred_state(&host, Rc::new(spawner));

    state.commit_now();
    assert!(host.borrow().merges.is_empty());
}

#[test]
fn uncancellable_spawner_degrades_to_a_single_effective_merge() {
    let host = shared_host(RecordingHost::with_empty_state());
    let spawner = ManualSpawner::uncancellable();
    let state = deferred_state(&host, Rc::new(spawner.clone()));
    let count = register_field("count", FieldConfig::new());

    count.set(&state, 1);
    count.set(&state, 2);

    // Neither task could be cancelled, so both fire...
    assert_eq!(spawner.scheduled(), 2);
    assert_eq!(spawner.run_pending(), 2);

    // ...but the second finds an empty buffer: exactly one merge, last value.
    let host = host.borrow();
    assert_eq!(host.merges.len(), 1);
    assert_eq!(host.live("count"), Some(json!(2)));
}

#[tokio::test]
async fn tokio_spawner_coalesces_same_tick_writes() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let host = shared_host(RecordingHost::with_empty_state());
            let state = DeferredState::new(
                host.clone(),
                Rc::new(TokioLocalSpawner),
                LogConfig::default(),
            );
            let count = register_field("count", FieldConfig::new().with_initial(json!(0)));

            count.set(&state, 1);
            count.set(&state, 2);
            assert_eq!(count.value(&state), json!(2));

            tokio::time::sleep(Duration::from_millis(20)).await;

            let host = host.borrow();
            assert_eq!(host.merges.len(), 1);
            assert_eq!(host.merges[0].get("count"), Some(&json!(2)));
            assert_eq!(host.live("count"), Some(json!(2)));
        })
        .await;
}

#[tokio::test]
async fn tokio_spawner_applies_writes_from_separate_ticks_separately() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let host = shared_host(RecordingHost::with_empty_state());
            let state = DeferredState::new(
                host.clone(),
                Rc::new(TokioLocalSpawner),
                LogConfig::default(),
            );
            let count = register_field("count", FieldConfig::new());

            count.set(&state, 1);
            tokio::time::sleep(Duration::from_millis(20)).await;
            count.set(&state, 2);
            tokio::time::sleep(Duration::from_millis(20)).await;

            let host = host.borrow();
            assert_eq!(host.merges.len(), 2);
            assert_eq!(host.live("count"), Some(json!(2)));
        })
        .await;
}
