use std::sync::Arc;

use datebooker::engine::{now_secs, Engine};
use datebooker::model::*;

// ── Test infrastructure ──────────────────────────────────────

const D: Secs = SECS_PER_DAY;
const FEB_15: Secs = 1_550_188_800; // 2019-02-15T00:00:00Z
const FEB_17: Secs = 1_550_361_600;
const FEB_18: Secs = 1_550_448_000;

/// `3019-02-{day}T00:00:00Z`
fn future_feb(day: i64) -> Secs {
    33_105_888_000 + (day - 1) * D
}

fn register(engine: &Engine, capacity: i64) -> ResourceId {
    match engine.register(capacity).unwrap() {
        RegisterOutcome::Registered { resource_id } => resource_id,
        other => panic!("expected Registered, got {other:?}"),
    }
}

async fn book(engine: &Engine, rid: ResourceId, who: &str, from: Secs, days: i64) -> BookOutcome {
    engine.book(rid, who.into(), from, days).await.unwrap()
}

/// No two held reservations on a resource overlap, and size never exceeds capacity.
async fn assert_invariants(engine: &Engine, rid: ResourceId) {
    let capacity = engine.get_capacity(rid).await.unwrap() as usize;
    let bookings = engine.get_bookings(rid).await.unwrap();
    assert!(bookings.len() <= capacity);
    assert_eq!(bookings.len(), engine.get_size(rid).await.unwrap());
    for (i, a) in bookings.iter().enumerate() {
        for b in &bookings[i + 1..] {
            let sa = Span::new(a.from_date, a.to_date);
            let sb = Span::new(b.from_date, b.to_date);
            assert!(!sa.overlaps(&sb), "{a:?} overlaps {b:?}");
        }
    }
}

// ── Scenarios ────────────────────────────────────────────────

#[tokio::test]
async fn scenario_a_back_to_back_bookings_succeed() {
    let engine = Engine::new();
    let rid = register(&engine, 10);
    assert!(book(&engine, rid, "alice", FEB_15, 1).await.is_success());
    assert!(book(&engine, rid, "alice", FEB_17, 2).await.is_success());
    assert_invariants(&engine, rid).await;
}

#[tokio::test]
async fn scenario_b_overlap_conflicts() {
    let engine = Engine::new();
    let rid = register(&engine, 10);
    let first = book(&engine, rid, "alice", FEB_15, 3).await.booking_id().unwrap();
    assert_eq!(
        book(&engine, rid, "bob", FEB_17, 3).await,
        BookOutcome::BookConflict { with: first }
    );
    assert_invariants(&engine, rid).await;
}

#[tokio::test]
async fn scenario_c_full_resource_rejects_any_dates() {
    let engine = Engine::new();
    let rid = register(&engine, 1);
    assert!(book(&engine, rid, "alice", FEB_15, 1).await.is_success());
    for y in [FEB_15, FEB_18, future_feb(3), 71] {
        assert_eq!(book(&engine, rid, "bob", y, 1).await, BookOutcome::NoMoreSpace);
    }
    assert_invariants(&engine, rid).await;
}

#[tokio::test]
async fn scenario_d_only_owner_cancels() {
    let engine = Engine::new();
    let rid = register(&engine, 10);
    let b1 = book(&engine, rid, "alice", FEB_15, 2).await.booking_id().unwrap();

    assert_eq!(
        engine.cancel(rid, b1, "bob".into()).await.unwrap(),
        CancelOutcome::PermissionDenied
    );
    assert_eq!(engine.get_size(rid).await.unwrap(), 1);

    assert_eq!(
        engine.cancel(rid, b1, "alice".into()).await.unwrap(),
        CancelOutcome::Cancellation { booking_id: b1 }
    );
    assert_eq!(engine.get_size(rid).await.unwrap(), 0);
    assert_eq!(engine.find_book(rid, b1).await.unwrap(), -1);
}

#[tokio::test]
async fn scenario_e_future_bookings_are_active() {
    let engine = Engine::new();
    let rid = register(&engine, 2);
    assert!(book(&engine, rid, "alice", future_feb(3), 2).await.is_success());
    assert!(book(&engine, rid, "alice", future_feb(10), 3).await.is_success());
    assert_eq!(engine.get_active_bookings_count(rid, now_secs()).await.unwrap(), 2);
    assert_eq!(engine.get_size(rid).await.unwrap(), 2);
}

#[tokio::test]
async fn scenario_f_elapsed_bookings_are_held_but_inactive() {
    let engine = Engine::new();
    let rid = register(&engine, 3);
    assert!(book(&engine, rid, "alice", FEB_15, 2).await.is_success());
    assert!(book(&engine, rid, "alice", FEB_18, 3).await.is_success());
    assert!(book(&engine, rid, "alice", future_feb(5), 3).await.is_success());
    assert_eq!(engine.get_active_bookings_count(rid, now_secs()).await.unwrap(), 1);
    assert_eq!(engine.get_size(rid).await.unwrap(), 3);
}

// ── Properties ───────────────────────────────────────────────

#[tokio::test]
async fn active_count_never_exceeds_size() {
    let engine = Engine::new();
    let rid = register(&engine, 20);
    for i in 0..20 {
        book(&engine, rid, "alice", FEB_15 + i * 7 * D, 3).await;
    }
    let size = engine.get_size(rid).await.unwrap();
    for now in [0, FEB_15, FEB_15 + 30 * D, FEB_15 + 200 * D] {
        let active = engine.get_active_bookings_count(rid, now).await.unwrap();
        assert!(active <= size);
    }
    // Nothing has ended before the first booking starts
    assert_eq!(engine.get_active_bookings_count(rid, FEB_15).await.unwrap(), size);
}

#[tokio::test]
async fn cancel_decrements_size_by_one() {
    let engine = Engine::new();
    let rid = register(&engine, 5);
    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(book(&engine, rid, "alice", FEB_15 + i * 2 * D, 1).await.booking_id().unwrap());
    }
    for (n, id) in ids.iter().enumerate() {
        let before = engine.get_size(rid).await.unwrap();
        engine.cancel(rid, *id, "alice".into()).await.unwrap();
        assert_eq!(engine.get_size(rid).await.unwrap(), before - 1);
        assert_eq!(engine.find_book(rid, *id).await.unwrap(), -1);
        assert_eq!(before, 5 - n);
    }
}

#[tokio::test]
async fn mixed_workload_keeps_invariants() {
    let engine = Engine::new();
    let rid = register(&engine, 4);
    let callers = ["alice", "bob", "carol"];
    let mut held: Vec<(BookingId, &str)> = Vec::new();

    // Deterministic pseudo-random walk over book/cancel requests.
    let mut seed: u64 = 0x5eed;
    for step in 0..300 {
        seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        let who = callers[(seed >> 33) as usize % callers.len()];
        if step % 3 == 2 && !held.is_empty() {
            let (id, owner) = held.remove((seed >> 40) as usize % held.len());
            let outcome = engine.cancel(rid, id, who.into()).await.unwrap();
            if who == owner {
                assert_eq!(outcome, CancelOutcome::Cancellation { booking_id: id });
            } else {
                assert_eq!(outcome, CancelOutcome::PermissionDenied);
                held.push((id, owner));
            }
        } else {
            let from = FEB_15 + ((seed >> 20) % 60) as i64 * D;
            let days = 1 + ((seed >> 50) % 5) as i64;
            if let BookOutcome::BookSuccess { booking_id, .. } = book(&engine, rid, who, from, days).await {
                held.push((booking_id, who));
            }
        }
        assert_invariants(&engine, rid).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn resources_are_independent_under_concurrency() {
    let engine = Arc::new(Engine::new());
    let rids: Vec<_> = (0..8).map(|_| register(&engine, 3)).collect();

    let mut handles = Vec::new();
    for (i, &rid) in rids.iter().enumerate() {
        for j in 0..10 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                let who = format!("user{i}-{j}");
                engine.book(rid, who.into(), FEB_15 + j * D, 1).await.unwrap()
            }));
        }
    }
    for result in futures::future::join_all(handles).await {
        result.unwrap();
    }

    for &rid in &rids {
        assert_eq!(engine.get_size(rid).await.unwrap(), 3);
        assert_invariants(&engine, rid).await;
    }
}

#[tokio::test]
async fn subscriber_sees_every_outcome_in_order() {
    let engine = Engine::new();
    let rid = register(&engine, 1);
    let mut rx = engine.subscribe(rid).unwrap();

    let b1 = book(&engine, rid, "alice", FEB_15, 2).await.booking_id().unwrap();
    book(&engine, rid, "bob", FEB_18, 1).await;
    engine.cancel(rid, b1, "alice".into()).await.unwrap();
    book(&engine, rid, "bob", FEB_15, 1).await;

    let kinds: Vec<&str> = {
        let mut out = Vec::new();
        for _ in 0..4 {
            out.push(match rx.recv().await.unwrap() {
                Event::BookSuccess { .. } => "success",
                Event::NoMoreSpace { .. } => "no_more_space",
                Event::Cancellation { .. } => "cancellation",
                other => panic!("unexpected event {other:?}"),
            });
        }
        out
    };
    assert_eq!(kinds, vec!["success", "no_more_space", "cancellation", "success"]);
}
