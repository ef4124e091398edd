//! Integration tests for Slice 1 - Event accumulation
//!
//! Tests the full path: host event → decode → GoalEngine → output

use std::sync::Arc;
use std::time::Duration;

use goalring::core::{GoalEngine, MemoryStore, RenderFrame};
use goalring::types::{
    ArcPreset, EventType, GoalConfig, GoalPhase, InboundEvent, RawEvent, ReasonCode,
};
use goalring::CELEBRATION_DURATION_MS;
use serde_json::json;
use tokio::time::timeout;

fn engine(config: GoalConfig) -> GoalEngine {
    GoalEngine::new(config, Arc::new(MemoryStore::new()))
}

fn raw(kind: &str, payload: serde_json::Value) -> InboundEvent {
    InboundEvent::decode(&RawEvent::new(kind, payload))
}

// =============================================================================
// Five subscriber events
// =============================================================================

#[tokio::test]
async fn test_five_subscribers() {
    let mut engine = engine(GoalConfig {
        event_type: EventType::Subscriber,
        increment_unit: 1.0,
        ..Default::default()
    });

    for _ in 0..5 {
        let output = engine.handle_event(&raw("subscriber-latest", json!({})));
        assert!(output.is_some());
    }

    assert_eq!(engine.current(), 5.0);
    assert!((engine.state().fraction() - 0.05).abs() < 1e-12);
    assert_eq!(engine.phase(), GoalPhase::Accumulating);
}

// =============================================================================
// Donation amount
// =============================================================================

#[tokio::test]
async fn test_donation_adds_amount() {
    let mut engine = engine(GoalConfig {
        event_type: EventType::Donation,
        starting_value: 10.0,
        ..Default::default()
    });

    let output = engine
        .handle_event(&raw("tip-latest", json!({"amount": 37})))
        .unwrap();

    assert_eq!(output.current, 47.0);
    assert_eq!(output.reason, ReasonCode::R101_DELTA_APPLIED);
}

#[tokio::test]
async fn test_cheer_without_amount_is_ignored() {
    let mut engine = engine(GoalConfig {
        event_type: EventType::Cheer,
        ..Default::default()
    });

    assert!(engine.handle_event(&raw("cheer-latest", json!({}))).is_none());
    assert_eq!(engine.current(), 0.0);
}

#[tokio::test]
async fn test_mismatched_event_kind_ignored() {
    let mut engine = engine(GoalConfig {
        event_type: EventType::Donation,
        ..Default::default()
    });

    assert!(engine.handle_event(&raw("subscriber-latest", json!({}))).is_none());
    assert!(engine.handle_event(&raw("follower-latest", json!({}))).is_none());
    assert!(engine.handle_event(&raw("host-latest", json!({"amount": 5}))).is_none());
    assert_eq!(engine.current(), 0.0);
}

// =============================================================================
// Raise the target when reached
// =============================================================================

#[tokio::test]
async fn test_goal_raise_no_clamp() {
    let mut engine = engine(GoalConfig {
        starting_value: 95.0,
        target: 100.0,
        increase_after_goal_by: 50.0,
        ..Default::default()
    });

    let output = engine.apply_delta(10.0);

    assert_eq!(output.current, 105.0);
    assert_eq!(output.target, 150.0);
    assert_eq!(output.settled, GoalPhase::Accumulating);
}

// =============================================================================
// Reset when reached
// =============================================================================

#[tokio::test]
async fn test_goal_reset() {
    let mut engine = engine(GoalConfig {
        starting_value: 95.0,
        target: 100.0,
        reset_at_goal: true,
        increase_after_goal_by: 0.0,
        ..Default::default()
    });

    let output = engine.apply_delta(10.0);

    assert_eq!(output.current, 0.0);
    assert_eq!(output.target, 100.0);
    assert_eq!(output.reason, ReasonCode::R102_RESET_AT_GOAL);
}

// =============================================================================
// Stop at goal gates events but not direct commands
// =============================================================================

#[tokio::test]
async fn test_stop_at_goal_event_vs_set() {
    let mut engine = engine(GoalConfig {
        event_type: EventType::Donation,
        starting_value: 100.0,
        target: 100.0,
        stop_at_goal: true,
        ..Default::default()
    });

    let output = engine
        .handle_event(&raw("tip-latest", json!({"amount": 5})))
        .unwrap();
    assert_eq!(output.reason, ReasonCode::R101_DELTA_IGNORED_AT_GOAL);
    assert_eq!(engine.current(), 100.0);

    let set = engine.handle_event(&raw(
        "message",
        json!({"data": {"nick": "streamer", "channel": "streamer", "text": "!set 200"}}),
    ));
    assert_eq!(set.unwrap().current, 200.0);
    assert_eq!(engine.current(), 200.0);
}

// =============================================================================
// Sum of deltas
// =============================================================================

#[tokio::test]
async fn test_sum_of_deltas_below_goal() {
    let mut engine = engine(GoalConfig {
        starting_value: 2.0,
        target: 1_000_000.0,
        ..Default::default()
    });

    let deltas: Vec<f64> = (1..=50).map(|i| (i as f64) * 0.5).collect();
    for d in &deltas {
        engine.apply_delta(*d);
    }

    let expected = 2.0 + deltas.iter().sum::<f64>();
    assert_eq!(engine.current(), expected);
    assert_eq!(engine.update_count(), 50);
}

// =============================================================================
// Celebration ends on its own
// =============================================================================

#[tokio::test]
async fn test_live_updates_end_celebration() {
    let mut engine = engine(GoalConfig {
        starting_value: 98.0,
        ..Default::default()
    });
    let mut updates = engine.subscribe();

    engine.apply_delta(2.0);
    let hit = updates.recv().await.unwrap();
    let frame = RenderFrame::from_output(ArcPreset::Full, &hit, "");
    assert!(frame.celebrating);
    assert_eq!(frame.celebration_ms, CELEBRATION_DURATION_MS);

    let wait = Duration::from_millis(CELEBRATION_DURATION_MS * 3);
    let settled = timeout(wait, updates.recv()).await.unwrap().unwrap();
    let frame = RenderFrame::from_output(ArcPreset::Full, &settled, "");

    assert_eq!(settled.reason, ReasonCode::R104_CELEBRATION_ENDED);
    assert_eq!(settled.phase, GoalPhase::AtGoal);
    assert!(!frame.celebrating);
    assert!(!frame.animate);
    assert_eq!(engine.phase(), GoalPhase::AtGoal);
}
