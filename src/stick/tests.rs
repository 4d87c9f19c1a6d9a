//! Scenario tests for the touch stick

use super::*;
use crate::config::{StickConfig, StickSettings};
use anyhow::anyhow;

const EPS: f64 = 1e-9;

/// travel 80, deadzone radius 24
fn make_test_config() -> StickConfig {
    let settings = StickSettings {
        deadzone_percentage: 40,
        double_click_window_ms: 350,
        deadzone_release_ms: 150,
    };
    StickConfig::new(100.0, 20.0, &settings).unwrap()
}

fn make_test_stick() -> (AnalogStick, EventRecorder) {
    let recorder = EventRecorder::new();
    let mut stick = AnalogStick::new(make_test_config());
    stick.add_listener(recorder.clone());
    (stick, recorder)
}

fn movements(events: &[StickEvent]) -> Vec<(f64, f64)> {
    events
        .iter()
        .filter_map(|e| match e {
            StickEvent::Movement { x, y } => Some((*x, *y)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_initial_state() {
    let (stick, recorder) = make_test_stick();

    assert_eq!(stick.stick_state(), StickState::AtRest);
    assert_eq!(stick.click_state(), ClickState::Single);
    assert!(!stick.is_pressed());
    assert_eq!(stick.handle_position(), None);
    assert_eq!(stick.vector(), (0.0, 0.0));
    assert!(recorder.events().is_empty());
}

#[test]
fn test_press_then_release_without_movement() {
    let (mut stick, recorder) = make_test_stick();

    assert!(stick.press(0, 200.0, 300.0, 1_000));
    assert_eq!(stick.stick_state(), StickState::MovedInDeadzone);
    assert_eq!(stick.anchor(), Some(Point::new(200.0, 300.0)));
    assert_eq!(stick.handle_position(), Some(Point::new(200.0, 300.0)));

    assert!(stick.release(0));
    assert_eq!(stick.stick_state(), StickState::AtRest);
    assert_eq!(
        recorder.events(),
        vec![
            StickEvent::Click,
            StickEvent::Revoke,
            StickEvent::Movement { x: 0.0, y: 0.0 },
        ]
    );
}

#[test]
fn test_first_press_is_single_click() {
    // the very first press is never a double click, even at timestamp 0
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 0.0, 0.0, 0);
    assert_eq!(recorder.events(), vec![StickEvent::Click]);
}

#[test]
fn test_double_click_within_window() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 50.0, 50.0, 1_000);
    stick.release(0);
    stick.press(0, 50.0, 50.0, 1_100);

    assert_eq!(stick.click_state(), ClickState::Double);
    assert!(stick.is_double_click_held());
    assert_eq!(
        recorder.events(),
        vec![
            StickEvent::Click,
            StickEvent::Revoke,
            StickEvent::Movement { x: 0.0, y: 0.0 },
            StickEvent::DoubleClick,
        ]
    );
}

#[test]
fn test_presses_outside_window_are_single_clicks() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 50.0, 50.0, 1_000);
    stick.release(0);
    stick.press(0, 50.0, 50.0, 1_500);

    assert_eq!(stick.click_state(), ClickState::Single);
    let clicks: Vec<_> = recorder
        .events()
        .into_iter()
        .filter(|e| matches!(e, StickEvent::Click | StickEvent::DoubleClick))
        .collect();
    assert_eq!(clicks, vec![StickEvent::Click, StickEvent::Click]);
}

#[test]
fn test_third_rapid_press_starts_fresh_window() {
    let (mut stick, recorder) = make_test_stick();

    for t in [1_000, 1_100, 1_200, 1_300] {
        stick.press(0, 50.0, 50.0, t);
        stick.release(0);
    }

    let clicks: Vec<_> = recorder
        .events()
        .into_iter()
        .filter(|e| matches!(e, StickEvent::Click | StickEvent::DoubleClick))
        .collect();
    assert_eq!(
        clicks,
        vec![
            StickEvent::Click,
            StickEvent::DoubleClick,
            StickEvent::Click,
            StickEvent::DoubleClick,
        ]
    );
}

#[test]
fn test_deadzone_suppresses_small_early_movement() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 100.0, 100.0, 1_000);
    recorder.take();

    // 12 units right: half the deadzone radius, 50 ms into the press
    assert!(stick.move_to(0, 112.0, 100.0, 1_050));
    assert_eq!(stick.stick_state(), StickState::MovedInDeadzone);
    assert!(recorder.events().is_empty());
    // the handle still follows the finger
    assert_eq!(stick.handle_position(), Some(Point::new(112.0, 100.0)));
}

#[test]
fn test_held_press_lifts_deadzone() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 100.0, 100.0, 1_000);
    recorder.take();

    stick.move_to(0, 112.0, 100.0, 1_200);
    assert_eq!(stick.stick_state(), StickState::MovedActive);

    let moved = movements(&recorder.events());
    assert_eq!(moved.len(), 1);
    let (x, y) = moved[0];
    assert!((x - 12.0 / 80.0).abs() < EPS, "x = {}", x);
    assert!(y.abs() < EPS, "y = {}", y);
}

#[test]
fn test_deadzone_release_boundary_is_inclusive() {
    let (mut stick, _recorder) = make_test_stick();

    stick.press(0, 100.0, 100.0, 1_000);
    stick.move_to(0, 101.0, 100.0, 1_149);
    assert_eq!(stick.stick_state(), StickState::MovedInDeadzone);

    stick.move_to(0, 101.0, 100.0, 1_150);
    assert_eq!(stick.stick_state(), StickState::MovedActive);
}

#[test]
fn test_leaving_deadzone_activates() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 100.0, 100.0, 1_000);
    recorder.take();

    // 40 units up, well outside the 24 unit deadzone
    stick.move_to(0, 100.0, 60.0, 1_010);
    assert_eq!(stick.stick_state(), StickState::MovedActive);

    let moved = movements(&recorder.events());
    assert_eq!(moved.len(), 1);
    let (x, y) = moved[0];
    assert!(x.abs() < EPS);
    assert!((y - 0.5).abs() < EPS);
    assert_eq!(stick.vector(), (x, y));
}

#[test]
fn test_active_state_is_sticky() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 100.0, 100.0, 1_000);
    stick.move_to(0, 150.0, 100.0, 1_010);
    assert_eq!(stick.stick_state(), StickState::MovedActive);
    recorder.take();

    // back to the anchor, still inside the release timeout
    stick.move_to(0, 100.0, 100.0, 1_020);
    assert_eq!(stick.stick_state(), StickState::MovedActive);
    assert_eq!(recorder.events(), vec![StickEvent::Movement { x: 0.0, y: 0.0 }]);
}

#[test]
fn test_movement_is_clamped_to_travel() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 100.0, 100.0, 1_000);
    stick.move_to(0, 400.0, 100.0, 1_010);

    let (x, y) = movements(&recorder.events())[0];
    assert!((x - 1.0).abs() < EPS);
    assert!(y.abs() < EPS);

    // handle stops at the edge of travel
    let handle = stick.handle_position().unwrap();
    assert!((handle.x - 180.0).abs() < 1e-3, "handle.x = {}", handle.x);
    assert!((handle.y - 100.0).abs() < 1e-3, "handle.y = {}", handle.y);
}

#[test]
fn test_diagonal_movement_directions() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 100.0, 100.0, 1_000);
    // 30 left, 40 down: radius 50
    stick.move_to(0, 70.0, 140.0, 1_010);

    let (x, y) = movements(&recorder.events())[0];
    assert!((x + 30.0 / 80.0).abs() < 1e-6, "x = {}", x);
    assert!((y + 40.0 / 80.0).abs() < 1e-6, "y = {}", y);

    let handle = stick.handle_position().unwrap();
    assert!((handle.x - 70.0).abs() < 1e-3);
    assert!((handle.y - 140.0).abs() < 1e-3);
}

#[test]
fn test_move_before_press_is_ignored() {
    let (mut stick, recorder) = make_test_stick();

    assert!(!stick.move_to(0, 10.0, 10.0, 1_000));
    assert_eq!(stick.stick_state(), StickState::AtRest);
    assert!(recorder.events().is_empty());
}

#[test]
fn test_release_is_idempotent() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 10.0, 10.0, 1_000);
    assert!(stick.release(0));
    recorder.take();

    assert!(!stick.release(0));
    assert!(!stick.release(7));
    assert_eq!(stick.stick_state(), StickState::AtRest);
    assert!(recorder.events().is_empty());
}

#[test]
fn test_second_pointer_is_isolated() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 100.0, 100.0, 1_000);
    recorder.take();

    assert!(!stick.press(1, 300.0, 300.0, 1_050));
    assert_eq!(stick.anchor(), Some(Point::new(100.0, 100.0)));

    assert!(!stick.move_to(1, 350.0, 300.0, 1_300));
    assert_eq!(stick.stick_state(), StickState::MovedInDeadzone);

    assert!(!stick.release(1));
    assert!(stick.is_pressed());
    assert!(recorder.events().is_empty());

    // the owner still drives the stick
    stick.move_to(0, 150.0, 100.0, 1_310);
    assert_eq!(movements(&recorder.events()).len(), 1);
}

#[test]
fn test_repeated_press_from_owner_is_noop() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 100.0, 100.0, 1_000);
    assert!(stick.press(0, 120.0, 120.0, 1_050));

    assert_eq!(stick.anchor(), Some(Point::new(100.0, 100.0)));
    assert_eq!(recorder.events(), vec![StickEvent::Click]);
}

#[test]
fn test_new_pointer_can_take_over_after_release() {
    let (mut stick, _recorder) = make_test_stick();

    stick.press(0, 100.0, 100.0, 1_000);
    stick.release(0);

    assert!(stick.press(5, 10.0, 20.0, 2_000));
    assert_eq!(stick.session().map(|s| s.owning_pointer_id), Some(5));
    assert_eq!(stick.anchor(), Some(Point::new(10.0, 20.0)));
}

#[test]
fn test_release_resets_state() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 100.0, 100.0, 1_000);
    stick.move_to(0, 160.0, 100.0, 1_010);
    recorder.take();

    stick.release(0);
    assert_eq!(stick.stick_state(), StickState::AtRest);
    assert_eq!(stick.vector(), (0.0, 0.0));
    assert_eq!(stick.handle_position(), None);
    assert_eq!(
        recorder.events(),
        vec![StickEvent::Revoke, StickEvent::Movement { x: 0.0, y: 0.0 }]
    );
}

#[test]
fn test_dispose_revokes_active_session() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 100.0, 100.0, 1_000);
    stick.move_to(0, 160.0, 100.0, 1_010);
    recorder.take();

    stick.dispose();
    assert_eq!(
        recorder.events(),
        vec![StickEvent::Revoke, StickEvent::Movement { x: 0.0, y: 0.0 }]
    );
    assert_eq!(stick.listener_count(), 0);
}

#[test]
fn test_drop_revokes_active_session() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 100.0, 100.0, 1_000);
    recorder.take();

    drop(stick);
    assert_eq!(
        recorder.events(),
        vec![StickEvent::Revoke, StickEvent::Movement { x: 0.0, y: 0.0 }]
    );
}

#[test]
fn test_dispose_at_rest_emits_nothing() {
    let (mut stick, recorder) = make_test_stick();

    stick.dispose();
    assert!(recorder.events().is_empty());
}

#[test]
fn test_failing_listener_does_not_corrupt_state() {
    let recorder = EventRecorder::new();
    let mut stick = AnalogStick::new(make_test_config());
    stick.add_listener(FnListener::new(|_event| Err(anyhow!("downstream closed"))));
    stick.add_listener(recorder.clone());

    stick.press(0, 100.0, 100.0, 1_000);
    stick.release(0);

    assert_eq!(stick.stick_state(), StickState::AtRest);
    assert_eq!(recorder.events().len(), 3);
    assert_eq!(stick.failed_deliveries(), 3);
}

#[test]
fn test_handle_dispatches_pointer_events() {
    let (mut stick, recorder) = make_test_stick();

    let script = [
        PointerEvent::Press { pointer: 2, x: 0.0, y: 0.0, at_ms: 0 },
        PointerEvent::Move { pointer: 2, x: -80.0, y: 0.0, at_ms: 10 },
        PointerEvent::Release { pointer: 2 },
    ];
    for event in &script {
        assert!(stick.handle(event));
    }

    let events = recorder.events();
    assert_eq!(events[0], StickEvent::Click);
    let (x, y) = movements(&events)[0];
    assert!((x + 1.0).abs() < EPS && y.abs() < EPS);
    assert_eq!(events[events.len() - 2], StickEvent::Revoke);
}

#[test]
fn test_zero_deadzone_activates_on_any_displacement() {
    let settings = StickSettings {
        deadzone_percentage: 0,
        ..Default::default()
    };
    let recorder = EventRecorder::new();
    let mut stick = AnalogStick::new(StickConfig::new(100.0, 20.0, &settings).unwrap());
    stick.add_listener(recorder.clone());

    stick.press(0, 100.0, 100.0, 1_000);
    stick.move_to(0, 100.0, 100.0, 1_001);
    assert_eq!(stick.stick_state(), StickState::MovedInDeadzone);

    stick.move_to(0, 100.5, 100.0, 1_002);
    assert_eq!(stick.stick_state(), StickState::MovedActive);
}

#[test]
fn test_non_finite_move_is_ignored() {
    let (mut stick, recorder) = make_test_stick();

    stick.press(0, 0.0, 0.0, 1_000);
    recorder.take();

    assert!(!stick.move_to(0, f32::INFINITY, f32::INFINITY, 1_010));
    assert!(!stick.move_to(0, f32::NAN, 100.0, 1_200));
    assert!(!stick.move_to(0, 10.0, f32::NEG_INFINITY, 1_300));

    assert_eq!(stick.stick_state(), StickState::MovedInDeadzone);
    assert_eq!(stick.handle_position(), Some(Point::new(0.0, 0.0)));
    assert!(recorder.events().is_empty());

    // a finite move afterwards still reports an in-range vector
    stick.move_to(0, 400.0, 0.0, 1_310);
    let (x, y) = movements(&recorder.events())[0];
    assert!((x - 1.0).abs() < EPS && y.abs() < EPS);
}

#[test]
fn test_non_finite_press_is_ignored() {
    let (mut stick, recorder) = make_test_stick();

    assert!(!stick.press(0, f32::NAN, 0.0, 1_000));
    assert!(!stick.press(0, 0.0, f32::INFINITY, 1_000));

    assert_eq!(stick.stick_state(), StickState::AtRest);
    assert!(!stick.is_pressed());
    assert!(recorder.events().is_empty());

    // the rejected presses do not count towards a double click
    stick.press(0, 0.0, 0.0, 1_050);
    assert_eq!(recorder.events(), vec![StickEvent::Click]);
}

#[test]
fn test_drop_during_unwind_skips_listeners() {
    let recorder = EventRecorder::new();
    let mut stick = AnalogStick::new(make_test_config());
    stick.add_listener(FnListener::new(|event| match event {
        StickEvent::Revoke => panic!("listener bug"),
        _ => Ok(()),
    }));
    stick.add_listener(recorder.clone());

    stick.press(0, 100.0, 100.0, 1_000);
    recorder.take();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
        let _stick = stick;
        panic!("host failure");
    }));

    assert!(outcome.is_err());
    assert!(recorder.events().is_empty());
}
