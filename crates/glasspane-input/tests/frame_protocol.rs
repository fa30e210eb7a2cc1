//! End-to-end tests for the frame-advance protocol, blocking grace
//! periods and the thread-safety contract.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use glasspane_common::{try_init, LogConfig};
use glasspane_input::{
    InputEvent, InputManager, InputTracker, MouseButton, TrackerConfig, WindowId,
};

fn init_logs() {
    let _ = try_init(LogConfig::default());
}

fn tracker_with_grace(grace_period_ms: u64) -> InputTracker {
    InputTracker::with_config(WindowId::new(1), TrackerConfig { grace_period_ms })
}

#[test]
fn test_pressed_requires_a_down_between_advances() {
    init_logs();
    let input = InputTracker::new(WindowId::new(1));

    // Down ingested before an advance: pressed for exactly one frame.
    input.ingest(InputEvent::KeyDown { code: 0x31 });
    input.next_frame();
    assert!(input.is_key_pressed(0x31));
    input.next_frame();
    assert!(!input.is_key_pressed(0x31));

    // No event between two advances: nothing is pressed.
    input.next_frame();
    for code in 0..256u32 {
        assert!(!input.is_key_pressed(code));
    }

    // A down for an already-held key is not a new edge.
    input.ingest(InputEvent::KeyDown { code: 0x31 });
    input.next_frame();
    assert!(!input.is_key_pressed(0x31));
    assert!(input.is_key_repeated(0x31));
}

#[test]
fn test_skipped_advance_collapses_frames() {
    let input = InputTracker::new(WindowId::new(1));

    input.ingest(InputEvent::KeyDown { code: 0x41 });
    input.ingest(InputEvent::KeyUp { code: 0x41 });
    input.ingest(InputEvent::KeyDown { code: 0x42 });
    input.next_frame();

    // Two "frames" worth of input observed through one boundary: the
    // A press/release cancels out, only B survives as an edge.
    assert!(!input.is_key_pressed(0x41));
    assert!(input.is_key_pressed(0x42));
}

#[test]
fn test_blocking_grace_period_outlives_the_flag() {
    init_logs();
    let input = tracker_with_grace(50);

    input.block_keyboard_input(true);
    assert!(input.is_blocking_keyboard_input());

    input.block_keyboard_input(false);
    // Within the grace period the block still reads as active.
    assert!(input.is_blocking_keyboard_input());
    assert!(input.ingest(InputEvent::KeyDown { code: 0x41 }));

    thread::sleep(Duration::from_millis(150));
    assert!(!input.is_blocking_keyboard_input());
    assert!(!input.ingest(InputEvent::KeyDown { code: 0x42 }));
}

#[test]
fn test_default_grace_period_applies_after_unblock() {
    // With the stock 125 ms configuration, the moment after lifting a
    // block must still read as blocked.
    let input = InputTracker::new(WindowId::new(1));
    input.block_mouse_input(true);
    input.block_mouse_input(false);
    assert!(input.is_blocking_mouse_input());
}

#[test]
fn test_immobilization_round_trip() {
    let input = tracker_with_grace(50);

    input.ingest(InputEvent::MouseMove { x: 10, y: 20 });
    input.set_cursor_position(640, 360);
    input.immobilize_cursor(true);

    // Hardware motion keeps arriving but the frozen position is reported.
    assert!(input.ingest(InputEvent::MouseMove { x: 500, y: 500 }));
    assert_eq!(input.mouse_position(), (640, 360));

    input.immobilize_cursor(false);
    // Still frozen during the grace period.
    assert!(input.is_immobilizing_cursor());
    assert_eq!(input.mouse_position(), (640, 360));

    thread::sleep(Duration::from_millis(150));
    assert!(!input.is_immobilizing_cursor());
    assert_eq!(input.mouse_position(), (500, 500));
    assert!(!input.ingest(InputEvent::MouseMove { x: 501, y: 500 }));
}

#[test]
fn test_same_frame_tie_break_follows_ingestion_order() {
    let manager = InputManager::new();
    let tracker = manager.register_window(WindowId::new(1));

    manager.dispatch(WindowId::new(1), InputEvent::KeyDown { code: 0x70 });
    manager.dispatch(WindowId::new(1), InputEvent::KeyDown { code: 0x42 });
    manager.dispatch(WindowId::new(1), InputEvent::KeyDown { code: 0x33 });
    tracker.next_frame();

    assert_eq!(tracker.last_key_pressed(), 0x33);

    manager.dispatch(WindowId::new(1), InputEvent::KeyUp { code: 0x33 });
    manager.dispatch(WindowId::new(1), InputEvent::KeyUp { code: 0x70 });
    tracker.next_frame();
    assert_eq!(tracker.last_key_released(), 0x70);
}

#[test]
fn test_concurrent_ingestion_never_tears_state() {
    init_logs();
    let input = Arc::new(InputTracker::new(WindowId::new(1)));

    // Writer keeps the x == -y invariant on every single event; any torn
    // read on the reader side breaks it.
    let writer = {
        let input = Arc::clone(&input);
        thread::spawn(move || {
            for i in 0..20_000i32 {
                input.ingest(InputEvent::MouseMove { x: i, y: -i });
                input.ingest(InputEvent::KeyDown { code: 0x41 });
                input.ingest(InputEvent::KeyUp { code: 0x41 });
            }
        })
    };

    let reader = {
        let input = Arc::clone(&input);
        thread::spawn(move || {
            for _ in 0..20_000 {
                let (x, y) = input.mouse_position();
                assert_eq!(x, -y, "torn mouse position read");
            }
        })
    };

    let advancer = {
        let input = Arc::clone(&input);
        thread::spawn(move || {
            for _ in 0..500 {
                input.next_frame();
                // Edge queries must agree with the guard-held snapshot.
                let guard = input.lock();
                if guard.is_key_pressed(0x41) {
                    assert!(guard.is_key_down(0x41));
                }
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
    advancer.join().unwrap();

    let (x, y) = input.mouse_position();
    assert_eq!(x, -y);
}

#[test]
fn test_wildcard_tracker_sees_all_windows() {
    let manager = InputManager::new();
    let wildcard = manager.register_window(WindowId::ANY);

    manager.dispatch(WindowId::new(11), InputEvent::Wheel { delta: 2 });
    manager.dispatch(
        WindowId::new(22),
        InputEvent::ButtonDown {
            button: MouseButton::X1,
        },
    );

    assert_eq!(wildcard.mouse_wheel_delta(), 2);
    assert!(wildcard.is_mouse_button_down(MouseButton::X1));
}
