//! Per-window input state tracking with frame-synchronized edge detection.
//!
//! A tracker reconciles two clocks: window messages arrive whenever the
//! message pump delivers them (often on a different thread), while the
//! consumer polls once per rendered frame. "Pressed this frame" and
//! "released this frame" are computed by comparing live state against a
//! snapshot taken at the last frame boundary, so queries are stable for the
//! whole frame no matter how many events arrive mid-frame.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::config::TrackerConfig;
use crate::event::{InputEvent, MouseButton, WindowId, MOUSE_BUTTON_COUNT};

/// Size of the keycode space.
pub const KEY_COUNT: usize = 256;

// Modifier virtual-key codes, shared with the Win32 wire format.
const VK_SHIFT: u32 = 0x10;
const VK_CONTROL: u32 = 0x11;
const VK_MENU: u32 = 0x12;

/// Tracks keyboard and mouse state for one target window.
///
/// All mutable state sits behind a single mutex. Every public operation
/// acquires it for its full duration, so an event is never observed
/// half-applied. Callers that need several queries to see one consistent
/// state acquire a scoped guard via [`lock`](Self::lock) and issue the
/// queries on the guard.
pub struct InputTracker {
    window: WindowId,
    state: Mutex<InputState>,
}

impl InputTracker {
    /// Create a tracker for `window` with the default configuration.
    pub fn new(window: WindowId) -> Self {
        Self::with_config(window, TrackerConfig::default())
    }

    /// Create a tracker for `window` with an explicit configuration.
    pub fn with_config(window: WindowId, config: TrackerConfig) -> Self {
        Self {
            window,
            state: Mutex::new(InputState::new(config.grace_period())),
        }
    }

    /// The window this tracker was registered for.
    pub fn window(&self) -> WindowId {
        self.window
    }

    /// Acquire the tracker lock for a multi-call atomic view.
    ///
    /// The guard exposes the full query surface and releases the lock when
    /// dropped. Keep it alive across the calls that must not interleave
    /// with ingestion or a frame advance.
    pub fn lock(&self) -> InputLock<'_> {
        InputLock {
            state: self.state.lock().unwrap(),
        }
    }

    /// Apply one raw event to the tracked state.
    ///
    /// Returns `true` when the message pump should swallow the event
    /// instead of forwarding it to the wrapped application. State is
    /// updated either way; blocking hides input from the application, not
    /// from the overlay.
    pub fn ingest(&self, event: InputEvent) -> bool {
        let suppress = self.state.lock().unwrap().apply(event);
        trace!(window = self.window.raw(), ?event, suppress, "event ingested");
        suppress
    }

    /// Record the cursor position the consumer explicitly set.
    ///
    /// While cursor immobilization is active, position queries report this
    /// value in place of the tracked hardware position.
    pub fn set_cursor_position(&self, x: i32, y: i32) {
        self.state.lock().unwrap().set_cursor_position = (x, y);
    }

    /// Advance the frame boundary.
    ///
    /// Snapshots current key/button/cursor state as the new prior state,
    /// clears the per-frame accumulators (wheel delta, text input, repeat
    /// notices) and increments the frame counter. Must be called exactly
    /// once per rendered frame by the frame driver.
    pub fn next_frame(&self) {
        self.state.lock().unwrap().advance_frame();
    }

    /// Prevent keyboard window messages from reaching the application.
    pub fn block_keyboard_input(&self, enable: bool) {
        if self.state.lock().unwrap().set_block_keyboard(enable) {
            debug!(window = self.window.raw(), enable, "keyboard blocking changed");
        }
    }

    /// Prevent mouse button and wheel messages from reaching the application.
    pub fn block_mouse_input(&self, enable: bool) {
        if self.state.lock().unwrap().set_block_mouse(enable) {
            debug!(window = self.window.raw(), enable, "mouse blocking changed");
        }
    }

    /// Freeze the cursor: mouse-move messages are swallowed and position
    /// queries report the last consumer-set position.
    pub fn immobilize_cursor(&self, enable: bool) {
        if self.state.lock().unwrap().set_immobilize_cursor(enable) {
            debug!(window = self.window.raw(), enable, "cursor immobilization changed");
        }
    }

    pub fn is_key_down(&self, keycode: u32) -> bool {
        self.lock().is_key_down(keycode)
    }

    pub fn is_key_pressed(&self, keycode: u32) -> bool {
        self.lock().is_key_pressed(keycode)
    }

    /// Modifier-aware press query; see [`InputState::is_key_pressed_with`].
    pub fn is_key_pressed_with(
        &self,
        keycode: u32,
        ctrl: bool,
        shift: bool,
        alt: bool,
        force_modifiers: bool,
    ) -> bool {
        self.lock()
            .is_key_pressed_with(keycode, ctrl, shift, alt, force_modifiers)
    }

    pub fn is_key_released(&self, keycode: u32) -> bool {
        self.lock().is_key_released(keycode)
    }

    pub fn is_key_repeated(&self, keycode: u32) -> bool {
        self.lock().is_key_repeated(keycode)
    }

    pub fn is_any_key_down(&self) -> bool {
        self.lock().is_any_key_down()
    }

    pub fn is_any_key_pressed(&self) -> bool {
        self.lock().is_any_key_pressed()
    }

    pub fn is_any_key_released(&self) -> bool {
        self.lock().is_any_key_released()
    }

    pub fn last_key_pressed(&self) -> u32 {
        self.lock().last_key_pressed()
    }

    pub fn last_key_released(&self) -> u32 {
        self.lock().last_key_released()
    }

    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.lock().is_mouse_button_down(button)
    }

    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.lock().is_mouse_button_pressed(button)
    }

    pub fn is_mouse_button_released(&self, button: MouseButton) -> bool {
        self.lock().is_mouse_button_released(button)
    }

    pub fn is_any_mouse_button_down(&self) -> bool {
        self.lock().is_any_mouse_button_down()
    }

    pub fn is_any_mouse_button_pressed(&self) -> bool {
        self.lock().is_any_mouse_button_pressed()
    }

    pub fn is_any_mouse_button_released(&self) -> bool {
        self.lock().is_any_mouse_button_released()
    }

    pub fn mouse_position(&self) -> (i32, i32) {
        self.lock().mouse_position()
    }

    pub fn mouse_position_x(&self) -> i32 {
        self.lock().mouse_position().0
    }

    pub fn mouse_position_y(&self) -> i32 {
        self.lock().mouse_position().1
    }

    pub fn mouse_movement_delta_x(&self) -> i32 {
        self.lock().mouse_movement_delta_x()
    }

    pub fn mouse_movement_delta_y(&self) -> i32 {
        self.lock().mouse_movement_delta_y()
    }

    pub fn mouse_wheel_delta(&self) -> i32 {
        self.lock().mouse_wheel_delta()
    }

    /// Character input accumulated since the last frame boundary.
    pub fn text_input(&self) -> String {
        self.lock().text_input().to_string()
    }

    pub fn frame_count(&self) -> u64 {
        self.lock().frame_count()
    }

    pub fn is_blocking_keyboard_input(&self) -> bool {
        self.lock().is_blocking_keyboard_input()
    }

    pub fn is_blocking_mouse_input(&self) -> bool {
        self.lock().is_blocking_mouse_input()
    }

    pub fn is_immobilizing_cursor(&self) -> bool {
        self.lock().is_immobilizing_cursor()
    }
}

/// RAII guard over a tracker's state, returned by [`InputTracker::lock`].
///
/// Dereferences to [`InputState`], so the whole query surface is available
/// while the guard is held.
pub struct InputLock<'a> {
    state: MutexGuard<'a, InputState>,
}

impl std::ops::Deref for InputLock<'_> {
    type Target = InputState;

    fn deref(&self) -> &InputState {
        &self.state
    }
}

/// The tracked state itself.
///
/// Only reachable through a tracker's lock; all methods here are read-only
/// queries against one consistent snapshot. Mutation happens exclusively
/// through the tracker's ingestion and frame-advance entry points.
pub struct InputState {
    keys: [bool; KEY_COUNT],
    prior_keys: [bool; KEY_COUNT],
    key_stamp: [u64; KEY_COUNT],
    repeats: [bool; KEY_COUNT],

    buttons: [bool; MOUSE_BUTTON_COUNT],
    prior_buttons: [bool; MOUSE_BUTTON_COUNT],
    button_stamp: [u64; MOUSE_BUTTON_COUNT],

    mouse_position: (i32, i32),
    prior_mouse_position: (i32, i32),
    set_cursor_position: (i32, i32),
    mouse_wheel_delta: i32,
    text_input: String,

    frame_counter: u64,
    // Monotonic per-tracker sequence stamped on every state transition.
    // Orders same-frame transitions exactly, which the frame counter cannot.
    event_sequence: u64,

    block_keyboard: bool,
    block_mouse: bool,
    immobilize_cursor: bool,
    block_keyboard_since: Option<Instant>,
    block_mouse_since: Option<Instant>,
    immobilize_cursor_since: Option<Instant>,
    grace_period: Duration,
}

impl InputState {
    fn new(grace_period: Duration) -> Self {
        Self {
            keys: [false; KEY_COUNT],
            prior_keys: [false; KEY_COUNT],
            key_stamp: [0; KEY_COUNT],
            repeats: [false; KEY_COUNT],
            buttons: [false; MOUSE_BUTTON_COUNT],
            prior_buttons: [false; MOUSE_BUTTON_COUNT],
            button_stamp: [0; MOUSE_BUTTON_COUNT],
            mouse_position: (0, 0),
            prior_mouse_position: (0, 0),
            set_cursor_position: (0, 0),
            mouse_wheel_delta: 0,
            text_input: String::new(),
            frame_counter: 0,
            event_sequence: 0,
            block_keyboard: false,
            block_mouse: false,
            immobilize_cursor: false,
            block_keyboard_since: None,
            block_mouse_since: None,
            immobilize_cursor_since: None,
            grace_period,
        }
    }

    fn next_stamp(&mut self) -> u64 {
        self.event_sequence += 1;
        self.event_sequence
    }

    fn apply(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::KeyDown { code } => {
                let Some(slot) = key_slot(code) else {
                    return false;
                };
                if self.keys[slot] {
                    // OS key-repeat for a held key: state unchanged, but
                    // observable through is_key_repeated until the next
                    // frame boundary.
                    self.repeats[slot] = true;
                } else {
                    self.keys[slot] = true;
                    self.key_stamp[slot] = self.next_stamp();
                }
                self.is_blocking_keyboard_input()
            }
            InputEvent::KeyUp { code } => {
                let Some(slot) = key_slot(code) else {
                    return false;
                };
                if self.keys[slot] {
                    self.keys[slot] = false;
                    self.key_stamp[slot] = self.next_stamp();
                }
                self.repeats[slot] = false;
                self.is_blocking_keyboard_input()
            }
            InputEvent::Char { ch } => {
                self.text_input.push(ch);
                self.is_blocking_keyboard_input()
            }
            InputEvent::MouseMove { x, y } => {
                // The prior position moves only at the frame boundary, so
                // movement deltas mean "since the last frame the consumer
                // observed".
                self.mouse_position = (x, y);
                self.is_immobilizing_cursor()
            }
            InputEvent::ButtonDown { button } => {
                let slot = button.index();
                if !self.buttons[slot] {
                    self.buttons[slot] = true;
                    self.button_stamp[slot] = self.next_stamp();
                }
                self.is_blocking_mouse_input()
            }
            InputEvent::ButtonUp { button } => {
                let slot = button.index();
                if self.buttons[slot] {
                    self.buttons[slot] = false;
                    self.button_stamp[slot] = self.next_stamp();
                }
                self.is_blocking_mouse_input()
            }
            InputEvent::Wheel { delta } => {
                self.mouse_wheel_delta += delta;
                self.is_blocking_mouse_input()
            }
        }
    }

    fn advance_frame(&mut self) {
        self.prior_keys = self.keys;
        self.prior_buttons = self.buttons;
        self.prior_mouse_position = self.mouse_position;
        self.repeats = [false; KEY_COUNT];
        self.mouse_wheel_delta = 0;
        self.text_input.clear();
        self.frame_counter += 1;
    }

    fn set_block_keyboard(&mut self, enable: bool) -> bool {
        if self.block_keyboard == enable {
            return false;
        }
        self.block_keyboard = enable;
        self.block_keyboard_since = Some(Instant::now());
        true
    }

    fn set_block_mouse(&mut self, enable: bool) -> bool {
        if self.block_mouse == enable {
            return false;
        }
        self.block_mouse = enable;
        self.block_mouse_since = Some(Instant::now());
        true
    }

    fn set_immobilize_cursor(&mut self, enable: bool) -> bool {
        if self.immobilize_cursor == enable {
            return false;
        }
        self.immobilize_cursor = enable;
        self.immobilize_cursor_since = Some(Instant::now());
        true
    }

    fn within_grace(&self, since: Option<Instant>) -> bool {
        since.is_some_and(|at| at.elapsed() < self.grace_period)
    }

    /// Whether the key is currently held.
    pub fn is_key_down(&self, keycode: u32) -> bool {
        key_slot(keycode).is_some_and(|slot| self.keys[slot])
    }

    /// Whether the key went down between the last two frame boundaries.
    pub fn is_key_pressed(&self, keycode: u32) -> bool {
        key_slot(keycode).is_some_and(|slot| self.keys[slot] && !self.prior_keys[slot])
    }

    /// Whether the key went up between the last two frame boundaries.
    pub fn is_key_released(&self, keycode: u32) -> bool {
        key_slot(keycode).is_some_and(|slot| !self.keys[slot] && self.prior_keys[slot])
    }

    /// Whether the OS auto-repeated the held key since the last boundary.
    pub fn is_key_repeated(&self, keycode: u32) -> bool {
        key_slot(keycode).is_some_and(|slot| self.repeats[slot])
    }

    /// Press query with modifier requirements.
    ///
    /// With `force_modifiers` the held modifier set must match the request
    /// exactly; a held modifier that was not asked for fails the match.
    /// Without it, requested modifiers must be held and the rest are
    /// ignored. Keycode 0 is reserved as "no key" and never matches.
    pub fn is_key_pressed_with(
        &self,
        keycode: u32,
        ctrl: bool,
        shift: bool,
        alt: bool,
        force_modifiers: bool,
    ) -> bool {
        if keycode == 0 {
            return false;
        }
        let pressed = self.is_key_pressed(keycode);
        let ctrl_down = self.is_key_down(VK_CONTROL);
        let shift_down = self.is_key_down(VK_SHIFT);
        let alt_down = self.is_key_down(VK_MENU);

        if force_modifiers {
            pressed && ctrl == ctrl_down && shift == shift_down && alt == alt_down
        } else {
            pressed && (!ctrl || ctrl_down) && (!shift || shift_down) && (!alt || alt_down)
        }
    }

    pub fn is_any_key_down(&self) -> bool {
        self.keys.iter().any(|&down| down)
    }

    pub fn is_any_key_pressed(&self) -> bool {
        (0..KEY_COUNT).any(|slot| self.keys[slot] && !self.prior_keys[slot])
    }

    pub fn is_any_key_released(&self) -> bool {
        (0..KEY_COUNT).any(|slot| !self.keys[slot] && self.prior_keys[slot])
    }

    /// The keycode pressed most recently this frame, or 0 if none.
    ///
    /// Ties between keys pressed in the same frame resolve to the one
    /// ingested last.
    pub fn last_key_pressed(&self) -> u32 {
        let mut best = 0u32;
        let mut best_stamp = 0u64;
        for slot in 0..KEY_COUNT {
            if self.keys[slot] && !self.prior_keys[slot] && self.key_stamp[slot] > best_stamp {
                best = slot as u32;
                best_stamp = self.key_stamp[slot];
            }
        }
        best
    }

    /// The keycode released most recently this frame, or 0 if none.
    pub fn last_key_released(&self) -> u32 {
        let mut best = 0u32;
        let mut best_stamp = 0u64;
        for slot in 0..KEY_COUNT {
            if !self.keys[slot] && self.prior_keys[slot] && self.key_stamp[slot] > best_stamp {
                best = slot as u32;
                best_stamp = self.key_stamp[slot];
            }
        }
        best
    }

    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.buttons[button.index()]
    }

    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        let slot = button.index();
        self.buttons[slot] && !self.prior_buttons[slot]
    }

    pub fn is_mouse_button_released(&self, button: MouseButton) -> bool {
        let slot = button.index();
        !self.buttons[slot] && self.prior_buttons[slot]
    }

    pub fn is_any_mouse_button_down(&self) -> bool {
        self.buttons.iter().any(|&down| down)
    }

    pub fn is_any_mouse_button_pressed(&self) -> bool {
        (0..MOUSE_BUTTON_COUNT).any(|slot| self.buttons[slot] && !self.prior_buttons[slot])
    }

    pub fn is_any_mouse_button_released(&self) -> bool {
        (0..MOUSE_BUTTON_COUNT).any(|slot| !self.buttons[slot] && self.prior_buttons[slot])
    }

    /// Current cursor position.
    ///
    /// While cursor immobilization is active this is the last position the
    /// consumer explicitly set, so polling code sees a frozen cursor.
    pub fn mouse_position(&self) -> (i32, i32) {
        if self.is_immobilizing_cursor() {
            self.set_cursor_position
        } else {
            self.mouse_position
        }
    }

    /// Horizontal cursor travel since the last frame boundary.
    pub fn mouse_movement_delta_x(&self) -> i32 {
        self.mouse_position.0 - self.prior_mouse_position.0
    }

    /// Vertical cursor travel since the last frame boundary.
    pub fn mouse_movement_delta_y(&self) -> i32 {
        self.mouse_position.1 - self.prior_mouse_position.1
    }

    /// Wheel detents accumulated since the last frame boundary.
    pub fn mouse_wheel_delta(&self) -> i32 {
        self.mouse_wheel_delta
    }

    /// Character input accumulated since the last frame boundary.
    pub fn text_input(&self) -> &str {
        &self.text_input
    }

    /// Number of frame boundaries seen so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    /// Whether keyboard messages are currently withheld from the
    /// application, including the grace period after the block is lifted.
    pub fn is_blocking_keyboard_input(&self) -> bool {
        self.block_keyboard || self.within_grace(self.block_keyboard_since)
    }

    /// Mouse counterpart of [`is_blocking_keyboard_input`](Self::is_blocking_keyboard_input).
    pub fn is_blocking_mouse_input(&self) -> bool {
        self.block_mouse || self.within_grace(self.block_mouse_since)
    }

    /// Whether the cursor is frozen, including the grace period after
    /// immobilization is lifted.
    pub fn is_immobilizing_cursor(&self) -> bool {
        self.immobilize_cursor || self.within_grace(self.immobilize_cursor_since)
    }
}

fn key_slot(keycode: u32) -> Option<usize> {
    let slot = keycode as usize;
    if slot < KEY_COUNT {
        Some(slot)
    } else {
        trace!(keycode, "keycode outside tracked range, dropped");
        None
    }
}
