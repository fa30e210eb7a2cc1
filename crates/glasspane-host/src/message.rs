//! Window-message decoding and routing.
//!
//! The message ids and operand packing here are the Win32 wire format.
//! They are plain numbers on every platform, so decoding is portable and
//! fully testable; nothing in this module touches the OS.

use glasspane_input::{InputEvent, InputManager, MouseButton, WindowId};
use tracing::trace;

use crate::raw;

const WM_INPUT: u32 = 0x00FF;
const WM_KEYDOWN: u32 = 0x0100;
const WM_KEYUP: u32 = 0x0101;
const WM_CHAR: u32 = 0x0102;
const WM_SYSKEYDOWN: u32 = 0x0104;
const WM_SYSKEYUP: u32 = 0x0105;
const WM_MOUSEMOVE: u32 = 0x0200;
const WM_LBUTTONDOWN: u32 = 0x0201;
const WM_LBUTTONUP: u32 = 0x0202;
const WM_LBUTTONDBLCLK: u32 = 0x0203;
const WM_RBUTTONDOWN: u32 = 0x0204;
const WM_RBUTTONUP: u32 = 0x0205;
const WM_RBUTTONDBLCLK: u32 = 0x0206;
const WM_MBUTTONDOWN: u32 = 0x0207;
const WM_MBUTTONUP: u32 = 0x0208;
const WM_MBUTTONDBLCLK: u32 = 0x0209;
const WM_MOUSEWHEEL: u32 = 0x020A;
const WM_XBUTTONDOWN: u32 = 0x020B;
const WM_XBUTTONUP: u32 = 0x020C;
const WM_XBUTTONDBLCLK: u32 = 0x020D;

/// One raw notch of a mouse wheel.
const WHEEL_DETENT: i32 = 120;

/// A raw window message, mirroring the fields of a Win32 `MSG`.
#[derive(Debug, Clone, Copy)]
pub struct WindowMessage {
    /// Target window the message was posted to.
    pub window: WindowId,
    /// Message identifier (`WM_*`).
    pub msg: u32,
    pub wparam: usize,
    pub lparam: isize,
}

/// Translate a window message into an input event.
///
/// Returns `None` for messages that carry no input (or characters that do
/// not decode, like unpaired surrogates). Double-clicks count as button
/// downs; the up between the clicks arrives as its own message.
pub fn decode(message: &WindowMessage) -> Option<InputEvent> {
    match message.msg {
        WM_KEYDOWN | WM_SYSKEYDOWN => Some(InputEvent::KeyDown {
            code: message.wparam as u32,
        }),
        WM_KEYUP | WM_SYSKEYUP => Some(InputEvent::KeyUp {
            code: message.wparam as u32,
        }),
        WM_CHAR => char::from_u32(message.wparam as u32).map(|ch| InputEvent::Char { ch }),
        WM_MOUSEMOVE => {
            let (x, y) = client_coords(message.lparam);
            Some(InputEvent::MouseMove { x, y })
        }
        WM_LBUTTONDOWN | WM_LBUTTONDBLCLK => Some(InputEvent::ButtonDown {
            button: MouseButton::Left,
        }),
        WM_LBUTTONUP => Some(InputEvent::ButtonUp {
            button: MouseButton::Left,
        }),
        WM_RBUTTONDOWN | WM_RBUTTONDBLCLK => Some(InputEvent::ButtonDown {
            button: MouseButton::Right,
        }),
        WM_RBUTTONUP => Some(InputEvent::ButtonUp {
            button: MouseButton::Right,
        }),
        WM_MBUTTONDOWN | WM_MBUTTONDBLCLK => Some(InputEvent::ButtonDown {
            button: MouseButton::Middle,
        }),
        WM_MBUTTONUP => Some(InputEvent::ButtonUp {
            button: MouseButton::Middle,
        }),
        WM_XBUTTONDOWN | WM_XBUTTONDBLCLK => {
            let button = x_button(message.wparam)?;
            Some(InputEvent::ButtonDown { button })
        }
        WM_XBUTTONUP => {
            let button = x_button(message.wparam)?;
            Some(InputEvent::ButtonUp { button })
        }
        WM_MOUSEWHEEL => Some(InputEvent::Wheel {
            delta: wheel_value(message.wparam) / WHEEL_DETENT,
        }),
        _ => None,
    }
}

/// Process one window message for the embedder's message loop.
///
/// Updates every tracker watching the message's window and returns `true`
/// when the loop should swallow the message instead of forwarding it to
/// the wrapped application. Raw input (`WM_INPUT`) is ingested but never
/// suppressed; blocking raw-enabled applications is done by disabling
/// their legacy messages at registration time instead.
pub fn handle_window_message(manager: &InputManager, message: &WindowMessage) -> bool {
    if message.msg == WM_INPUT {
        if let Some(packet) = raw::read_raw_packet(message.lparam) {
            raw::handle_raw_packet(manager, message.window, &packet);
        }
        return false;
    }

    match decode(message) {
        Some(event) => manager.dispatch(message.window, event),
        None => {
            trace!(msg = message.msg, "window message carries no input");
            false
        }
    }
}

/// Signed 16-bit client coordinates packed into lparam.
fn client_coords(lparam: isize) -> (i32, i32) {
    let x = (lparam & 0xFFFF) as u16 as i16 as i32;
    let y = ((lparam >> 16) & 0xFFFF) as u16 as i16 as i32;
    (x, y)
}

/// Signed wheel rotation from the high word of wparam, in raw 120-units.
fn wheel_value(wparam: usize) -> i32 {
    ((wparam >> 16) & 0xFFFF) as u16 as i16 as i32
}

/// Which extended button a `WM_XBUTTON*` message refers to.
fn x_button(wparam: usize) -> Option<MouseButton> {
    match (wparam >> 16) & 0xFFFF {
        1 => Some(MouseButton::X1),
        2 => Some(MouseButton::X2),
        _ => None,
    }
}
