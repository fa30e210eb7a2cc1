//! Raw input registration and packet translation.
//!
//! Raw input bypasses the legacy message queue, so applications that
//! disable legacy messages at registration time still feed the tracker.
//! The packet layout (virtual key, break flag, relative motion, button
//! transition mask) is portable data; only reading a packet out of an OS
//! handle and the device registration call are Windows-specific.

use std::sync::Arc;

use glasspane_input::{InputEvent, InputManager, InputTracker, MouseButton, WindowId};
use tracing::{debug, trace};

use crate::HostError;

// RAWMOUSE button transition flags.
const RI_MOUSE_LEFT_DOWN: u16 = 0x0001;
const RI_MOUSE_LEFT_UP: u16 = 0x0002;
const RI_MOUSE_RIGHT_DOWN: u16 = 0x0004;
const RI_MOUSE_RIGHT_UP: u16 = 0x0008;
const RI_MOUSE_MIDDLE_DOWN: u16 = 0x0010;
const RI_MOUSE_MIDDLE_UP: u16 = 0x0020;
const RI_MOUSE_X1_DOWN: u16 = 0x0040;
const RI_MOUSE_X1_UP: u16 = 0x0080;
const RI_MOUSE_X2_DOWN: u16 = 0x0100;
const RI_MOUSE_X2_UP: u16 = 0x0200;
const RI_MOUSE_WHEEL: u16 = 0x0400;

/// One raw notch of a mouse wheel.
const WHEEL_DETENT: i32 = 120;

/// Registration options for a window's raw input devices.
///
/// Disabling legacy messages keeps the OS from also delivering the
/// corresponding `WM_KEY*`/`WM_*BUTTON*` traffic to the application,
/// which is how input is withheld from raw-aware applications.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawInputOptions {
    /// Do not generate legacy keyboard messages for this window.
    pub no_legacy_keyboard: bool,
    /// Do not generate legacy mouse messages for this window.
    pub no_legacy_mouse: bool,
}

/// A decoded raw input packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawPacket {
    Keyboard {
        /// Virtual key code reported by the device.
        vkey: u32,
        /// Whether this is a key release.
        released: bool,
    },
    Mouse {
        /// Relative horizontal motion.
        dx: i32,
        /// Relative vertical motion.
        dy: i32,
        /// `RI_MOUSE_*` button transition mask.
        button_flags: u16,
        /// Raw wheel rotation in 120-units, when `RI_MOUSE_WHEEL` is set.
        wheel: i32,
    },
}

/// Translate one raw packet into tracker events.
///
/// Raw mouse motion is relative; `base` is the currently tracked cursor
/// position it gets applied on top of. Devices can report a key code of
/// 0xFF for overrun conditions; such packets produce no events.
pub fn packet_events(packet: &RawPacket, base: (i32, i32)) -> Vec<InputEvent> {
    let mut events = Vec::new();
    match *packet {
        RawPacket::Keyboard { vkey, released } => {
            if vkey == 0xFF {
                trace!("keyboard overrun packet dropped");
            } else if released {
                events.push(InputEvent::KeyUp { code: vkey });
            } else {
                events.push(InputEvent::KeyDown { code: vkey });
            }
        }
        RawPacket::Mouse {
            dx,
            dy,
            button_flags,
            wheel,
        } => {
            if dx != 0 || dy != 0 {
                events.push(InputEvent::MouseMove {
                    x: base.0 + dx,
                    y: base.1 + dy,
                });
            }

            let transitions: [(u16, InputEvent); 10] = [
                (RI_MOUSE_LEFT_DOWN, down(MouseButton::Left)),
                (RI_MOUSE_LEFT_UP, up(MouseButton::Left)),
                (RI_MOUSE_RIGHT_DOWN, down(MouseButton::Right)),
                (RI_MOUSE_RIGHT_UP, up(MouseButton::Right)),
                (RI_MOUSE_MIDDLE_DOWN, down(MouseButton::Middle)),
                (RI_MOUSE_MIDDLE_UP, up(MouseButton::Middle)),
                (RI_MOUSE_X1_DOWN, down(MouseButton::X1)),
                (RI_MOUSE_X1_UP, up(MouseButton::X1)),
                (RI_MOUSE_X2_DOWN, down(MouseButton::X2)),
                (RI_MOUSE_X2_UP, up(MouseButton::X2)),
            ];
            for (flag, event) in transitions {
                if button_flags & flag != 0 {
                    events.push(event);
                }
            }

            if button_flags & RI_MOUSE_WHEEL != 0 {
                events.push(InputEvent::Wheel {
                    delta: wheel / WHEEL_DETENT,
                });
            }
        }
    }
    events
}

fn down(button: MouseButton) -> InputEvent {
    InputEvent::ButtonDown { button }
}

fn up(button: MouseButton) -> InputEvent {
    InputEvent::ButtonUp { button }
}

/// Apply a raw packet to the trackers watching `window`.
///
/// Returns whether any tracker asked for suppression; callers routing
/// `WM_INPUT` typically ignore it, since raw input cannot be withheld
/// after the fact.
pub fn handle_raw_packet(manager: &InputManager, window: WindowId, packet: &RawPacket) -> bool {
    let base = manager
        .get(window)
        .or_else(|| manager.get(WindowId::ANY))
        .map(|tracker| tracker.mouse_position())
        .unwrap_or((0, 0));

    let mut suppress = false;
    for event in packet_events(packet, base) {
        suppress |= manager.dispatch(window, event);
    }
    suppress
}

/// Register a window for raw input and with the tracker registry.
///
/// The OS registration happens first; if it fails the registry is left
/// untouched and the error is returned.
pub fn register_window_with_raw_input(
    manager: &InputManager,
    window: WindowId,
    options: RawInputOptions,
) -> Result<Arc<InputTracker>, HostError> {
    register_raw_input_devices(window, options)?;
    Ok(manager.register_window(window))
}

/// Register the raw keyboard and mouse devices for a window.
#[cfg(windows)]
pub fn register_raw_input_devices(
    window: WindowId,
    options: RawInputOptions,
) -> Result<(), HostError> {
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::Input::{
        RegisterRawInputDevices, RAWINPUTDEVICE, RAWINPUTDEVICE_FLAGS, RIDEV_NOLEGACY,
    };

    const HID_USAGE_PAGE_GENERIC: u16 = 0x01;
    const HID_USAGE_GENERIC_MOUSE: u16 = 0x02;
    const HID_USAGE_GENERIC_KEYBOARD: u16 = 0x06;

    let target = HWND(window.raw() as *mut core::ffi::c_void);
    let devices = [
        RAWINPUTDEVICE {
            usUsagePage: HID_USAGE_PAGE_GENERIC,
            usUsage: HID_USAGE_GENERIC_KEYBOARD,
            dwFlags: if options.no_legacy_keyboard {
                RIDEV_NOLEGACY
            } else {
                RAWINPUTDEVICE_FLAGS(0)
            },
            hwndTarget: target,
        },
        RAWINPUTDEVICE {
            usUsagePage: HID_USAGE_PAGE_GENERIC,
            usUsage: HID_USAGE_GENERIC_MOUSE,
            dwFlags: if options.no_legacy_mouse {
                RIDEV_NOLEGACY
            } else {
                RAWINPUTDEVICE_FLAGS(0)
            },
            hwndTarget: target,
        },
    ];

    unsafe {
        RegisterRawInputDevices(&devices, std::mem::size_of::<RAWINPUTDEVICE>() as u32)
            .map_err(|e| HostError::RawInputRegistration(e.to_string()))?;
    }

    debug!(window = window.raw(), ?options, "raw input devices registered");
    Ok(())
}

/// Register the raw keyboard and mouse devices (non-Windows stub).
#[cfg(not(windows))]
pub fn register_raw_input_devices(
    window: WindowId,
    options: RawInputOptions,
) -> Result<(), HostError> {
    debug!(
        window = window.raw(),
        ?options,
        "raw input registration skipped on this platform"
    );
    Ok(())
}

/// Read the raw packet referenced by a `WM_INPUT` lparam.
#[cfg(windows)]
pub fn read_raw_packet(lparam: isize) -> Option<RawPacket> {
    use windows::Win32::UI::Input::{
        GetRawInputData, HRAWINPUT, RAWINPUT, RAWINPUTHEADER, RID_INPUT, RIM_TYPEKEYBOARD,
        RIM_TYPEMOUSE,
    };

    // RAWKEYBOARD flag: the key transitioned up.
    const RI_KEY_BREAK: u16 = 0x0001;
    // Absolute-motion flag in RAWMOUSE::usFlags; tablets and some remote
    // desktop stacks set it, in which case lLastX/Y are not deltas.
    const MOUSE_MOVE_ABSOLUTE: u16 = 0x0001;

    let handle = HRAWINPUT(lparam as *mut core::ffi::c_void);
    let header_size = std::mem::size_of::<RAWINPUTHEADER>() as u32;

    let mut size = 0u32;
    unsafe {
        GetRawInputData(handle, RID_INPUT, None, &mut size, header_size);
    }
    if size == 0 {
        return None;
    }

    let mut buffer = vec![0u8; size as usize];
    let read = unsafe {
        GetRawInputData(
            handle,
            RID_INPUT,
            Some(buffer.as_mut_ptr() as *mut core::ffi::c_void),
            &mut size,
            header_size,
        )
    };
    if read != size {
        return None;
    }

    let input = unsafe { &*(buffer.as_ptr() as *const RAWINPUT) };
    if input.header.dwType == RIM_TYPEKEYBOARD.0 {
        let keyboard = unsafe { input.data.keyboard };
        Some(RawPacket::Keyboard {
            vkey: keyboard.VKey as u32,
            released: keyboard.Flags & RI_KEY_BREAK != 0,
        })
    } else if input.header.dwType == RIM_TYPEMOUSE.0 {
        let mouse = unsafe { input.data.mouse };
        let relative = mouse.usFlags.0 & MOUSE_MOVE_ABSOLUTE == 0;
        let (flags, data) = unsafe {
            (
                mouse.Anonymous.Anonymous.usButtonFlags,
                mouse.Anonymous.Anonymous.usButtonData,
            )
        };
        Some(RawPacket::Mouse {
            dx: if relative { mouse.lLastX } else { 0 },
            dy: if relative { mouse.lLastY } else { 0 },
            button_flags: flags,
            wheel: data as i16 as i32,
        })
    } else {
        None
    }
}

/// Read the raw packet referenced by a `WM_INPUT` lparam (non-Windows stub).
#[cfg(not(windows))]
pub fn read_raw_packet(_lparam: isize) -> Option<RawPacket> {
    None
}
