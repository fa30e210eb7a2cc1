//! # Glasspane Host
//!
//! Window-system integration for the Glasspane input layer: decodes raw
//! window messages into platform-agnostic input events, routes them into
//! the tracker registry, and registers windows for raw input with the OS.
//!
//! ## Design Goals
//!
//! 1. **Thin OS boundary**: the numeric wire format (message ids, keycode
//!    layout, packed coordinates) is decoded in portable code; only the
//!    actual OS calls are `cfg(windows)`
//! 2. **Suppression at the pump**: each handled message yields a boolean
//!    telling the embedder's message loop whether to swallow the message
//!    instead of forwarding it to the wrapped application
//! 3. **Builds everywhere**: non-Windows targets get succeeding stubs, so
//!    the full decode and routing logic tests on any host

use thiserror::Error;

pub mod message;
pub mod raw;

pub use message::{decode, handle_window_message, WindowMessage};
pub use raw::{
    handle_raw_packet, packet_events, register_raw_input_devices,
    register_window_with_raw_input, RawInputOptions, RawPacket,
};

/// Errors that can occur in the host layer.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Failed to register raw input devices: {0}")]
    RawInputRegistration(String),

    #[error("Windows API error: {0}")]
    WindowsApi(String),
}
