//! # Glasspane Common
//!
//! Shared logging configuration for the Glasspane input layer.
//!
//! The library crates in this workspace only emit `tracing` events; this
//! crate carries the subscriber setup so that embedding binaries and test
//! harnesses configure output in one place.

pub mod logging;

pub use logging::{init, try_init, LogConfig, LogFormat};
