//! wavelink-transport: Serial transport implementation for wavelink.
//!
//! Provides [`SerialTransport`], the production implementation of the
//! [`Transport`](wavelink_core::Transport) trait for USB virtual COM ports
//! and UART-attached Wi-Fi modules.

pub mod serial;

pub use serial::{DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits};
