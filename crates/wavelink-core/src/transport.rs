//! Transport trait for module communication.
//!
//! The [`Transport`] trait abstracts over the physical link to a Wi-Fi
//! module. Implementations exist for serial ports (USB virtual COM ports,
//! UART pins) and mock transports for testing.
//!
//! Protocol engines (e.g. the AT channel in `wavelink-emw`) operate on a
//! `Transport` rather than directly on a serial port, enabling both real
//! hardware control and deterministic unit testing with `MockTransport`
//! from the `wavelink-test-harness` crate.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a Wi-Fi module.
///
/// Implementations handle buffering and error recovery at the physical
/// layer. Protocol-level concerns (AT framing, event recognition) are
/// handled by the protocol engines that consume this trait.
///
/// # Re-entrancy of protocol engines
///
/// A protocol engine holding a `Transport` may service unsolicited module
/// traffic (e.g. inbound-data notifications) from inside *any* `receive`
/// wait, including waits issued on behalf of an unrelated command. The
/// transport itself is oblivious to this; it only promises that bytes are
/// delivered in arrival order.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the module.
    ///
    /// Implementations should block until all bytes have been written to
    /// the underlying transport (serial TX buffer, etc.).
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the module into the provided buffer.
    ///
    /// Returns the number of bytes actually read. Will wait up to `timeout`
    /// for data to arrive; returns [`Error::Timeout`](crate::error::Error::Timeout)
    /// if no data is received within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
