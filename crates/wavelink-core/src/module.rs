//! The `WifiModule` trait -- unified interface for serial Wi-Fi module drivers.
//!
//! This trait is the primary API surface of wavelink. Applications program
//! against `dyn WifiModule` without needing to know which module family's
//! AT dialect is in use.
//!
//! Each module backend (wavelink-emw today) provides a concrete type that
//! implements this trait.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::events::WifiEvent;
use crate::types::{SocketId, SocketType};

/// Unified asynchronous interface for driving a serial Wi-Fi module.
///
/// All methods are `async` because every operation involves serial I/O
/// round-trips bounded by timeouts. Methods take `&mut self`: a single
/// caller drives the whole session, and the borrow checker enforces that
/// no two operations overlap on the shared byte stream.
///
/// # Blocking semantics
///
/// Every operation blocks (awaits) up to its timeout and reports failure
/// as an `Err` value; nothing in this layer panics or aborts. Unsolicited
/// module events observed while an operation is waiting are serviced as a
/// side effect of that wait -- see the driver documentation for the
/// re-entrancy contract.
#[async_trait]
pub trait WifiModule: Send {
    /// Boot or re-boot the module and wait for it to report ready.
    ///
    /// On a factory-fresh module the normal reboot handshake fails; drivers
    /// fall back to a provisioning sequence before waiting for readiness.
    async fn startup(&mut self) -> Result<()>;

    /// Send a raw configuration/reset command (the part after `AT+`).
    async fn reset(&mut self, command: &str) -> Result<()>;

    /// Enable or disable DHCP address assignment on the station interface.
    async fn dhcp(&mut self, enable: bool) -> Result<()>;

    /// Select the access-point radio channel.
    async fn set_channel(&mut self, channel: u8) -> Result<()>;

    /// Join an access point. Resolves once the module both acknowledges the
    /// command and reports the link coming up.
    async fn connect(&mut self, ssid: &str, passphrase: &str) -> Result<()>;

    /// Leave the current access point.
    async fn disconnect(&mut self) -> Result<()>;

    /// Query the station IP address.
    async fn ip_address(&mut self) -> Result<String>;

    /// Query the station MAC address.
    async fn mac_address(&mut self) -> Result<String>;

    /// Query the received signal strength in dBm.
    async fn rssi(&mut self) -> Result<i8>;

    /// Whether the station currently holds an IP address.
    async fn is_connected(&mut self) -> bool;

    /// Open a transport-layer connection and return the id the module
    /// assigned to it.
    async fn open(&mut self, kind: SocketType, addr: &str, port: u16) -> Result<SocketId>;

    /// Send application data on an open connection.
    async fn send(&mut self, id: SocketId, data: &[u8]) -> Result<()>;

    /// Receive application data from an open connection.
    ///
    /// Copies up to `buf.len()` bytes of queued inbound data for `id` and
    /// returns the number of bytes written. Blocks until data for `id`
    /// arrives or the wait times out.
    async fn recv(&mut self, id: SocketId, buf: &mut [u8]) -> Result<usize>;

    /// Close an open connection.
    async fn close(&mut self, id: SocketId) -> Result<()>;

    /// Subscribe to asynchronous module events.
    fn subscribe(&self) -> broadcast::Receiver<WifiEvent>;
}
