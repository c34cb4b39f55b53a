//! EmwBuilder -- fluent builder for constructing [`EmwDriver`] instances.
//!
//! Separates configuration from construction so that callers can set up
//! serial port parameters, timeout budgets, and firmware quirk overrides
//! before establishing the transport connection.
//!
//! # Example
//!
//! ```no_run
//! use wavelink_emw::builder::EmwBuilder;
//! use wavelink_emw::models::emw3162;
//! use std::time::Duration;
//!
//! # async fn example() -> wavelink_core::Result<()> {
//! let module = EmwBuilder::new(emw3162())
//!     .serial_port("/dev/ttyUSB0")
//!     .baud_rate(115_200)
//!     .command_timeout(Duration::from_secs(8))
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use wavelink_core::error::{Error, Result};
use wavelink_core::transport::Transport;

use crate::driver::EmwDriver;
use crate::models::EmwModel;

/// Ambient reply timeout applied when the builder is not told otherwise.
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(8);

/// Fluent builder for [`EmwDriver`].
///
/// All configuration has sensible defaults derived from the [`EmwModel`],
/// so the simplest usage is:
///
/// ```ignore
/// let module = EmwBuilder::new(emw3162())
///     .serial_port("/dev/ttyUSB0")
///     .build()
///     .await?;
/// ```
pub struct EmwBuilder {
    model: EmwModel,
    serial_port: Option<String>,
    baud_rate: Option<u32>,
    command_timeout: Duration,
    link_cycle_quirk: Option<bool>,
    ready_timeout: Option<Duration>,
    link_event_timeout: Option<Duration>,
    connect_event_timeout: Option<Duration>,
    local_port: Option<u16>,
}

impl EmwBuilder {
    /// Create a new builder for the given module model.
    pub fn new(model: EmwModel) -> Self {
        EmwBuilder {
            model,
            serial_port: None,
            baud_rate: None,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            link_cycle_quirk: None,
            ready_timeout: None,
            link_event_timeout: None,
            connect_event_timeout: None,
            local_port: None,
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the default baud rate for this model.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = Some(baud);
        self
    }

    /// Set the ambient timeout for waiting on a single reply (default: 8s).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Override the model's station-cycle quirk setting.
    ///
    /// See [`EmwModel::link_cycle_quirk`] for what the quirk does.
    pub fn link_cycle_quirk(mut self, enabled: bool) -> Self {
        self.link_cycle_quirk = Some(enabled);
        self
    }

    /// Override how long `startup()` waits for the device-ready banner.
    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = Some(timeout);
        self
    }

    /// Override how long `connect()` waits for the link-up event.
    pub fn link_event_timeout(mut self, timeout: Duration) -> Self {
        self.link_event_timeout = Some(timeout);
        self
    }

    /// Override how long `open()` waits for the connect event.
    pub fn connect_event_timeout(mut self, timeout: Duration) -> Self {
        self.connect_event_timeout = Some(timeout);
        self
    }

    /// Override the local source port used for connection requests.
    pub fn local_port(mut self, port: u16) -> Self {
        self.local_port = Some(port);
        self
    }

    /// Build an [`EmwDriver`] with a caller-provided transport.
    ///
    /// This is the primary entry point for testing (pass a
    /// `MockTransport` from `wavelink-test-harness`) and for advanced use
    /// cases where the caller manages the transport lifecycle directly.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<EmwDriver> {
        if self.local_port == Some(0) {
            return Err(Error::InvalidParameter(
                "local_port 0 is reserved; pick a real source port".into(),
            ));
        }

        let mut model = self.model;
        if let Some(quirk) = self.link_cycle_quirk {
            model.link_cycle_quirk = quirk;
        }
        if let Some(timeout) = self.ready_timeout {
            model.ready_timeout = timeout;
        }
        if let Some(timeout) = self.link_event_timeout {
            model.link_event_timeout = timeout;
        }
        if let Some(timeout) = self.connect_event_timeout {
            model.connect_event_timeout = timeout;
        }
        if let Some(port) = self.local_port {
            model.local_port = port;
        }

        Ok(EmwDriver::new(transport, model, self.command_timeout))
    }

    /// Build an [`EmwDriver`] using a serial transport.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    /// The baud rate defaults to the model's default if not overridden.
    pub async fn build(self) -> Result<EmwDriver> {
        let port = self
            .serial_port
            .as_ref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;
        let baud = self.baud_rate.unwrap_or(self.model.default_baud_rate);

        let transport = wavelink_transport::SerialTransport::open(port, baud).await?;
        self.build_with_transport(Box::new(transport)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{emw1062, emw3162};
    use wavelink_test_harness::MockTransport;

    #[tokio::test]
    async fn builder_defaults() {
        let mock = MockTransport::new();
        let driver = EmwBuilder::new(emw3162())
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        assert_eq!(driver.model().name, "EMW3162");
        assert!(driver.model().link_cycle_quirk);
    }

    #[tokio::test]
    async fn builder_quirk_override() {
        let mock = MockTransport::new();
        let driver = EmwBuilder::new(emw3162())
            .link_cycle_quirk(false)
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        assert!(!driver.model().link_cycle_quirk);
    }

    #[tokio::test]
    async fn builder_timeout_overrides() {
        let mock = MockTransport::new();
        let driver = EmwBuilder::new(emw1062())
            .ready_timeout(Duration::from_millis(10))
            .link_event_timeout(Duration::from_millis(20))
            .connect_event_timeout(Duration::from_millis(30))
            .local_port(30_000)
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        assert_eq!(driver.model().ready_timeout, Duration::from_millis(10));
        assert_eq!(driver.model().link_event_timeout, Duration::from_millis(20));
        assert_eq!(
            driver.model().connect_event_timeout,
            Duration::from_millis(30)
        );
        assert_eq!(driver.model().local_port, 30_000);
    }

    #[tokio::test]
    async fn builder_rejects_zero_local_port() {
        let mock = MockTransport::new();
        let result = EmwBuilder::new(emw3162())
            .local_port(0)
            .build_with_transport(Box::new(mock))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn builder_serial_port_required_for_build() {
        let result = EmwBuilder::new(emw3162()).build().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn builder_fluent_chain() {
        let mock = MockTransport::new();
        let driver = EmwBuilder::new(emw1062())
            .serial_port("/dev/ttyUSB0")
            .baud_rate(9600)
            .command_timeout(Duration::from_millis(300))
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        assert_eq!(driver.model().name, "EMW1062");
    }
}
