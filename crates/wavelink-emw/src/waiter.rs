//! Bring-up event classifier.
//!
//! Module bring-up (boot, access-point association) produces a mix of
//! lines no single pattern can match: the awaited event, harmless state
//! churn from the previous session, stray acknowledgements, and boot
//! noise. This module scans the stream one byte at a time and classifies
//! each candidate line against a closed rule table, bounded by an overall
//! elapsed-time budget.
//!
//! Used only during bring-up, before any socket exists; steady-state event
//! waits go through [`AtChannel::wait_event`](crate::channel::AtChannel),
//! which also services the data intake.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use wavelink_core::error::{Error, Result};

use crate::channel::AtChannel;

/// Outcome of classifying one candidate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Classification {
    /// The awaited event; stop waiting, report success.
    Success,
    /// A line that cannot occur on a healthy bring-up; stop, report failure.
    Failure,
    /// Harmless traffic; keep scanning.
    KeepWaiting,
}

/// Classify a candidate line while waiting for the link to come up.
///
/// Rules are ordered so that `DISCONNECT` is decided before the `CONNECT`
/// substring rule can see it, and `DOWN` before `UP`.
pub(crate) fn classify_link_line(line: &str) -> Classification {
    if line.contains("EVENT") {
        if line.contains("DISCONNECT") {
            return Classification::KeepWaiting;
        }
        if line.contains("CONNECT") {
            return Classification::Success;
        }
        if line.contains("DOWN") {
            return Classification::KeepWaiting;
        }
        if line.contains("UP") {
            return Classification::Success;
        }
        return Classification::Failure;
    }
    if line.contains("OK") {
        return Classification::KeepWaiting;
    }
    Classification::Failure
}

/// Wait for an event reporting the link (or a connection) coming up.
///
/// Scans byte-by-byte for the `+` that opens a notification, consumes the
/// rest of that line, and classifies it. Returns `Error::Timeout` when the
/// budget elapses, `Error::Protocol` on a terminal-failure line.
pub(crate) async fn await_link_event(channel: &mut AtChannel, budget: Duration) -> Result<()> {
    let start = Instant::now();
    loop {
        if start.elapsed() > budget {
            return Err(Error::Timeout);
        }
        let byte = match channel.read_byte().await {
            Ok(byte) => byte,
            // A quiet stretch is not terminal; the budget decides.
            Err(Error::Timeout) => continue,
            Err(e) => return Err(e),
        };
        if byte != b'+' {
            continue;
        }
        let line = channel.read_line().await?;
        trace!(line = %line, "classifying bring-up line");
        match classify_link_line(&line) {
            Classification::Success => {
                debug!(line = %line, "link event observed");
                return Ok(());
            }
            Classification::KeepWaiting => continue,
            Classification::Failure => {
                return Err(Error::Protocol(format!(
                    "unexpected reply during link wait: {line:?}"
                )));
            }
        }
    }
}

/// Wait for the device-ready banner after a reboot or factory reset.
///
/// The banner is the only line whose payload follows an `=`; anything else
/// is ignored until the budget elapses.
pub(crate) async fn await_ready_banner(channel: &mut AtChannel, budget: Duration) -> Result<()> {
    let start = Instant::now();
    loop {
        if start.elapsed() > budget {
            return Err(Error::Timeout);
        }
        let byte = match channel.read_byte().await {
            Ok(byte) => byte,
            Err(Error::Timeout) => continue,
            Err(e) => return Err(e),
        };
        if byte != b'=' {
            continue;
        }
        let line = channel.read_line().await?;
        trace!(line = %line, "inspecting boot line");
        if line.contains("READY") {
            debug!("module ready");
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavelink_test_harness::MockTransport;

    const TIMEOUT: Duration = Duration::from_millis(20);

    fn make_channel(mock: MockTransport) -> AtChannel {
        AtChannel::new(Box::new(mock), TIMEOUT)
    }

    // -------------------------------------------------------------------
    // classify_link_line
    // -------------------------------------------------------------------

    #[test]
    fn classify_station_up_succeeds() {
        assert_eq!(
            classify_link_line("EVENT=WIFI_LINK,STATION_UP"),
            Classification::Success
        );
    }

    #[test]
    fn classify_socket_connect_succeeds() {
        assert_eq!(
            classify_link_line("EVENT=SOCKET,CONNECT,3"),
            Classification::Success
        );
    }

    #[test]
    fn classify_disconnect_keeps_waiting() {
        // DISCONNECT contains CONNECT as a substring; rule order must
        // keep it from reading as success.
        assert_eq!(
            classify_link_line("EVENT=SOCKET,DISCONNECT,3"),
            Classification::KeepWaiting
        );
    }

    #[test]
    fn classify_station_down_keeps_waiting() {
        assert_eq!(
            classify_link_line("EVENT=WIFI_LINK,STATION_DOWN"),
            Classification::KeepWaiting
        );
    }

    #[test]
    fn classify_stray_ok_keeps_waiting() {
        assert_eq!(classify_link_line("OK"), Classification::KeepWaiting);
    }

    #[test]
    fn classify_unknown_event_fails() {
        assert_eq!(
            classify_link_line("EVENT=LAN,UNKNOWN"),
            Classification::Failure
        );
    }

    #[test]
    fn classify_garbage_fails() {
        assert_eq!(classify_link_line("ERR=-5"), Classification::Failure);
    }

    // -------------------------------------------------------------------
    // await_link_event
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn link_wait_succeeds_on_station_up() {
        let mut mock = MockTransport::new();
        mock.inject(b"+EVENT=WIFI_LINK,STATION_UP\r\n");

        let mut channel = make_channel(mock);
        await_link_event(&mut channel, TIMEOUT).await.unwrap();
    }

    #[tokio::test]
    async fn link_wait_skips_down_then_succeeds_on_up() {
        let mut mock = MockTransport::new();
        mock.inject(b"+EVENT=WIFI_LINK,STATION_DOWN\r\n+OK\r\n+EVENT=WIFI_LINK,STATION_UP\r\n");

        let mut channel = make_channel(mock);
        await_link_event(&mut channel, TIMEOUT).await.unwrap();
    }

    #[tokio::test]
    async fn link_wait_times_out_on_silence() {
        let mock = MockTransport::new();
        let mut channel = make_channel(mock);
        let result = await_link_event(&mut channel, Duration::from_millis(10)).await;
        assert!(matches!(result.unwrap_err(), Error::Timeout));
    }

    #[tokio::test]
    async fn link_wait_fails_on_unclassifiable_line() {
        let mut mock = MockTransport::new();
        mock.inject(b"+ERR=-5\r\n");

        let mut channel = make_channel(mock);
        let result = await_link_event(&mut channel, TIMEOUT).await;
        assert!(matches!(result.unwrap_err(), Error::Protocol(_)));
    }

    #[tokio::test]
    async fn link_wait_ignores_noise_before_delimiter() {
        let mut mock = MockTransport::new();
        mock.inject(b"boot noise\r\n+EVENT=WIFI_LINK,STATION_UP\r\n");

        let mut channel = make_channel(mock);
        await_link_event(&mut channel, TIMEOUT).await.unwrap();
    }

    // -------------------------------------------------------------------
    // await_ready_banner
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn ready_wait_succeeds_on_banner() {
        let mut mock = MockTransport::new();
        mock.inject(b"+EVENT=SYSTEM,READY\r\n");

        let mut channel = make_channel(mock);
        await_ready_banner(&mut channel, TIMEOUT).await.unwrap();
    }

    #[tokio::test]
    async fn ready_wait_ignores_other_banners() {
        let mut mock = MockTransport::new();
        mock.inject(b"+EVENT=SYSTEM,BOOTING\r\n+EVENT=SYSTEM,READY\r\n");

        let mut channel = make_channel(mock);
        await_ready_banner(&mut channel, TIMEOUT).await.unwrap();
    }

    #[tokio::test]
    async fn ready_wait_times_out_without_banner() {
        let mut mock = MockTransport::new();
        mock.inject(b"+OK\r\n");

        let mut channel = make_channel(mock);
        let result = await_ready_banner(&mut channel, Duration::from_millis(10)).await;
        assert!(matches!(result.unwrap_err(), Error::Timeout));
    }
}
