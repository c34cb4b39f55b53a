//! Mock transport for deterministic testing of protocol engines.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs plus an injection hook for unsolicited module
//! traffic. This lets you test AT command generation, reply parsing, and
//! out-of-band event handling without real hardware.
//!
//! # Example
//!
//! ```
//! use wavelink_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // Pre-load: when the protocol engine sends this command, return this reply.
//! mock.expect(b"AT+DHCP=ON\r\n", b"+OK\r\n");
//! // Queue an unsolicited event that interleaves with whatever comes next.
//! mock.inject(b"+EVENT=WIFI_LINK,STATION_UP\r\n");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use wavelink_core::error::{Error, Result};
use wavelink_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent.
    request: Vec<u8>,
    /// The bytes queued onto the read stream when the matching request is
    /// received. May contain several frames, or nothing at all (which makes
    /// the next `receive()` time out, simulating a busy module).
    response: Vec<u8>,
}

/// A mock [`Transport`] for testing protocol engines without hardware.
///
/// Expectations are consumed in order. When `send()` is called, the sent
/// data is recorded and matched against the next expectation, and the
/// corresponding response bytes are appended to a single read stream that
/// `receive()` drains. [`inject()`](MockTransport::inject) appends bytes to
/// that same stream directly, which is how unsolicited events and inbound
/// data notifications are simulated.
///
/// If no expectation matches or the queue is exhausted, an error is returned.
#[derive(Debug)]
pub struct MockTransport {
    /// Ordered queue of expected request/response pairs.
    expectations: VecDeque<Expectation>,
    /// The single inbound byte stream drained by `receive()`.
    rx_stream: VecDeque<u8>,
    /// Whether the transport is "connected".
    connected: bool,
    /// Log of all bytes sent through this transport.
    sent_log: Vec<Vec<u8>>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            rx_stream: VecDeque::new(),
            connected: true,
            sent_log: Vec::new(),
        }
    }

    /// Add an expected request/response pair.
    ///
    /// When `send()` is called with data matching `request`, `response` is
    /// appended to the read stream. Pass an empty response to make the
    /// subsequent `receive()` time out.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Append bytes to the read stream without requiring a send.
    ///
    /// Use this for unsolicited events (`+EVENT=...`), boot banners, and
    /// inbound data notifications with their raw payloads.
    pub fn inject(&mut self, data: &[u8]) {
        self.rx_stream.extend(data.iter().copied());
    }

    /// Return a reference to all data that has been sent through this transport.
    ///
    /// Each element is the byte slice from one `send()` call.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Set the connected state of the mock transport.
    ///
    /// When set to `false`, subsequent `send()` and `receive()` calls will
    /// return [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        // Record what was sent.
        self.sent_log.push(data.to_vec());

        // Match against the next expectation.
        if let Some(expectation) = self.expectations.pop_front() {
            if data != expectation.request.as_slice() {
                return Err(Error::Protocol(format!(
                    "unexpected send data: expected {:02X?}, got {:02X?}",
                    expectation.request, data
                )));
            }
            self.rx_stream.extend(expectation.response.iter().copied());
            Ok(())
        } else {
            Err(Error::Protocol(
                "no more expectations in mock transport".into(),
            ))
        }
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        if self.rx_stream.is_empty() {
            return Err(Error::Timeout);
        }

        let n = self.rx_stream.len().min(buf.len());
        for slot in buf.iter_mut().take(n) {
            // Length was checked above; the stream cannot run dry mid-loop.
            *slot = self.rx_stream.pop_front().unwrap();
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.rx_stream.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
