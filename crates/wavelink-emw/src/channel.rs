//! The AT command/response channel.
//!
//! [`AtChannel`] owns the transport and pairs outbound commands with the
//! module's multiplexed reply stream: synchronous `+OK`/`+ERR` replies,
//! the `>` write-ready prompt, and unsolicited `+EVENT` notifications all
//! arrive interleaved on one byte stream.
//!
//! # Re-entrant data intake
//!
//! Once [`arm_data_intake`](AtChannel::arm_data_intake) has been called,
//! *any* frame wait on this channel services inbound-data notifications as
//! a side effect: when [`next_frame`](AtChannel::next_frame) decodes a data
//! header it immediately performs the length-prefixed raw read and appends
//! the payload to the packet queue, before returning control to whatever
//! caller is waiting -- even one waiting for an unrelated acknowledgement.
//! Callers must therefore never assume the queue is unchanged across a wait.
//!
//! A payload that cannot be read in time is dropped without surfacing an
//! error; the affected connection stalls rather than failing the caller's
//! unrelated wait.
//!
//! # Timeouts
//!
//! The channel carries one mutable ambient timeout governing every wait.
//! Operations that need a different deadline save the current value, set
//! their own, and restore the saved value on every exit path; event waits
//! take an explicit elapsed-time budget instead.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use wavelink_core::error::{Error, Result};
use wavelink_core::events::WifiEvent;
use wavelink_core::transport::Transport;
use wavelink_core::types::SocketId;

use crate::protocol::{self, DecodeResult, Frame};
use crate::queue::PacketQueue;

/// Command/response matcher over a [`Transport`], with inline handling of
/// out-of-band module notifications.
pub struct AtChannel {
    transport: Box<dyn Transport>,
    /// Bytes received but not yet decoded.
    rx_buf: Vec<u8>,
    /// Ambient timeout for every wait on this channel.
    timeout: Duration,
    /// Whether inbound-data notifications are absorbed into the queue.
    intake_armed: bool,
    /// Sender for surfacing absorbed data notifications as events.
    event_tx: Option<broadcast::Sender<WifiEvent>>,
    queue: PacketQueue,
}

impl AtChannel {
    /// Create a channel over `transport` with the given ambient timeout.
    pub fn new(transport: Box<dyn Transport>, timeout: Duration) -> Self {
        AtChannel {
            transport,
            rx_buf: Vec::new(),
            timeout,
            intake_armed: false,
            event_tx: None,
            queue: PacketQueue::new(),
        }
    }

    /// The current ambient timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Replace the ambient timeout governing subsequent waits.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Arm the inbound-data intake for the remainder of the session.
    ///
    /// Absorbed notifications are reported through `event_tx` as
    /// [`WifiEvent::DataReceived`]. Calling this again replaces the sender
    /// and leaves the intake armed.
    pub fn arm_data_intake(&mut self, event_tx: broadcast::Sender<WifiEvent>) {
        debug!("inbound data intake armed");
        self.intake_armed = true;
        self.event_tx = Some(event_tx);
    }

    /// Send a complete command frame.
    pub async fn send_command(&mut self, cmd: &[u8]) -> Result<()> {
        trace!(cmd = %String::from_utf8_lossy(cmd).trim_end(), "sending command");
        self.transport.send(cmd).await
    }

    /// Write raw bytes with no framing (payload upload, escape sequences).
    pub async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        trace!(bytes = data.len(), "writing raw data");
        self.transport.send(data).await
    }

    /// Decode the next frame, waiting up to the ambient timeout.
    ///
    /// See the module documentation for the re-entrant intake this wait may
    /// perform before returning.
    pub async fn next_frame(&mut self) -> Result<Frame> {
        let deadline = Instant::now() + self.timeout;
        self.next_frame_until(deadline).await
    }

    async fn next_frame_until(&mut self, deadline: Instant) -> Result<Frame> {
        loop {
            match protocol::decode_frame(&self.rx_buf) {
                DecodeResult::Frame { frame, consumed } => {
                    self.rx_buf.drain(..consumed);
                    if let Frame::DataHeader { id, len } = &frame {
                        if self.intake_armed {
                            self.intake(SocketId::from_raw(*id), *len, deadline).await;
                        } else {
                            // No intake bound yet: skip the payload so the
                            // stream stays frame-aligned.
                            let _ = self.read_payload(*len, deadline).await;
                        }
                    }
                    trace!(?frame, "decoded frame");
                    return Ok(frame);
                }
                DecodeResult::Incomplete => self.fill(deadline).await?,
            }
        }
    }

    /// Absorb one inbound-data notification into the packet queue.
    async fn intake(&mut self, id: SocketId, len: usize, deadline: Instant) {
        match self.read_payload(len, deadline).await {
            Ok(payload) => {
                trace!(%id, len, "queued inbound data fragment");
                self.queue.enqueue(id, payload);
                if let Some(tx) = &self.event_tx {
                    let _ = tx.send(WifiEvent::DataReceived { id, len });
                }
            }
            Err(e) => {
                // Dropped, not surfaced: the caller's wait is unrelated to
                // this connection and must not fail on its behalf.
                warn!(%id, len, error = %e, "dropping inbound data notification");
            }
        }
    }

    /// Wait for an acknowledgement, skipping interleaved notifications.
    pub async fn expect_ack(&mut self) -> Result<Vec<String>> {
        loop {
            match self.next_frame().await? {
                Frame::Ok { fields } => return Ok(fields),
                Frame::Err { code } => {
                    return Err(Error::Protocol(match code {
                        Some(code) => format!("module returned error reply (+ERR={code})"),
                        None => "module returned error reply (+ERR)".into(),
                    }));
                }
                frame => {
                    trace!(?frame, "skipping frame while waiting for acknowledgement");
                }
            }
        }
    }

    /// Wait for the `>` write-ready prompt, skipping interleaved frames.
    pub async fn expect_prompt(&mut self) -> Result<()> {
        loop {
            match self.next_frame().await? {
                Frame::Prompt => return Ok(()),
                Frame::Err { .. } => {
                    return Err(Error::Protocol(
                        "module rejected data send request".into(),
                    ));
                }
                frame => {
                    trace!(?frame, "skipping frame while waiting for prompt");
                }
            }
        }
    }

    /// Scan the raw byte stream for a literal token, consuming through it.
    ///
    /// Used by the provisioning escape handshake, whose `a` prompt is not a
    /// framed reply.
    pub async fn expect_token(&mut self, token: &[u8]) -> Result<()> {
        debug_assert!(!token.is_empty());
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(pos) = find_subslice(&self.rx_buf, token) {
                self.rx_buf.drain(..pos + token.len());
                return Ok(());
            }
            self.fill(deadline).await?;
        }
    }

    /// Wait up to `budget` for an event satisfying `pred`, skipping all
    /// other frames.
    pub async fn wait_event<F>(
        &mut self,
        budget: Duration,
        mut pred: F,
    ) -> Result<(String, Vec<String>)>
    where
        F: FnMut(&str, &[String]) -> bool,
    {
        let deadline = Instant::now() + budget;
        loop {
            match self.next_frame_until(deadline).await? {
                Frame::Event { category, args } if pred(&category, &args) => {
                    return Ok((category, args));
                }
                frame => {
                    trace!(?frame, "skipping frame while waiting for event");
                }
            }
        }
    }

    /// Read exactly `n` raw bytes, waiting up to the ambient timeout.
    pub async fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.timeout;
        self.read_payload(n, deadline).await
    }

    /// Read one raw byte, waiting up to the ambient timeout.
    pub(crate) async fn read_byte(&mut self) -> Result<u8> {
        let deadline = Instant::now() + self.timeout;
        while self.rx_buf.is_empty() {
            self.fill(deadline).await?;
        }
        Ok(self.rx_buf.remove(0))
    }

    /// Consume and return the remainder of the current line, without its
    /// terminator.
    pub(crate) async fn read_line(&mut self) -> Result<String> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(pos) = self.rx_buf.iter().position(|&b| b == protocol::TERMINATOR) {
                let mut line: Vec<u8> = self.rx_buf.drain(..=pos).collect();
                line.pop();
                if line.ends_with(b"\r") {
                    line.pop();
                }
                return Ok(String::from_utf8_lossy(&line).into_owned());
            }
            self.fill(deadline).await?;
        }
    }

    /// Dequeue up to `max` bytes of queued inbound data for `id`.
    pub fn take_packet(&mut self, id: SocketId, max: usize) -> Option<Vec<u8>> {
        self.queue.dequeue(id, max)
    }

    /// Total unread bytes queued for `id`.
    pub fn pending(&self, id: SocketId) -> usize {
        self.queue.pending(id)
    }

    async fn read_payload(&mut self, n: usize, deadline: Instant) -> Result<Vec<u8>> {
        while self.rx_buf.len() < n {
            self.fill(deadline).await?;
        }
        Ok(self.rx_buf.drain(..n).collect())
    }

    /// Pull more bytes from the transport, bounded by `deadline`.
    async fn fill(&mut self, deadline: Instant) -> Result<()> {
        let now = Instant::now();
        if now >= deadline {
            return Err(Error::Timeout);
        }
        let mut buf = [0u8; 256];
        let n = self.transport.receive(&mut buf, deadline - now).await?;
        if n == 0 {
            return Err(Error::ConnectionLost);
        }
        self.rx_buf.extend_from_slice(&buf[..n]);
        Ok(())
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
