//! Inbound data reassembly queue.
//!
//! The module announces inbound socket data with out-of-band notifications
//! that can arrive while the driver is waiting on an unrelated reply. The
//! intake appends each payload here as a [`Fragment`]; readers later drain
//! fragments, whole or in part, per connection id.
//!
//! A single queue holds fragments for every connection, in arrival order. A
//! reader for one id removes only the first fragment matching that id;
//! fragments for other ids keep their positions, so per-id ordering and
//! cross-id arrival order are both preserved.

use std::collections::VecDeque;

use wavelink_core::types::SocketId;

/// One contiguous chunk of inbound application data awaiting a reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// The connection the data belongs to.
    pub id: SocketId,
    /// The remaining unread payload. Never empty while queued.
    pub payload: Vec<u8>,
}

/// FIFO queue of inbound data fragments, keyed by connection id on dequeue.
#[derive(Debug, Default)]
pub struct PacketQueue {
    fragments: VecDeque<Fragment>,
}

impl PacketQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        PacketQueue {
            fragments: VecDeque::new(),
        }
    }

    /// Append a fragment at the tail. Empty payloads are discarded.
    pub fn enqueue(&mut self, id: SocketId, payload: Vec<u8>) {
        if payload.is_empty() {
            return;
        }
        self.fragments.push_back(Fragment { id, payload });
    }

    /// Remove up to `max` bytes of the oldest fragment for `id`.
    ///
    /// Returns `None` when no fragment for `id` is queued. When the oldest
    /// matching fragment fits within `max` it is removed whole; otherwise
    /// exactly `max` bytes are drained off its front and the remainder stays
    /// at the same queue position for a later read.
    pub fn dequeue(&mut self, id: SocketId, max: usize) -> Option<Vec<u8>> {
        let pos = self.fragments.iter().position(|f| f.id == id)?;

        if self.fragments[pos].payload.len() <= max {
            // remove() preserves the relative order of the remaining
            // fragments, unlike swap_remove_back().
            self.fragments.remove(pos).map(|f| f.payload)
        } else {
            let fragment = &mut self.fragments[pos];
            Some(fragment.payload.drain(..max).collect())
        }
    }

    /// Total unread bytes queued for `id`.
    pub fn pending(&self, id: SocketId) -> usize {
        self.fragments
            .iter()
            .filter(|f| f.id == id)
            .map(|f| f.payload.len())
            .sum()
    }

    /// Whether the queue holds no fragments for any id.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Number of queued fragments across all ids.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }
}
