//! Asynchronous module event types.
//!
//! Events are emitted by module drivers through a [`tokio::sync::broadcast`]
//! channel when the module reports a state change. Applications subscribe to
//! these for connection monitoring without polling.

use crate::types::SocketId;

/// An event emitted by a module driver when the module's state changes.
///
/// Subscribe to events via [`crate::module::WifiModule::subscribe()`]. Events
/// are delivered on a best-effort basis through a bounded broadcast channel;
/// slow consumers may miss events under heavy inbound traffic.
#[derive(Debug, Clone)]
pub enum WifiEvent {
    /// The module finished booting and is ready to accept commands.
    Ready,

    /// The station interface associated with an access point.
    LinkUp,

    /// The station interface lost its access point association.
    LinkDown,

    /// A transport-layer connection was established.
    SocketConnected {
        /// The id the module assigned to the connection.
        id: SocketId,
    },

    /// A transport-layer connection was torn down.
    SocketDisconnected {
        /// The id of the closed connection.
        id: SocketId,
    },

    /// Inbound application data arrived and was queued for reading.
    DataReceived {
        /// The connection the data belongs to.
        id: SocketId,
        /// Number of payload bytes queued.
        len: usize,
    },
}
