//! Core types used throughout wavelink.
//!
//! These types provide a module-agnostic abstraction over the serial AT
//! command protocols spoken by the supported Wi-Fi modules.

use std::fmt;
use std::str::FromStr;

/// Opaque socket identifier.
///
/// The module assigns a small integer id when a transport-layer connection
/// is opened; all subsequent send/receive/close operations and inbound data
/// notifications reference that id. The id is meaningful only to the module
/// that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketId(u8);

impl SocketId {
    /// Create a `SocketId` from the raw id reported by the module.
    pub fn from_raw(id: u8) -> Self {
        SocketId(id)
    }

    /// Return the raw numeric id.
    pub fn raw(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "socket-{}", self.0)
    }
}

/// Connection type for a transport-layer connection.
///
/// Maps onto the connection-type token of the module's connect-request
/// command. `Client`/`Server` select TCP roles; `Unicast`/`Broadcast`
/// select UDP addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketType {
    /// TCP client: the module connects out to the remote address.
    Client,
    /// TCP server: the module listens on the local port.
    Server,
    /// UDP unicast to the remote address.
    Unicast,
    /// UDP broadcast on the local network.
    Broadcast,
}

impl SocketType {
    /// The protocol token the module expects for this connection type.
    pub fn token(&self) -> &'static str {
        match self {
            SocketType::Client => "CLIENT",
            SocketType::Server => "SERVER",
            SocketType::Unicast => "UNICAST",
            SocketType::Broadcast => "BROADCAST",
        }
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Error returned when a string cannot be parsed into a [`SocketType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSocketTypeError(String);

impl fmt::Display for ParseSocketTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown socket type: {}", self.0)
    }
}

impl std::error::Error for ParseSocketTypeError {}

impl FromStr for SocketType {
    type Err = ParseSocketTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CLIENT" => Ok(SocketType::Client),
            "SERVER" => Ok(SocketType::Server),
            "UNICAST" => Ok(SocketType::Unicast),
            "BROADCAST" => Ok(SocketType::Broadcast),
            _ => Err(ParseSocketTypeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_id_round_trip() {
        let id = SocketId::from_raw(3);
        assert_eq!(id.raw(), 3);
        assert_eq!(id.to_string(), "socket-3");
    }

    #[test]
    fn socket_id_equality() {
        assert_eq!(SocketId::from_raw(1), SocketId::from_raw(1));
        assert_ne!(SocketId::from_raw(1), SocketId::from_raw(2));
    }

    #[test]
    fn socket_type_tokens() {
        assert_eq!(SocketType::Client.token(), "CLIENT");
        assert_eq!(SocketType::Server.token(), "SERVER");
        assert_eq!(SocketType::Unicast.token(), "UNICAST");
        assert_eq!(SocketType::Broadcast.token(), "BROADCAST");
    }

    #[test]
    fn socket_type_from_str() {
        assert_eq!("CLIENT".parse::<SocketType>().unwrap(), SocketType::Client);
        assert_eq!("server".parse::<SocketType>().unwrap(), SocketType::Server);
        assert!("DATAGRAM".parse::<SocketType>().is_err());
    }

    #[test]
    fn socket_type_display_matches_token() {
        assert_eq!(SocketType::Broadcast.to_string(), "BROADCAST");
    }
}
