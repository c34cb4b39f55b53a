//! EMW AT text-protocol encoder/decoder.
//!
//! The EMW command set uses CR-LF-terminated ASCII frames over a serial
//! link. Commands are `AT+` followed by a name and optional `=`-separated
//! arguments; replies and notifications are `+`-prefixed lines.
//!
//! # Command format
//!
//! ```text
//! AT+<NAME>[=<args>]\r\n
//! ```
//!
//! # Reply and notification format
//!
//! - Acknowledgement: `+OK` or `+OK=<f1>,<f2>,...`
//! - Error: `+ERR` or `+ERR=<code>`
//! - Asynchronous event: `+EVENT=<CATEGORY>,<DETAIL>[,<args>]`
//! - Write-ready prompt: a bare `>` with no line terminator
//!
//! # Inbound data notifications
//!
//! Data arriving on an open socket is announced as
//! `+EVENT=SOCKET,<id>,<len>,` followed by exactly `<len>` raw payload
//! bytes. The header ends at its final comma, not at a line ending, because
//! the payload is raw and may contain any byte including CR/LF. The decoder
//! returns [`Frame::DataHeader`] for the header only; consuming the payload
//! is the caller's job. Socket lifecycle events (`+EVENT=SOCKET,CONNECT,3`)
//! share the category but carry a non-numeric detail, which is how the two
//! shapes are told apart.

use bytes::{BufMut, BytesMut};

/// Byte that terminates every line-oriented frame.
pub const TERMINATOR: u8 = b'\n';

/// The write-ready prompt byte sent before raw payload upload.
pub const PROMPT: u8 = b'>';

/// Leading bytes of an inbound-data notification header.
const DATA_EVENT_HEADER: &[u8] = b"+EVENT=SOCKET,";

/// One decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Acknowledgement, with any `=`-fields split on commas.
    Ok {
        /// Fields following `+OK=`, empty for a bare `+OK`.
        fields: Vec<String>,
    },

    /// Module error reply.
    Err {
        /// Error code following `+ERR=`, if any.
        code: Option<String>,
    },

    /// An asynchronous event notification.
    Event {
        /// Event category (e.g. `WIFI_LINK`, `SOCKET`).
        category: String,
        /// Remaining comma-separated arguments (detail first).
        args: Vec<String>,
    },

    /// Header of an inbound-data notification. Exactly `len` raw payload
    /// bytes follow on the wire.
    DataHeader {
        /// Connection the data belongs to.
        id: u8,
        /// Payload byte count.
        len: usize,
    },

    /// The bare `>` write-ready prompt.
    Prompt,

    /// Any other line (boot noise, banners).
    Line(String),
}

/// Result of attempting to decode one frame from a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    /// A complete frame was decoded; `consumed` bytes should be drained
    /// from the input buffer (including any leading line-ending bytes and
    /// the terminator, but never payload bytes after a data header).
    Frame {
        /// The decoded frame.
        frame: Frame,
        /// Number of bytes consumed from the input buffer.
        consumed: usize,
    },

    /// The buffer does not yet contain a complete frame. More data is needed.
    Incomplete,
}

/// Encode an AT command into raw bytes ready for transmission.
///
/// # Example
///
/// ```
/// use wavelink_emw::protocol::encode_command;
///
/// assert_eq!(encode_command("REBOOT", ""), b"AT+REBOOT\r\n");
/// assert_eq!(encode_command("DHCP", "ON"), b"AT+DHCP=ON\r\n");
/// ```
pub fn encode_command(name: &str, args: &str) -> Vec<u8> {
    let capacity = 3 + name.len() + 1 + args.len() + 2;
    let mut buf = BytesMut::with_capacity(capacity);
    buf.put_slice(b"AT+");
    buf.put_slice(name.as_bytes());
    if !args.is_empty() {
        buf.put_u8(b'=');
        buf.put_slice(args.as_bytes());
    }
    buf.put_slice(b"\r\n");
    buf.to_vec()
}

/// Encode a raw configuration command (the whole string after `AT+`).
///
/// Used for caller-supplied reset/config commands that already carry their
/// own `=` and arguments.
pub fn encode_raw(command: &str) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(3 + command.len() + 2);
    buf.put_slice(b"AT+");
    buf.put_slice(command.as_bytes());
    buf.put_slice(b"\r\n");
    buf.to_vec()
}

/// Attempt to decode one frame from a byte buffer.
///
/// Leading CR/LF bytes (left over from a previous frame's terminator) are
/// skipped and counted into `consumed`. Returns [`DecodeResult::Incomplete`]
/// if no complete frame is available yet.
pub fn decode_frame(buf: &[u8]) -> DecodeResult {
    let start = buf
        .iter()
        .take_while(|&&b| b == b'\r' || b == b'\n')
        .count();
    if start >= buf.len() {
        return DecodeResult::Incomplete;
    }
    let body = &buf[start..];

    if body[0] == PROMPT {
        return DecodeResult::Frame {
            frame: Frame::Prompt,
            consumed: start + 1,
        };
    }

    if let Some(result) = try_decode_data_header(body, start) {
        return result;
    }

    // Line-oriented frame: wait for a full line.
    let nl = match body.iter().position(|&b| b == TERMINATOR) {
        Some(pos) => pos,
        None => return DecodeResult::Incomplete,
    };
    let consumed = start + nl + 1;
    let mut line = &body[..nl];
    if line.ends_with(b"\r") {
        line = &line[..line.len() - 1];
    }
    let text = String::from_utf8_lossy(line).into_owned();

    let frame = if text == "+OK" {
        Frame::Ok { fields: Vec::new() }
    } else if let Some(data) = text.strip_prefix("+OK=") {
        Frame::Ok {
            fields: data.split(',').map(str::to_string).collect(),
        }
    } else if text == "+ERR" {
        Frame::Err { code: None }
    } else if let Some(code) = text.strip_prefix("+ERR=") {
        Frame::Err {
            code: Some(code.to_string()),
        }
    } else if let Some(rest) = text.strip_prefix("+EVENT=") {
        let mut parts = rest.split(',').map(str::to_string);
        let category = parts.next().unwrap_or_default();
        Frame::Event {
            category,
            args: parts.collect(),
        }
    } else {
        Frame::Line(text)
    };

    DecodeResult::Frame { frame, consumed }
}

/// Try to decode an inbound-data notification header.
///
/// Returns `None` when `body` is definitely not a data header (so the
/// line-oriented decoder should run), or `Some(Incomplete)` when the bytes
/// so far are consistent with a header but undecided.
fn try_decode_data_header(body: &[u8], start: usize) -> Option<DecodeResult> {
    if !body.starts_with(DATA_EVENT_HEADER) {
        return None;
    }
    let rest = &body[DATA_EVENT_HEADER.len()..];

    let id_end = match rest.iter().position(|b| !b.is_ascii_digit()) {
        Some(pos) => pos,
        // All digits so far; cannot tell a data header from a lifecycle
        // event until the next delimiter arrives.
        None => return Some(DecodeResult::Incomplete),
    };
    if id_end == 0 || rest[id_end] != b',' {
        return None;
    }

    let len_part = &rest[id_end + 1..];
    let len_end = match len_part.iter().position(|b| !b.is_ascii_digit()) {
        Some(pos) => pos,
        None => return Some(DecodeResult::Incomplete),
    };
    if len_end == 0 || len_part[len_end] != b',' {
        return None;
    }

    // The digit runs are bounded by the checks above; parse failures here
    // mean the value is out of range for the target type.
    let id: u8 = std::str::from_utf8(&rest[..id_end]).ok()?.parse().ok()?;
    let len: usize = std::str::from_utf8(&len_part[..len_end])
        .ok()?
        .parse()
        .ok()?;

    let consumed = start + DATA_EVENT_HEADER.len() + id_end + 1 + len_end + 1;
    Some(DecodeResult::Frame {
        frame: Frame::DataHeader { id, len },
        consumed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // Command encoding
    // ---------------------------------------------------------------

    #[test]
    fn encode_bare_command() {
        assert_eq!(encode_command("REBOOT", ""), b"AT+REBOOT\r\n");
    }

    #[test]
    fn encode_command_with_args() {
        assert_eq!(encode_command("DHCP", "ON"), b"AT+DHCP=ON\r\n");
        assert_eq!(
            encode_command("WSTA", "contest,secret123"),
            b"AT+WSTA=contest,secret123\r\n"
        );
    }

    #[test]
    fn encode_raw_passthrough() {
        assert_eq!(encode_raw("UARTE=115200"), b"AT+UARTE=115200\r\n");
        assert_eq!(encode_raw("FACTORY"), b"AT+FACTORY\r\n");
    }

    // ---------------------------------------------------------------
    // Frame decoding -- acknowledgements
    // ---------------------------------------------------------------

    #[test]
    fn decode_bare_ok() {
        match decode_frame(b"+OK\r\n") {
            DecodeResult::Frame { frame, consumed } => {
                assert_eq!(frame, Frame::Ok { fields: vec![] });
                assert_eq!(consumed, 5);
            }
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    #[test]
    fn decode_ok_with_fields() {
        match decode_frame(b"+OK=STA,DHCP,UP,192.168.1.5\r\n") {
            DecodeResult::Frame { frame, .. } => {
                assert_eq!(
                    frame,
                    Frame::Ok {
                        fields: vec![
                            "STA".into(),
                            "DHCP".into(),
                            "UP".into(),
                            "192.168.1.5".into()
                        ]
                    }
                );
            }
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    #[test]
    fn decode_ok_prefix_is_not_ok() {
        // A line merely starting with "+OK" is not an acknowledgement.
        match decode_frame(b"+OKAY\r\n") {
            DecodeResult::Frame { frame, .. } => {
                assert_eq!(frame, Frame::Line("+OKAY".into()));
            }
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    #[test]
    fn decode_err_frames() {
        match decode_frame(b"+ERR\r\n") {
            DecodeResult::Frame { frame, .. } => assert_eq!(frame, Frame::Err { code: None }),
            other => panic!("expected Frame, got {other:?}"),
        }
        match decode_frame(b"+ERR=-3\r\n") {
            DecodeResult::Frame { frame, .. } => {
                assert_eq!(
                    frame,
                    Frame::Err {
                        code: Some("-3".into())
                    }
                );
            }
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    // ---------------------------------------------------------------
    // Frame decoding -- events
    // ---------------------------------------------------------------

    #[test]
    fn decode_link_event() {
        match decode_frame(b"+EVENT=WIFI_LINK,STATION_UP\r\n") {
            DecodeResult::Frame { frame, consumed } => {
                assert_eq!(
                    frame,
                    Frame::Event {
                        category: "WIFI_LINK".into(),
                        args: vec!["STATION_UP".into()],
                    }
                );
                assert_eq!(consumed, 29);
            }
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    #[test]
    fn decode_socket_connect_event() {
        // Non-numeric detail: lifecycle event, not a data header.
        match decode_frame(b"+EVENT=SOCKET,CONNECT,3\r\n") {
            DecodeResult::Frame { frame, .. } => {
                assert_eq!(
                    frame,
                    Frame::Event {
                        category: "SOCKET".into(),
                        args: vec!["CONNECT".into(), "3".into()],
                    }
                );
            }
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    #[test]
    fn decode_socket_disconnect_event() {
        match decode_frame(b"+EVENT=SOCKET,DISCONNECT,3\r\n") {
            DecodeResult::Frame { frame, .. } => {
                assert_eq!(
                    frame,
                    Frame::Event {
                        category: "SOCKET".into(),
                        args: vec!["DISCONNECT".into(), "3".into()],
                    }
                );
            }
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    // ---------------------------------------------------------------
    // Frame decoding -- data headers
    // ---------------------------------------------------------------

    #[test]
    fn decode_data_header() {
        let buf = b"+EVENT=SOCKET,3,5,\x01\x02\x03\x04\x05";
        match decode_frame(buf) {
            DecodeResult::Frame { frame, consumed } => {
                assert_eq!(frame, Frame::DataHeader { id: 3, len: 5 });
                // Header only; the payload stays in the buffer.
                assert_eq!(consumed, 18);
                assert_eq!(&buf[consumed..], &[1, 2, 3, 4, 5]);
            }
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    #[test]
    fn decode_data_header_multidigit() {
        match decode_frame(b"+EVENT=SOCKET,12,1024,") {
            DecodeResult::Frame { frame, consumed } => {
                assert_eq!(frame, Frame::DataHeader { id: 12, len: 1024 });
                assert_eq!(consumed, 22);
            }
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    #[test]
    fn decode_data_header_payload_may_contain_newlines() {
        // The payload is not inspected; only the header is consumed.
        let buf = b"+EVENT=SOCKET,1,4,a\r\nb";
        match decode_frame(buf) {
            DecodeResult::Frame { frame, consumed } => {
                assert_eq!(frame, Frame::DataHeader { id: 1, len: 4 });
                assert_eq!(&buf[consumed..], b"a\r\nb");
            }
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    #[test]
    fn decode_data_header_undecided_without_delimiter() {
        // Digits so far could be a data id or the start of a longer number.
        assert_eq!(decode_frame(b"+EVENT=SOCKET,12"), DecodeResult::Incomplete);
        assert_eq!(
            decode_frame(b"+EVENT=SOCKET,3,51"),
            DecodeResult::Incomplete
        );
    }

    #[test]
    fn decode_numeric_event_line_is_not_a_data_header() {
        // A numeric first arg followed by a line ending instead of a comma.
        match decode_frame(b"+EVENT=SOCKET,7\r\n") {
            DecodeResult::Frame { frame, .. } => {
                assert_eq!(
                    frame,
                    Frame::Event {
                        category: "SOCKET".into(),
                        args: vec!["7".into()],
                    }
                );
            }
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    // ---------------------------------------------------------------
    // Frame decoding -- prompt, noise, and edge cases
    // ---------------------------------------------------------------

    #[test]
    fn decode_prompt() {
        match decode_frame(b">") {
            DecodeResult::Frame { frame, consumed } => {
                assert_eq!(frame, Frame::Prompt);
                assert_eq!(consumed, 1);
            }
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    #[test]
    fn decode_prompt_after_line_endings() {
        match decode_frame(b"\r\n>") {
            DecodeResult::Frame { frame, consumed } => {
                assert_eq!(frame, Frame::Prompt);
                assert_eq!(consumed, 3);
            }
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    #[test]
    fn decode_noise_line() {
        match decode_frame(b"boot v2.14\r\n") {
            DecodeResult::Frame { frame, .. } => {
                assert_eq!(frame, Frame::Line("boot v2.14".into()));
            }
            other => panic!("expected Frame, got {other:?}"),
        }
    }

    #[test]
    fn decode_incomplete_cases() {
        assert_eq!(decode_frame(b""), DecodeResult::Incomplete);
        assert_eq!(decode_frame(b"\r\n"), DecodeResult::Incomplete);
        assert_eq!(decode_frame(b"+OK"), DecodeResult::Incomplete);
        assert_eq!(decode_frame(b"+EVENT=WIFI"), DecodeResult::Incomplete);
    }

    #[test]
    fn decode_consecutive_frames() {
        let buf = b"+OK\r\n+EVENT=WIFI_LINK,STATION_UP\r\n";
        let consumed = match decode_frame(buf) {
            DecodeResult::Frame { frame, consumed } => {
                assert_eq!(frame, Frame::Ok { fields: vec![] });
                consumed
            }
            other => panic!("expected Frame, got {other:?}"),
        };
        match decode_frame(&buf[consumed..]) {
            DecodeResult::Frame { frame, .. } => {
                assert!(matches!(frame, Frame::Event { .. }));
            }
            other => panic!("expected second Frame, got {other:?}"),
        }
    }
}
