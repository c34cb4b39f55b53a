//! EMW AT command builders and reply parsers.
//!
//! This module provides functions to construct command byte sequences for
//! the module operations (reboot, join, socket open/send, queries) and to
//! parse the corresponding `+OK=` field lists.
//!
//! All functions are pure -- they produce or consume byte vectors / string
//! slices without performing any I/O. The caller is responsible for sending
//! the bytes over a channel and feeding received fields back into the
//! parsers.

use wavelink_core::{Error, Result, SocketId, SocketType};

use crate::protocol::{encode_command, encode_raw};

/// Position of the IP address in the `AT+IPCONFIG` reply field list
/// (`<if>,<dhcp>,<status>,<ip>,<netmask>,<gateway>`).
const IPCONFIG_IP_FIELD: usize = 3;

/// Position of the RSSI value in the `AT+WLINK` reply field list
/// (`<status>,<rssi>,<ssid>`).
const WLINK_RSSI_FIELD: usize = 1;

// ---------------------------------------------------------------
// Command builders
// ---------------------------------------------------------------

/// Build the reboot command (`AT+REBOOT`).
pub fn cmd_reboot() -> Vec<u8> {
    encode_command("REBOOT", "")
}

/// Build a caller-supplied configuration command (`AT+<command>`).
pub fn cmd_raw(command: &str) -> Vec<u8> {
    encode_raw(command)
}

/// Build the "leave factory command mode" command (`AT+FMODE=AT_NONE`).
pub fn cmd_factory_mode() -> Vec<u8> {
    encode_command("FMODE", "AT_NONE")
}

/// Build the "enable factory event reporting" command (`AT+FEVENT=ON`).
pub fn cmd_factory_events() -> Vec<u8> {
    encode_command("FEVENT", "ON")
}

/// Build the "restore factory defaults" command (`AT+FACTORY`).
pub fn cmd_factory_reset() -> Vec<u8> {
    encode_command("FACTORY", "")
}

/// Build a DHCP enable/disable command (`AT+DHCP=ON|OFF`).
pub fn cmd_dhcp(on: bool) -> Vec<u8> {
    encode_command("DHCP", if on { "ON" } else { "OFF" })
}

/// Build the access-point join command (`AT+WSTA=<ssid>,<passphrase>`).
pub fn cmd_join(ssid: &str, passphrase: &str) -> Vec<u8> {
    encode_command("WSTA", &format!("{ssid},{passphrase}"))
}

/// Build the station-interface state query (`AT+WLANF`).
pub fn cmd_station_query() -> Vec<u8> {
    encode_command("WLANF", "")
}

/// Build a station-interface enable/disable command
/// (`AT+WLANF=STA,ON|OFF`).
pub fn cmd_station(on: bool) -> Vec<u8> {
    encode_command("WLANF", if on { "STA,ON" } else { "STA,OFF" })
}

/// Build the access-point channel select command (`AT+WAPCH=<n>`).
pub fn cmd_set_ap_channel(channel: u8) -> Vec<u8> {
    encode_command("WAPCH", &channel.to_string())
}

/// Build the IP configuration query (`AT+IPCONFIG`).
pub fn cmd_ip_config() -> Vec<u8> {
    encode_command("IPCONFIG", "")
}

/// Build the MAC address query (`AT+WMAC`).
pub fn cmd_mac_query() -> Vec<u8> {
    encode_command("WMAC", "")
}

/// Build the link status query (`AT+WLINK`).
pub fn cmd_link_query() -> Vec<u8> {
    encode_command("WLINK", "")
}

/// Build a connect-request command
/// (`AT+CON1=<TYPE>,<local_port>,<remote_port>,<addr>`).
pub fn cmd_open(kind: SocketType, local_port: u16, remote_port: u16, addr: &str) -> Vec<u8> {
    encode_command(
        "CON1",
        &format!("{},{local_port},{remote_port},{addr}", kind.token()),
    )
}

/// Build the per-connection reporting state query (`AT+CONF=1`).
pub fn cmd_conf_query() -> Vec<u8> {
    encode_command("CONF", "1")
}

/// Build a per-connection reporting enable/disable command
/// (`AT+CONF=1,ON|OFF`).
pub fn cmd_conf(on: bool) -> Vec<u8> {
    encode_command("CONF", if on { "1,ON" } else { "1,OFF" })
}

/// Build a data-send request header (`AT+SSEND=<id>,<len>`).
///
/// The module answers with the `>` prompt, after which exactly `len` raw
/// payload bytes are expected.
pub fn cmd_send_header(id: SocketId, len: usize) -> Vec<u8> {
    encode_command("SSEND", &format!("{},{len}", id.raw()))
}

// ---------------------------------------------------------------
// Reply parsers
// ---------------------------------------------------------------

/// Parse the station IP address out of an `AT+IPCONFIG` reply.
pub fn parse_ip_fields(fields: &[String]) -> Result<String> {
    let ip = fields
        .get(IPCONFIG_IP_FIELD)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Protocol(format!("malformed IPCONFIG reply: {fields:?}")))?;
    Ok(ip.clone())
}

/// Parse the MAC address out of an `AT+WMAC` reply.
pub fn parse_mac_field(fields: &[String]) -> Result<String> {
    let mac = fields
        .first()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Protocol(format!("malformed WMAC reply: {fields:?}")))?;
    Ok(mac.clone())
}

/// Parse the signal strength out of an `AT+WLINK` reply.
pub fn parse_rssi_fields(fields: &[String]) -> Result<i8> {
    let raw = fields
        .get(WLINK_RSSI_FIELD)
        .ok_or_else(|| Error::Protocol(format!("malformed WLINK reply: {fields:?}")))?;
    raw.trim()
        .parse()
        .map_err(|e| Error::Protocol(format!("invalid RSSI value {raw:?} ({e})")))
}

/// Parse an ON/OFF switch state from the last field of a query reply.
///
/// Both the `AT+WLANF` and `AT+CONF=1` queries report their state as a
/// trailing `ON`/`OFF` field. An unrecognized state is an error: the
/// toggle sequences must not guess.
pub fn parse_switch_state(fields: &[String]) -> Result<bool> {
    match fields.last().map(|s| s.trim()) {
        Some("ON") => Ok(true),
        Some("OFF") => Ok(false),
        _ => Err(Error::Protocol(format!(
            "unrecognized switch state in reply: {fields:?}"
        ))),
    }
}

/// Parse the socket id out of a `+EVENT=SOCKET,CONNECT,<id>` event's
/// argument list.
pub fn parse_socket_id(args: &[String]) -> Result<SocketId> {
    let raw = args
        .get(1)
        .ok_or_else(|| Error::Protocol(format!("connect event missing socket id: {args:?}")))?;
    let id: u8 = raw
        .trim()
        .parse()
        .map_err(|e| Error::Protocol(format!("invalid socket id {raw:?} ({e})")))?;
    Ok(SocketId::from_raw(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // Command encoding
    // ---------------------------------------------------------------

    #[test]
    fn encode_reboot() {
        assert_eq!(cmd_reboot(), b"AT+REBOOT\r\n");
    }

    #[test]
    fn encode_raw_config() {
        assert_eq!(cmd_raw("UARTE=115200"), b"AT+UARTE=115200\r\n");
    }

    #[test]
    fn encode_factory_sequence() {
        assert_eq!(cmd_factory_mode(), b"AT+FMODE=AT_NONE\r\n");
        assert_eq!(cmd_factory_events(), b"AT+FEVENT=ON\r\n");
        assert_eq!(cmd_factory_reset(), b"AT+FACTORY\r\n");
    }

    #[test]
    fn encode_dhcp() {
        assert_eq!(cmd_dhcp(true), b"AT+DHCP=ON\r\n");
        assert_eq!(cmd_dhcp(false), b"AT+DHCP=OFF\r\n");
    }

    #[test]
    fn encode_join() {
        assert_eq!(
            cmd_join("contest", "secret123"),
            b"AT+WSTA=contest,secret123\r\n"
        );
    }

    #[test]
    fn encode_station_commands() {
        assert_eq!(cmd_station_query(), b"AT+WLANF\r\n");
        assert_eq!(cmd_station(true), b"AT+WLANF=STA,ON\r\n");
        assert_eq!(cmd_station(false), b"AT+WLANF=STA,OFF\r\n");
    }

    #[test]
    fn encode_ap_channel() {
        assert_eq!(cmd_set_ap_channel(6), b"AT+WAPCH=6\r\n");
        assert_eq!(cmd_set_ap_channel(11), b"AT+WAPCH=11\r\n");
    }

    #[test]
    fn encode_queries() {
        assert_eq!(cmd_ip_config(), b"AT+IPCONFIG\r\n");
        assert_eq!(cmd_mac_query(), b"AT+WMAC\r\n");
        assert_eq!(cmd_link_query(), b"AT+WLINK\r\n");
    }

    #[test]
    fn encode_open() {
        assert_eq!(
            cmd_open(SocketType::Client, 20001, 8080, "192.168.1.10"),
            b"AT+CON1=CLIENT,20001,8080,192.168.1.10\r\n"
        );
        assert_eq!(
            cmd_open(SocketType::Broadcast, 20001, 5000, "255.255.255.255"),
            b"AT+CON1=BROADCAST,20001,5000,255.255.255.255\r\n"
        );
    }

    #[test]
    fn encode_conf_commands() {
        assert_eq!(cmd_conf_query(), b"AT+CONF=1\r\n");
        assert_eq!(cmd_conf(true), b"AT+CONF=1,ON\r\n");
        assert_eq!(cmd_conf(false), b"AT+CONF=1,OFF\r\n");
    }

    #[test]
    fn encode_send_header() {
        assert_eq!(
            cmd_send_header(SocketId::from_raw(3), 128),
            b"AT+SSEND=3,128\r\n"
        );
    }

    // ---------------------------------------------------------------
    // Reply parsing
    // ---------------------------------------------------------------

    fn fields(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_ip_from_ipconfig_reply() {
        let reply = fields(&[
            "STA",
            "DHCP",
            "UP",
            "192.168.1.42",
            "255.255.255.0",
            "192.168.1.1",
        ]);
        assert_eq!(parse_ip_fields(&reply).unwrap(), "192.168.1.42");
    }

    #[test]
    fn parse_ip_rejects_short_reply() {
        assert!(parse_ip_fields(&fields(&["STA", "DHCP"])).is_err());
        assert!(parse_ip_fields(&fields(&["STA", "DHCP", "UP", ""])).is_err());
    }

    #[test]
    fn parse_mac_from_wmac_reply() {
        let reply = fields(&["C8:93:46:00:11:22"]);
        assert_eq!(parse_mac_field(&reply).unwrap(), "C8:93:46:00:11:22");
    }

    #[test]
    fn parse_mac_rejects_empty_reply() {
        assert!(parse_mac_field(&[]).is_err());
        assert!(parse_mac_field(&fields(&[""])).is_err());
    }

    #[test]
    fn parse_rssi_from_wlink_reply() {
        let reply = fields(&["UP", "-62", "contest"]);
        assert_eq!(parse_rssi_fields(&reply).unwrap(), -62);
    }

    #[test]
    fn parse_rssi_rejects_garbage() {
        assert!(parse_rssi_fields(&fields(&["UP", "weak", "contest"])).is_err());
        assert!(parse_rssi_fields(&fields(&["UP"])).is_err());
    }

    #[test]
    fn parse_switch_states() {
        assert!(parse_switch_state(&fields(&["STA", "ON"])).unwrap());
        assert!(!parse_switch_state(&fields(&["STA", "OFF"])).unwrap());
        assert!(parse_switch_state(&fields(&["ON"])).unwrap());
    }

    #[test]
    fn parse_switch_state_rejects_unknown() {
        assert!(parse_switch_state(&fields(&["STA", "MAYBE"])).is_err());
        assert!(parse_switch_state(&[]).is_err());
    }

    #[test]
    fn parse_socket_id_from_connect_event() {
        let args = fields(&["CONNECT", "3"]);
        assert_eq!(parse_socket_id(&args).unwrap(), SocketId::from_raw(3));
    }

    #[test]
    fn parse_socket_id_rejects_malformed_event() {
        assert!(parse_socket_id(&fields(&["CONNECT"])).is_err());
        assert!(parse_socket_id(&fields(&["CONNECT", "three"])).is_err());
    }
}
