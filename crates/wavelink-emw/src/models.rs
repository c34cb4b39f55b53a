//! EMW module model definitions.
//!
//! Each model preset carries the defaults that differ between module
//! revisions: baud rate, event-wait budgets, and firmware quirks. The
//! presets feed [`EmwBuilder`](crate::builder::EmwBuilder), which can
//! override any of them.

use std::time::Duration;

/// Per-model configuration for an EMW-series module.
#[derive(Debug, Clone)]
pub struct EmwModel {
    /// Human-readable model name (e.g. "EMW3162").
    pub name: &'static str,
    /// Factory-default serial baud rate.
    pub default_baud_rate: u32,
    /// Local source port used for outbound connection requests.
    pub local_port: u16,
    /// Whether joining an access point requires cycling the station
    /// interface before the link-up event is delivered.
    ///
    /// Firmware revisions disagree on this: some never report the link
    /// coming up unless the interface is toggled after the join command,
    /// others deliver the event unprompted.
    pub link_cycle_quirk: bool,
    /// How long to wait for the device-ready banner after boot.
    pub ready_timeout: Duration,
    /// How long to wait for the link-up event after a join.
    pub link_event_timeout: Duration,
    /// How long to wait for the connect event after a socket open.
    pub connect_event_timeout: Duration,
}

/// The EMW3162 module (early firmware; needs the station-cycle quirk).
pub fn emw3162() -> EmwModel {
    EmwModel {
        name: "EMW3162",
        default_baud_rate: 115_200,
        local_port: 20_001,
        link_cycle_quirk: true,
        ready_timeout: Duration::from_secs(5),
        link_event_timeout: Duration::from_secs(30),
        connect_event_timeout: Duration::from_secs(40),
    }
}

/// The EMW1062 module (later firmware; reports the link unprompted).
pub fn emw1062() -> EmwModel {
    EmwModel {
        name: "EMW1062",
        default_baud_rate: 115_200,
        local_port: 20_001,
        link_cycle_quirk: false,
        ready_timeout: Duration::from_secs(5),
        link_event_timeout: Duration::from_secs(30),
        connect_event_timeout: Duration::from_secs(40),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emw3162_carries_quirk() {
        let model = emw3162();
        assert_eq!(model.name, "EMW3162");
        assert!(model.link_cycle_quirk);
        assert_eq!(model.default_baud_rate, 115_200);
    }

    #[test]
    fn emw1062_omits_quirk() {
        let model = emw1062();
        assert_eq!(model.name, "EMW1062");
        assert!(!model.link_cycle_quirk);
    }
}
