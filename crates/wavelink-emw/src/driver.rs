//! EmwDriver -- the [`WifiModule`] implementation for EMW-series modules.
//!
//! This module ties the AT grammar ([`protocol`](crate::protocol),
//! [`commands`](crate::commands)) to a [`Transport`] through an
//! [`AtChannel`] to produce a working module driver. It handles the
//! first-boot provisioning fallback, the join/leave lifecycle, the socket
//! open/send/receive/close sequences, and the retry budgets for each.
//!
//! A single caller drives the whole session: every operation takes
//! `&mut self` and runs to completion (or its timeout) before another can
//! start. Unsolicited module traffic observed while an operation waits is
//! serviced inline by the channel; in particular, inbound data for any
//! socket is absorbed into the packet queue as a side effect of whatever
//! wait happens to be in progress.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info};

use wavelink_core::error::{Error, Result};
use wavelink_core::events::WifiEvent;
use wavelink_core::module::WifiModule;
use wavelink_core::transport::Transport;
use wavelink_core::types::{SocketId, SocketType};

use crate::channel::AtChannel;
use crate::commands;
use crate::models::EmwModel;
use crate::waiter;

/// Reboot attempts before falling back to factory provisioning.
const REBOOT_ATTEMPTS: u32 = 3;

/// Attempts for configuration commands (`reset`).
const CONFIG_ATTEMPTS: u32 = 2;

/// Attempts for the data-send sequence (the module may be busy).
const SEND_ATTEMPTS: u32 = 2;

/// Attempts for the socket close sequence.
const CLOSE_ATTEMPTS: u32 = 2;

/// Reply wait for a single reboot attempt. Much shorter than the ambient
/// timeout: an unresponsive module should fall through to the next attempt
/// quickly.
const REBOOT_ACK_TIMEOUT: Duration = Duration::from_secs(1);

/// A connected EMW-series Wi-Fi module.
///
/// Constructed via [`EmwBuilder`](crate::builder::EmwBuilder). All module
/// communication goes through the [`Transport`] provided at build time.
pub struct EmwDriver {
    channel: AtChannel,
    model: EmwModel,
    event_tx: broadcast::Sender<WifiEvent>,
    /// Last-fetched query results. Not authoritative; refreshed on demand.
    last_ip: Option<String>,
    last_mac: Option<String>,
    last_rssi: Option<i8>,
}

impl EmwDriver {
    /// Create a new `EmwDriver` from its constituent parts.
    ///
    /// This is called by [`EmwBuilder`](crate::builder::EmwBuilder);
    /// callers should use the builder API instead.
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        model: EmwModel,
        command_timeout: Duration,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        EmwDriver {
            channel: AtChannel::new(transport, command_timeout),
            model,
            event_tx,
            last_ip: None,
            last_mac: None,
            last_rssi: None,
        }
    }

    /// The resolved model configuration this driver runs with.
    pub fn model(&self) -> &EmwModel {
        &self.model
    }

    /// The ambient reply timeout currently in effect.
    pub fn command_timeout(&self) -> Duration {
        self.channel.timeout()
    }

    /// The IP address reported by the most recent successful query.
    pub fn last_ip(&self) -> Option<&str> {
        self.last_ip.as_deref()
    }

    /// The MAC address reported by the most recent successful query.
    pub fn last_mac(&self) -> Option<&str> {
        self.last_mac.as_deref()
    }

    /// The signal strength reported by the most recent successful query.
    pub fn last_rssi(&self) -> Option<i8> {
        self.last_rssi
    }

    /// Send a command and wait for its acknowledgement.
    async fn command_with_ack(&mut self, cmd: &[u8]) -> Result<Vec<String>> {
        self.channel.send_command(cmd).await?;
        self.channel.expect_ack().await
    }

    /// Bind the inbound-data intake to this driver's event channel.
    fn arm_intake(&mut self) {
        self.channel.arm_data_intake(self.event_tx.clone());
    }

    /// First-boot factory provisioning.
    ///
    /// Escapes into command mode with the `+++`/`a` handshake, then walks
    /// the factory command sequence. Every step must acknowledge.
    async fn provision(&mut self) -> Result<()> {
        info!("reboot unacknowledged, entering factory provisioning");
        self.channel.write_raw(b"+++").await?;
        self.channel.expect_token(b"a").await?;
        self.channel.write_raw(b"a").await?;
        self.channel.expect_ack().await?;

        self.arm_intake();

        self.command_with_ack(&commands::cmd_factory_mode()).await?;
        self.command_with_ack(&commands::cmd_factory_events())
            .await?;
        self.command_with_ack(&commands::cmd_factory_reset())
            .await?;
        debug!("factory provisioning complete");
        Ok(())
    }

    /// Query the station interface state and cycle it so the module emits
    /// a fresh link event: OFF then ON when currently ON, just ON when OFF.
    async fn cycle_station_interface(&mut self) -> Result<()> {
        self.channel
            .send_command(&commands::cmd_station_query())
            .await?;
        let fields = self.channel.expect_ack().await?;
        let on = commands::parse_switch_state(&fields)?;

        if on {
            debug!("station interface up, cycling");
            self.command_with_ack(&commands::cmd_station(false)).await?;
        }
        self.command_with_ack(&commands::cmd_station(true)).await?;
        Ok(())
    }

    /// Query the per-connection reporting state and cycle it so the module
    /// emits a fresh connect event for the pending open.
    async fn cycle_socket_reporting(&mut self) -> Result<()> {
        self.channel
            .send_command(&commands::cmd_conf_query())
            .await?;
        let fields = self.channel.expect_ack().await?;
        let on = commands::parse_switch_state(&fields)?;

        if on {
            debug!("connection reporting on, cycling");
            self.command_with_ack(&commands::cmd_conf(false)).await?;
        }
        self.command_with_ack(&commands::cmd_conf(true)).await?;
        Ok(())
    }

    /// One full data-send exchange: header, prompt, payload, ack.
    async fn try_send(&mut self, id: SocketId, data: &[u8]) -> Result<()> {
        self.channel
            .send_command(&commands::cmd_send_header(id, data.len()))
            .await?;
        self.channel.expect_prompt().await?;
        self.channel.write_raw(data).await?;
        self.channel.expect_ack().await?;
        Ok(())
    }

    /// One full close exchange: disable reporting, then the disconnect
    /// event for this id.
    async fn try_close(&mut self, id: SocketId) -> Result<()> {
        self.command_with_ack(&commands::cmd_conf(false)).await?;
        let budget = self.channel.timeout();
        self.channel
            .wait_event(budget, |_category, args| {
                args.first().map(String::as_str) == Some("DISCONNECT")
                    && args.get(1).and_then(|s| s.trim().parse::<u8>().ok()) == Some(id.raw())
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl WifiModule for EmwDriver {
    async fn startup(&mut self) -> Result<()> {
        let mut acked = false;
        for attempt in 0..REBOOT_ATTEMPTS {
            debug!(attempt, "sending reboot");
            self.channel.send_command(&commands::cmd_reboot()).await?;

            // Scoped timeout override: a reboot attempt gets a short ack
            // wait, restored before any other wait runs.
            let saved = self.channel.timeout();
            self.channel.set_timeout(REBOOT_ACK_TIMEOUT);
            let ack = self.channel.expect_ack().await;
            self.channel.set_timeout(saved);

            if ack.is_ok() {
                acked = true;
                break;
            }
        }

        if !acked {
            self.provision().await?;
        }

        self.arm_intake();
        waiter::await_ready_banner(&mut self.channel, self.model.ready_timeout).await?;
        let _ = self.event_tx.send(WifiEvent::Ready);
        Ok(())
    }

    async fn reset(&mut self, command: &str) -> Result<()> {
        let cmd = commands::cmd_raw(command);
        let mut last = Error::Timeout;
        for attempt in 0..CONFIG_ATTEMPTS {
            if attempt > 0 {
                debug!(attempt, command, "retrying config command");
            }
            match self.command_with_ack(&cmd).await {
                Ok(_) => return Ok(()),
                Err(e) => last = e,
            }
        }
        Err(last)
    }

    async fn dhcp(&mut self, enable: bool) -> Result<()> {
        debug!(enable, "setting DHCP");
        self.command_with_ack(&commands::cmd_dhcp(enable)).await?;
        Ok(())
    }

    async fn set_channel(&mut self, channel: u8) -> Result<()> {
        if channel == 0 || channel > 14 {
            return Err(Error::InvalidParameter(format!(
                "channel {channel} out of range 1-14"
            )));
        }
        debug!(channel, "selecting AP channel");
        self.command_with_ack(&commands::cmd_set_ap_channel(channel))
            .await?;
        Ok(())
    }

    async fn connect(&mut self, ssid: &str, passphrase: &str) -> Result<()> {
        debug!(ssid, "joining access point");
        self.command_with_ack(&commands::cmd_join(ssid, passphrase))
            .await?;

        if self.model.link_cycle_quirk {
            self.cycle_station_interface().await?;
        }

        waiter::await_link_event(&mut self.channel, self.model.link_event_timeout).await?;
        let _ = self.event_tx.send(WifiEvent::LinkUp);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        debug!("leaving access point");
        self.channel
            .send_command(&commands::cmd_station(false))
            .await?;

        // The module reports the link going down before it acknowledges
        // the command; consume them in that order.
        let budget = self.channel.timeout();
        self.channel
            .wait_event(budget, |category, args| {
                category == "WIFI_LINK"
                    && args.first().map(String::as_str) == Some("STATION_DOWN")
            })
            .await?;
        self.channel.expect_ack().await?;

        let _ = self.event_tx.send(WifiEvent::LinkDown);
        Ok(())
    }

    async fn ip_address(&mut self) -> Result<String> {
        self.channel
            .send_command(&commands::cmd_ip_config())
            .await?;
        let fields = self.channel.expect_ack().await?;
        let ip = commands::parse_ip_fields(&fields)?;
        self.last_ip = Some(ip.clone());
        Ok(ip)
    }

    async fn mac_address(&mut self) -> Result<String> {
        self.channel
            .send_command(&commands::cmd_mac_query())
            .await?;
        let fields = self.channel.expect_ack().await?;
        let mac = commands::parse_mac_field(&fields)?;
        self.last_mac = Some(mac.clone());
        Ok(mac)
    }

    async fn rssi(&mut self) -> Result<i8> {
        self.channel
            .send_command(&commands::cmd_link_query())
            .await?;
        let fields = self.channel.expect_ack().await?;
        let rssi = commands::parse_rssi_fields(&fields)?;
        self.last_rssi = Some(rssi);
        Ok(rssi)
    }

    async fn is_connected(&mut self) -> bool {
        self.ip_address().await.is_ok()
    }

    async fn open(&mut self, kind: SocketType, addr: &str, port: u16) -> Result<SocketId> {
        debug!(%kind, addr, port, "opening connection");
        self.command_with_ack(&commands::cmd_open(
            kind,
            self.model.local_port,
            port,
            addr,
        ))
        .await?;

        self.cycle_socket_reporting().await?;

        let (_, args) = self
            .channel
            .wait_event(self.model.connect_event_timeout, |category, args| {
                category == "SOCKET" && args.first().map(String::as_str) == Some("CONNECT")
            })
            .await?;
        let id = commands::parse_socket_id(&args)?;

        debug!(%id, "connection open");
        let _ = self.event_tx.send(WifiEvent::SocketConnected { id });
        Ok(id)
    }

    async fn send(&mut self, id: SocketId, data: &[u8]) -> Result<()> {
        // May take a second try if the module is busy.
        let mut last = Error::Timeout;
        for attempt in 0..SEND_ATTEMPTS {
            if attempt > 0 {
                debug!(%id, attempt, "retrying send");
            }
            match self.try_send(id, data).await {
                Ok(()) => return Ok(()),
                Err(e) => last = e,
            }
        }
        Err(last)
    }

    async fn recv(&mut self, id: SocketId, buf: &mut [u8]) -> Result<usize> {
        loop {
            if let Some(bytes) = self.channel.take_packet(id, buf.len()) {
                buf[..bytes.len()].copy_from_slice(&bytes);
                return Ok(bytes.len());
            }

            // Nothing queued for this id: block on the next recognizable
            // frame. The armed intake may queue data for us as a side
            // effect of this wait; anything else is simply discarded and
            // we rescan.
            self.channel.next_frame().await?;
        }
    }

    async fn close(&mut self, id: SocketId) -> Result<()> {
        debug!(%id, "closing connection");
        let mut last = Error::Timeout;
        for attempt in 0..CLOSE_ATTEMPTS {
            if attempt > 0 {
                debug!(%id, attempt, "retrying close");
            }
            match self.try_close(id).await {
                Ok(()) => {
                    let _ = self.event_tx.send(WifiEvent::SocketDisconnected { id });
                    return Ok(());
                }
                Err(e) => last = e,
            }
        }
        Err(last)
    }

    fn subscribe(&self) -> broadcast::Receiver<WifiEvent> {
        self.event_tx.subscribe()
    }
}
