//! wavelink-emw: Driver for EMW-series serial Wi-Fi modules.
//!
//! EMW modules expose a text AT command set over a serial line. Commands are
//! answered synchronously with `+OK`/`+ERR` frames, but the module also pushes
//! unsolicited `+EVENT=...` notifications (link changes, socket lifecycle,
//! inbound data) that can interleave with any reply. This crate turns that
//! multiplexed byte stream into the socket-like [`WifiModule`] API:
//!
//! - [`protocol`] -- the AT frame grammar (encode/decode, no I/O)
//! - [`commands`] -- pure command builders and reply parsers
//! - [`queue`] -- the inbound data reassembly queue
//! - [`channel`] -- the command/response matcher with inline event intake
//! - `waiter` -- the bring-up event classifier
//! - [`driver`] -- [`EmwDriver`], the [`WifiModule`] implementation
//! - [`builder`] / [`models`] -- configuration
//!
//! [`WifiModule`]: wavelink_core::WifiModule

pub mod builder;
pub mod channel;
pub mod commands;
pub mod driver;
pub mod models;
pub mod protocol;
pub mod queue;
pub(crate) mod waiter;

pub use builder::EmwBuilder;
pub use driver::EmwDriver;
pub use models::{emw1062, emw3162, EmwModel};
