//! # wavelink -- Socket-Like Control of Serial Wi-Fi Modules
//!
//! `wavelink` is an asynchronous Rust library for driving serial-attached
//! Wi-Fi radio modules that speak a text AT command set. It turns the
//! module's single multiplexed byte stream -- synchronous command replies
//! interleaved with unsolicited event notifications -- into a socket-like
//! API: join an access point, open a connection, send and receive bytes,
//! close.
//!
//! ## Quick Start
//!
//! Add `wavelink` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! wavelink = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Boot a module, join a network, and talk to a server:
//!
//! ```no_run
//! use wavelink::{SocketType, WifiModule};
//! use wavelink::emw::{models::emw3162, EmwBuilder};
//!
//! #[tokio::main]
//! async fn main() -> wavelink::Result<()> {
//!     let mut module = EmwBuilder::new(emw3162())
//!         .serial_port("/dev/ttyUSB0")
//!         .build()
//!         .await?;
//!
//!     module.startup().await?;
//!     module.connect("myssid", "passphrase").await?;
//!
//!     let id = module.open(SocketType::Client, "192.168.1.10", 8080).await?;
//!     module.send(id, b"hello").await?;
//!
//!     let mut buf = [0u8; 256];
//!     let n = module.recv(id, &mut buf).await?;
//!     println!("got {} bytes", n);
//!
//!     module.close(id).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                   | Purpose                                       |
//! |-------------------------|-----------------------------------------------|
//! | `wavelink-core`         | Traits ([`WifiModule`], [`Transport`]), types, errors |
//! | `wavelink-transport`    | Serial transport implementation               |
//! | `wavelink-emw`          | EMW-series AT protocol driver                 |
//! | `wavelink-test-harness` | Mock transport for protocol testing           |
//! | **`wavelink`**          | This facade crate -- re-exports everything    |
//!
//! Application code works with `dyn WifiModule` and stays agnostic of the
//! specific module family's AT dialect.
//!
//! ## Event Subscription
//!
//! Drivers emit [`WifiEvent`]s through a broadcast channel: link up/down,
//! socket connect/disconnect, and inbound data arrivals. Subscribe for
//! monitoring without polling:
//!
//! ```no_run
//! use wavelink::{WifiEvent, WifiModule};
//! # async fn example(module: &dyn WifiModule) {
//! let mut events = module.subscribe();
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         WifiEvent::LinkDown => eprintln!("lost the access point"),
//!         WifiEvent::DataReceived { id, len } => {
//!             println!("{id}: {len} bytes queued");
//!         }
//!         other => println!("{other:?}"),
//!     }
//! }
//! # }
//! ```
//!
//! ## Blocking Semantics
//!
//! Every operation awaits up to its timeout and reports failure as an
//! `Err` value. A single caller drives the whole session; unsolicited
//! module traffic observed during any wait is serviced inline as a side
//! effect of that wait.

pub use wavelink_core::{
    Error, Result, SocketId, SocketType, Transport, WifiEvent, WifiModule,
};

/// EMW-series module driver.
pub mod emw {
    pub use wavelink_emw::builder::EmwBuilder;
    pub use wavelink_emw::driver::EmwDriver;
    pub use wavelink_emw::{models, protocol};
}

/// Transport implementations.
pub mod transport {
    pub use wavelink_transport::{SerialConfig, SerialTransport};
}
