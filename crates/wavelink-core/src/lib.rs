//! wavelink-core: Core traits, types, and error definitions for wavelink.
//!
//! This crate defines the module-agnostic abstractions that wavelink drivers
//! implement. Applications depend on these types without pulling in any
//! specific module driver or transport.
//!
//! # Key types
//!
//! - [`WifiModule`] -- the unified trait for driving a serial Wi-Fi module
//! - [`Transport`] -- byte-level communication channel
//! - [`WifiEvent`] -- asynchronous state change notifications
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod events;
pub mod module;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use wavelink_core::*`.
pub use error::{Error, Result};
pub use events::WifiEvent;
pub use module::WifiModule;
pub use transport::Transport;
pub use types::*;
