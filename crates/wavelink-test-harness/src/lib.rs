//! wavelink-test-harness: Test utilities and mock transports for wavelink.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing of
//! protocol engines without requiring real module hardware.

pub mod mock_serial;

pub use mock_serial::MockTransport;
