//! cellprobe exporter library entry.
//!
//! Wires config, the modem HTTP client, the poller, and the metrics registry
//! behind an axum router. Consumed by the binary (`main.rs`) and by the
//! integration tests.

pub mod app_state;
pub mod config;
pub mod modem;
pub mod obs;
pub mod ops;
pub mod poller;
pub mod router;
