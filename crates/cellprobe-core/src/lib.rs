//! cellprobe core: the serving-cell reading model, the AT response parser,
//! and the error surface shared with the exporter.
//!
//! This crate carries no HTTP, async, or runtime dependencies so the parser
//! can be tested and reused on its own.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Modem output is untrusted text: every malformed shape must surface as a
//! `ParseError` so one bad response never takes the exporter down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod reading;

/// Shared error and result types.
pub use error::{CellProbeError, ErrorKind, ParseError, Result};
pub use reading::{HttpProbe, Reading};
