//! Modem response formats.
//!
//! Only the Quectel `AT+QENG="servingcell"` report is understood today.
//! Parsers here are panic-free: positions are looked up with `get`, never
//! indexed directly, and every bad shape is reported as a `ParseError`.

pub mod servingcell;
