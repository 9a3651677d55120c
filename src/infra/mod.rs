//! Runtime bootstrap shared by the binary and embedding hosts.

pub mod error;
pub mod telemetry;
