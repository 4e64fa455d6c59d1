//! Glue between the command line and the library crates.
//!
//! Logging setup, the network-backed fetch pipeline and result export.

pub(crate) mod logging;
pub(crate) mod pipeline;
