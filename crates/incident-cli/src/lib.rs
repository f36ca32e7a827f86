//! Library side of the `incident-import` binary.

pub mod import;
pub mod logging;
