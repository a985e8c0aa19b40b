//! System-level modules
//!
//! Process setup that is not part of the link domain: logging today.

pub mod logging;

pub use logging::init_logging;
