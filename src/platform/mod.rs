// LogWarden - platform/mod.rs
//
// Platform abstraction layer: configuration, the log file, the remote
// detector, and stdout.

pub mod config;
pub mod detector;
pub mod fs;
pub mod report;
