// LogWarden - lib.rs
//
// Library entry point, exposing all modules for integration testing.
// The binary in `main.rs` only wires configuration to the run loop.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
