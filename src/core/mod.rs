// LogWarden - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: app, platform, or any I/O crate directly.

pub mod filter;
pub mod model;
pub mod parser;
pub mod prompt;
