// LogWarden - app/mod.rs
//
// Application layer: the periodic trigger and the per-tick check.
// Dependencies: core layer. Collaborators are reached through the traits in
// `check`, implemented by the platform layer.

pub mod check;
pub mod scheduler;
