// src/commands/mod.rs
//! Command handlers for the peerup CLI

mod update;

pub use update::cmd_update;
