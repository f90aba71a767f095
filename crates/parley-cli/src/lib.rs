//! Parley command line
//!
//! `parley serve` runs the relay and chat page; `parley chat` is a terminal
//! client for a running relay.

pub mod cli;
pub mod client;
pub mod commands;
