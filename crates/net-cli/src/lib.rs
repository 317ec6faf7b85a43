//! Edge Network CLI
//!
//! Operator commands for listing, validating and applying ethernet
//! settings and for maintaining the label map. Commands talk to
//! NetworkManager directly through the same service the daemon uses.

pub mod commands;
pub mod render;

#[cfg(test)]
mod tests;
