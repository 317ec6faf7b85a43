//! Edge Network NM
//!
//! NetworkManager backend for the settings engine. Profiles travel as
//! `a{sa{sv}}` dictionaries; device, active connection and IPv4 state are
//! read from properties on demand, never cached.

pub mod client;
pub mod convert;
pub mod proxy;

pub use client::NmClient;
