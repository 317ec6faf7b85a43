//! Edge Network API
//!
//! Remote surface of the network service: a serialized service object and
//! the HTTP/JSON routes that expose it.

pub mod context;
pub mod error;
pub mod network;
pub mod service;

#[cfg(test)]
mod tests;

pub use error::{ErrorCode, ServiceError};
pub use network::NetworkAPI;
pub use service::NetworkService;
