//! Edge Network Core
//!
//! Core types shared by the settings engine and its adapters: the native
//! connection profile model, the address codec and the capability traits
//! a network manager backend has to provide.

pub mod addr;
pub mod devices;
pub mod error;
pub mod l2;
pub mod nm;
pub mod settings;

pub use error::{ConfigError, NetworkError, SystemError, ValidationError};
pub use l2::L2Inspector;
pub use nm::{
    ActiveConnection, Connection, Device, DeviceType, Ip4Config, IpAddressData, NetworkManager,
    RouteData,
};
pub use settings::{ConnectionSettings, SettingValue};

/// Result type for network operations
pub type Result<T> = std::result::Result<T, NetworkError>;
