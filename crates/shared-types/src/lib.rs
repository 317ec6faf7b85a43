pub mod error;
pub mod network;

pub use error::{SharedResult, SharedTypeError};
pub use network::{
    DhcpMode, DnsConf, Interface, L2Conf, NetworkSettings, StaticConf, Target,
};
