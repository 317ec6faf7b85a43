//! Container Integration for the edge network service
//!
//! Read-only view of docker macvlan networks: which address pool a
//! container network reserves on a physical interface.

pub mod command;
pub mod docker;
pub mod error;

pub use command::{CommandOutput, CommandRunner, ProcessRunner};
pub use docker::DockerL2Inspector;
pub use error::{ContainerError, Result};
