//! Edge Network Test
//!
//! Stateful fakes of the external collaborators (network manager, label
//! store, L2 inspector) for exercising the settings engine without a
//! system bus.

pub mod labels;
pub mod l2;
pub mod nm;


pub use l2::StaticL2;
pub use labels::MemoryLabelStore;
pub use nm::{FakeNetworkManager, Op};
