//! Edge Network Apply
//!
//! Settings transaction engine: translation to connection profiles,
//! backup and rollback, gateway coordination and the observed-state query.

pub mod backup;
pub mod gateway;
pub mod query;
pub mod replace;
pub mod transaction;
pub mod translate;


pub use gateway::GatewayCoordinator;
pub use query::InterfaceQuery;
pub use transaction::{ApplyResult, NetworkApplier, Transaction, TransactionState};
pub use translate::{to_interface, to_profile};
