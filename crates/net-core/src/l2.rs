//! Layer-2 (macvlan) inspection seam

use async_trait::async_trait;
use edge_shared_types::L2Conf;

/// Read-only view of the container platform's macvlan reservations.
///
/// Implementations never fail: any lookup problem is reported as an empty
/// [`L2Conf`].
#[async_trait]
pub trait L2Inspector: Send + Sync {
    async fn inspect(&self, interface_name: &str) -> L2Conf;
}

/// Inspector for hosts without a container platform.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoL2;

#[async_trait]
impl L2Inspector for NoL2 {
    async fn inspect(&self, _interface_name: &str) -> L2Conf {
        L2Conf::default()
    }
}
