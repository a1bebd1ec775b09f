// Per-resource collectors
pub mod base;
pub mod daemonsets;
pub mod deployments;
pub mod nodes;
pub mod pods;
pub mod statefulsets;
pub mod volumes;

use crate::client::InventoryClient;
use crate::collector::CollectorRegistry;

pub const DAEMONSETS: &str = "daemonsets";
pub const DEPLOYMENTS: &str = "deployments";
pub const NODES: &str = "nodes";
pub const PERSISTENT_VOLUMES: &str = "persistentvolumes";
pub const PERSISTENT_VOLUME_CLAIMS: &str = "persistentvolumeclaims";
pub const PODS: &str = "pods";
pub const STATEFULSETS: &str = "statefulsets";

pub use daemonsets::collect_daemonsets;
pub use deployments::collect_deployments;
pub use nodes::collect_nodes;
pub use pods::collect_pods;
pub use statefulsets::collect_statefulsets;
pub use volumes::{collect_persistent_volume_claims, collect_persistent_volumes};

/// Registry with every built-in resource collector.
pub fn default_registry() -> CollectorRegistry<InventoryClient> {
    CollectorRegistry::new()
        .with(DAEMONSETS, collect_daemonsets)
        .with(DEPLOYMENTS, collect_deployments)
        .with(NODES, collect_nodes)
        .with(PERSISTENT_VOLUMES, collect_persistent_volumes)
        .with(PERSISTENT_VOLUME_CLAIMS, collect_persistent_volume_claims)
        .with(PODS, collect_pods)
        .with(STATEFULSETS, collect_statefulsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_names() {
        let registry = default_registry();
        assert_eq!(
            registry.names(),
            vec![
                "daemonsets",
                "deployments",
                "nodes",
                "persistentvolumeclaims",
                "persistentvolumes",
                "pods",
                "statefulsets",
            ]
        );
    }

    #[test]
    fn test_default_registries_are_independent() {
        let mut first = default_registry();
        first.register("custom", |_ctx| async {});
        assert_eq!(first.len(), 8);
        assert_eq!(default_registry().len(), 7);
    }
}
