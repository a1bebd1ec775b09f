use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::sink::Accumulator;
use crate::types::Config;

/// Everything a collector routine gets for one poll.
#[derive(Clone)]
pub struct CollectContext<C> {
    pub client: C,
    pub acc: Arc<dyn Accumulator>,
    pub config: Arc<Config>,
    /// Cancelled when the owning gatherer shuts down.
    pub cancel: CancellationToken,
}

/// A collector routine. It returns nothing: failures are reported through
/// `ctx.acc` by the routine itself.
pub type CollectFn<C> = Arc<dyn Fn(CollectContext<C>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Named set of collector routines. Read-only while polls run.
pub struct CollectorRegistry<C> {
    collectors: BTreeMap<String, CollectFn<C>>,
}

impl<C: 'static> CollectorRegistry<C> {
    pub fn new() -> Self {
        Self {
            collectors: BTreeMap::new(),
        }
    }

    /// Registers a routine under `name`, replacing any routine already there.
    pub fn register<F, Fut>(&mut self, name: impl Into<String>, routine: F) -> &mut Self
    where
        F: Fn(CollectContext<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let routine: CollectFn<C> =
            Arc::new(move |ctx: CollectContext<C>| -> BoxFuture<'static, ()> { Box::pin(routine(ctx)) });
        self.collectors.insert(name.into(), routine);
        self
    }

    pub fn with<F, Fut>(mut self, name: impl Into<String>, routine: F) -> Self
    where
        F: Fn(CollectContext<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(name, routine);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CollectFn<C>> {
        self.collectors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collectors.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.collectors.keys().map(|k| k.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CollectFn<C>)> {
        self.collectors.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}

impl<C: 'static> Default for CollectorRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for CollectorRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            collectors: self.collectors.clone(),
        }
    }
}

impl<C: 'static> fmt::Debug for CollectorRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorRegistry")
            .field("collectors", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn noop(_ctx: CollectContext<()>) {}

    #[test]
    fn test_register_and_lookup() {
        let registry = CollectorRegistry::<()>::new()
            .with("pods", noop)
            .with("nodes", noop);

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("pods"));
        assert!(registry.get("nodes").is_some());
        assert!(registry.get("deployments").is_none());
        assert_eq!(registry.names(), vec!["nodes", "pods"]);
    }

    #[test]
    fn test_register_replaces_existing_name() {
        let mut registry = CollectorRegistry::<()>::new();
        registry.register("pods", noop);
        registry.register("pods", noop);

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_clone_is_independent() {
        let registry = CollectorRegistry::<()>::new().with("pods", noop);
        let mut copy = registry.clone();
        copy.register("nodes", noop);

        assert_eq!(registry.len(), 1);
        assert_eq!(copy.len(), 2);
        assert!(CollectorRegistry::<()>::default().is_empty());
    }
}
