use std::collections::BTreeSet;
use tracing::warn;

use super::registry::{CollectFn, CollectorRegistry};
use crate::error::SelectError;

/// Collectors chosen for a single poll.
pub type WorkingSet<C> = Vec<(String, CollectFn<C>)>;

/// Resolves which collectors run this poll.
///
/// A non-empty `include` selects exactly those names and ignores `exclude`;
/// any include name missing from the registry fails the selection. Otherwise
/// everything registered runs except the names in `exclude`.
///
/// The registry is only read; the result is a fresh poll-local set.
pub fn select<C: 'static>(
    registry: &CollectorRegistry<C>,
    include: &[String],
    exclude: &[String],
) -> Result<WorkingSet<C>, SelectError> {
    if !include.is_empty() {
        let mut seen = BTreeSet::new();
        let mut selected = Vec::with_capacity(include.len());
        for name in include {
            if !seen.insert(name.as_str()) {
                continue;
            }
            let routine = registry
                .get(name)
                .ok_or_else(|| SelectError::UnknownResource(name.clone()))?;
            selected.push((name.clone(), routine.clone()));
        }
        return Ok(selected);
    }

    for name in exclude.iter().filter(|n| !registry.contains(n)) {
        warn!("ignoring unknown resource kind '{}' in resource exclude list", name);
    }

    Ok(registry
        .iter()
        .filter(|(name, _)| !exclude.iter().any(|e| e == name))
        .map(|(name, routine)| (name.to_string(), routine.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::registry::CollectContext;

    async fn noop(_ctx: CollectContext<()>) {}

    fn registry() -> CollectorRegistry<()> {
        CollectorRegistry::new()
            .with("nodes", noop)
            .with("pods", noop)
            .with("deployments", noop)
    }

    fn names(set: &WorkingSet<()>) -> Vec<&str> {
        let mut names: Vec<&str> = set.iter().map(|(n, _)| n.as_str()).collect();
        names.sort();
        names
    }

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_config_selects_everything() {
        let set = select(&registry(), &[], &[]).unwrap();
        assert_eq!(names(&set), vec!["deployments", "nodes", "pods"]);
    }

    #[test]
    fn test_include_overrides_exclude() {
        let set = select(&registry(), &list(&["pods"]), &list(&["nodes", "pods"])).unwrap();
        assert_eq!(names(&set), vec!["pods"]);
    }

    #[test]
    fn test_include_deduplicates() {
        let set = select(&registry(), &list(&["pods", "nodes", "pods"]), &[]).unwrap();
        assert_eq!(names(&set), vec!["nodes", "pods"]);
    }

    #[test]
    fn test_exclude_removes_names() {
        let set = select(&registry(), &[], &list(&["nodes", "unknown"])).unwrap();
        assert_eq!(names(&set), vec!["deployments", "pods"]);
    }

    #[test]
    fn test_unknown_include_fails() {
        let err = select(&registry(), &list(&["pods", "configmaps"]), &[]).err().unwrap();
        assert_eq!(err, SelectError::UnknownResource("configmaps".to_string()));
        assert!(err.to_string().contains("configmaps"));
    }

    #[test]
    fn test_exclusion_does_not_leak_into_later_selections() {
        let registry = registry();

        let first = select(&registry, &[], &list(&["nodes"])).unwrap();
        assert_eq!(names(&first), vec!["deployments", "pods"]);

        let second = select(&registry, &[], &[]).unwrap();
        assert_eq!(names(&second), vec!["deployments", "nodes", "pods"]);

        let third = select(&registry, &list(&["nodes"]), &[]).unwrap();
        assert_eq!(names(&third), vec!["nodes"]);
        assert_eq!(registry.len(), 3);
    }
}
