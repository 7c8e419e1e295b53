//! Instance registry: Container node → Coordinator id.
//!
//! Written only by the lifecycle (hydrate/teardown), read by link-group
//! synchronization to reach Coordinators across Container boundaries.

use crate::host::Dom;
use crate::ids::ContainerId;

#[derive(Debug, Clone)]
pub struct InstanceRegistry<N> {
    entries: Vec<(N, ContainerId)>,
}

impl<N> Default for InstanceRegistry<N> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<N: Clone + PartialEq> InstanceRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node`, replacing any previous entry for the same node.
    pub fn register(&mut self, node: N, id: ContainerId) {
        self.entries.retain(|(n, _)| n != &node);
        self.entries.push((node, id));
    }

    /// Remove the entry for `id`, returning its node.
    pub fn unregister(&mut self, id: ContainerId) -> Option<N> {
        let pos = self.entries.iter().position(|(_, c)| *c == id)?;
        Some(self.entries.remove(pos).0)
    }

    pub fn resolve(&self, node: &N) -> Option<ContainerId> {
        self.entries
            .iter()
            .find_map(|(n, id)| (n == node).then_some(*id))
    }

    /// Registered Containers inside `root`, `root` included.
    pub fn contained_in<D>(&self, dom: &D, root: &N) -> Vec<ContainerId>
    where
        D: Dom<Node = N> + ?Sized,
    {
        self.entries
            .iter()
            .filter(|(n, _)| dom.contains(root, n))
            .map(|(_, id)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_resolve_unregister() {
        let mut reg = InstanceRegistry::new();
        reg.register("a", ContainerId(1));
        reg.register("b", ContainerId(2));
        assert_eq!(reg.resolve(&"a"), Some(ContainerId(1)));
        assert_eq!(reg.unregister(ContainerId(1)), Some("a"));
        assert_eq!(reg.resolve(&"a"), None);
        assert_eq!(reg.unregister(ContainerId(1)), None);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn re_registering_a_node_replaces_it() {
        let mut reg = InstanceRegistry::new();
        reg.register("a", ContainerId(1));
        reg.register("a", ContainerId(7));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.resolve(&"a"), Some(ContainerId(7)));
    }
}
