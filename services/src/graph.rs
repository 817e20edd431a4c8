use std::collections::{BTreeMap, BTreeSet};

/// Dependency graph between service names. An edge `a -> b` means `a` needs `b`.
/// Ordered maps keep construction order deterministic.
#[derive(Debug, Default)]
pub(crate) struct Graph {
    nodes: BTreeMap<&'static str, Node>,
}

#[derive(Debug, Default)]
struct Node {
    outgoing: BTreeSet<&'static str>,
    incoming: BTreeSet<&'static str>,
}

impl Graph {
    pub fn node(&mut self, key: &'static str) { self.nodes.entry(key).or_default(); }

    pub fn link(&mut self, from: &'static str, to: &'static str) {
        self.nodes.entry(from).or_default().outgoing.insert(to);
        self.nodes.entry(to).or_default().incoming.insert(from);
    }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    /// Nodes without unmet dependencies
    pub fn roots(&self) -> Vec<&'static str> {
        self.nodes.iter().filter(|(_, node)| node.outgoing.is_empty()).map(|(key, _)| *key).collect()
    }

    pub fn remove(&mut self, key: &'static str) {
        if let Some(node) = self.nodes.remove(key) {
            for other in node.incoming {
                if let Some(other) = self.nodes.get_mut(other) {
                    other.outgoing.remove(key);
                }
            }
            for other in node.outgoing {
                if let Some(other) = self.nodes.get_mut(other) {
                    other.incoming.remove(key);
                }
            }
        }
    }

    /// Renders the first cycle found as `a -> b -> a`
    pub fn find_cycle(&self) -> Option<String> {
        let mut path = Vec::new();
        self.nodes.keys().find_map(|key| self.walk(*key, &mut path))
    }

    fn walk(&self, key: &'static str, path: &mut Vec<&'static str>) -> Option<String> {
        if let Some(start) = path.iter().position(|k| *k == key) {
            let mut cycle = path[start..].to_vec();
            cycle.push(key);
            return Some(cycle.join(" -> "));
        }
        let node = self.nodes.get(key)?;
        path.push(key);
        for next in &node.outgoing {
            if let Some(cycle) = self.walk(*next, path) {
                return Some(cycle);
            }
        }
        path.pop();
        None
    }
}
