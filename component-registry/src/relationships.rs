//! Symmetric relationship graph between component identifiers.
//!
//! Edges are stored as adjacency lists: `b` appears in the list of `a` exactly
//! as many times as `a` appears in the list of `b`. Duplicates are kept and
//! insertion order is preserved.

use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct RelationshipManager {
    relations: IndexMap<String, Vec<String>>,
}

impl RelationshipManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edge between `a` and `b`. Repeated calls add repeated edges.
    pub fn add_relationship(&mut self, a: &str, b: &str) {
        self.relations
            .entry(a.to_string())
            .or_default()
            .push(b.to_string());
        self.relations
            .entry(b.to_string())
            .or_default()
            .push(a.to_string());
    }

    /// Remove one occurrence of the edge between `a` and `b`.
    ///
    /// Best effort: a missing side is logged and skipped. Returns true when
    /// both sides were found and removed.
    pub fn remove_relationship(&mut self, a: &str, b: &str) -> bool {
        let forward = self.remove_one(a, b);
        if !forward {
            log::warn!(
                "Relationship removal skipped: '{}' is not related to '{}'",
                a,
                b
            );
        }
        let backward = self.remove_one(b, a);
        if !backward {
            log::warn!(
                "Relationship removal skipped: '{}' is not related to '{}'",
                b,
                a
            );
        }
        forward && backward
    }

    /// True if `id` has at least one recorded relationship
    pub fn contains(&self, id: &str) -> bool {
        self.relations.get(id).is_some_and(|list| !list.is_empty())
    }

    /// Related identifiers of `id`; empty for unknown identifiers
    pub fn get(&self, id: &str) -> &[String] {
        self.relations.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Identifiers with at least one relationship, in first-seen order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }

    /// Number of edges; each one is stored on both sides
    pub fn edge_count(&self) -> usize {
        let endpoints: usize = self.relations.values().map(Vec::len).sum();
        endpoints / 2
    }

    fn remove_one(&mut self, from: &str, target: &str) -> bool {
        let Some(list) = self.relations.get_mut(from) else {
            return false;
        };
        let Some(pos) = list.iter().position(|id| id == target) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.relations.shift_remove(from);
        }
        true
    }
}
