//! Instance model: an occurrence of a pattern in a host graph.
//!
//! Rather than ad-hoc refcounted pointers, instances are values owned by an
//! [`InstanceArena`]; every list that references an instance holds an
//! integer [`InstanceHandle`] plus an explicit increment/decrement of the
//! arena entry's refcount. An entry is freed exactly when its count reaches
//! zero, which gives the same "free when last handle drops" guarantee
//! without unsafe aliasing.

use std::collections::HashSet;

use crate::graph::{EdgeId, VertexId};

/// Handle into an [`InstanceArena`]. Cheap to copy; does not itself keep the
/// referenced instance alive — ownership is tracked by the arena's refcount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceHandle(pub(crate) u32);

/// An occurrence of a pattern within a host graph.
#[derive(Debug, Clone)]
pub struct Instance {
    /// Ordered vertex indices into the host graph; length equals the
    /// pattern's vertex count.
    pub vertices: Vec<VertexId>,
    /// Ordered edge indices into the host graph.
    pub edges: Vec<EdgeId>,
    /// Position within `vertices` of a vertex newly added during the last
    /// extension step, if any (used while growing candidates).
    pub new_vertex_pos: Option<usize>,
    /// Position within `edges` of an edge newly added during the last
    /// extension step, if any.
    pub new_edge_pos: Option<usize>,
    /// Mapping from this instance's vertices to pattern vertex positions,
    /// present once the instance has been validated against its pattern by
    /// the Subgraph Matcher or Inexact Matcher.
    pub mapping: Option<Vec<usize>>,
    /// Minimum match cost accumulated so far (0.0 for an exact match).
    pub min_cost: f64,
}

impl Instance {
    pub fn new(vertices: Vec<VertexId>, edges: Vec<EdgeId>) -> Self {
        Instance {
            vertices,
            edges,
            new_vertex_pos: None,
            new_edge_pos: None,
            mapping: None,
            min_cost: 0.0,
        }
    }

    fn vertex_set(&self) -> HashSet<VertexId> {
        self.vertices.iter().copied().collect()
    }

    fn edge_set(&self) -> HashSet<EdgeId> {
        self.edges.iter().copied().collect()
    }

    /// Two instances are equal iff they cover the same vertex set and the
    /// same edge set; list insertion deduplicates on this notion, not on
    /// vertex/edge order.
    pub fn structurally_eq(&self, other: &Instance) -> bool {
        self.vertex_set() == other.vertex_set() && self.edge_set() == other.edge_set()
    }

    pub fn overlaps(&self, other: &Instance) -> bool {
        self.vertices.iter().any(|v| other.vertices.contains(v))
    }
}

struct ArenaEntry {
    instance: Instance,
    refcount: u32,
}

/// Owns all live [`Instance`] values; lists of instances hold
/// [`InstanceHandle`]s and must call [`InstanceArena::retain`] /
/// [`InstanceArena::release`] when they add or drop a reference.
#[derive(Default)]
pub struct InstanceArena {
    entries: Vec<Option<ArenaEntry>>,
}

impl InstanceArena {
    pub fn new() -> Self {
        InstanceArena { entries: Vec::new() }
    }

    /// Inserts a fresh instance with a refcount of 1 (the caller's first
    /// reference) and returns its handle.
    pub fn insert(&mut self, instance: Instance) -> InstanceHandle {
        let id = self.entries.len() as u32;
        self.entries.push(Some(ArenaEntry {
            instance,
            refcount: 1,
        }));
        InstanceHandle(id)
    }

    pub fn get(&self, handle: InstanceHandle) -> &Instance {
        &self.entries[handle.0 as usize]
            .as_ref()
            .expect("use of a freed instance handle")
            .instance
    }

    pub fn get_mut(&mut self, handle: InstanceHandle) -> &mut Instance {
        &mut self.entries[handle.0 as usize]
            .as_mut()
            .expect("use of a freed instance handle")
            .instance
    }

    /// Increments the refcount; call when inserting `handle` into another
    /// list.
    pub fn retain(&mut self, handle: InstanceHandle) {
        let entry = self.entries[handle.0 as usize]
            .as_mut()
            .expect("use of a freed instance handle");
        entry.refcount += 1;
    }

    /// Decrements the refcount; frees the entry when it reaches zero. Call
    /// when removing `handle` from a list.
    pub fn release(&mut self, handle: InstanceHandle) {
        let idx = handle.0 as usize;
        let freed = {
            let entry = self.entries[idx]
                .as_mut()
                .expect("double free of an instance handle");
            entry.refcount -= 1;
            entry.refcount == 0
        };
        if freed {
            self.entries[idx] = None;
        }
    }

    pub fn refcount(&self, handle: InstanceHandle) -> u32 {
        self.entries[handle.0 as usize]
            .as_ref()
            .map(|e| e.refcount)
            .unwrap_or(0)
    }

    pub fn is_live(&self, handle: InstanceHandle) -> bool {
        self.entries[handle.0 as usize].is_some()
    }

    /// Inserts `instance` into `list`, deduplicating on structural equality
    /// against whatever `list` already holds.
    pub fn push_deduped(&mut self, list: &mut Vec<InstanceHandle>, instance: Instance) {
        if list
            .iter()
            .any(|&h| self.get(h).structurally_eq(&instance))
        {
            return;
        }
        let handle = self.insert(instance);
        list.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refcount_frees_at_zero() {
        let mut arena = InstanceArena::new();
        let h = arena.insert(Instance::new(vec![VertexId(0)], vec![]));
        assert!(arena.is_live(h));
        arena.retain(h);
        assert_eq!(arena.refcount(h), 2);
        arena.release(h);
        assert!(arena.is_live(h));
        arena.release(h);
        assert!(!arena.is_live(h));
    }

    #[test]
    fn dedup_on_structural_equality() {
        let mut arena = InstanceArena::new();
        let mut list = Vec::new();
        arena.push_deduped(
            &mut list,
            Instance::new(vec![VertexId(0), VertexId(1)], vec![EdgeId(0)]),
        );
        arena.push_deduped(
            &mut list,
            Instance::new(vec![VertexId(1), VertexId(0)], vec![EdgeId(0)]),
        );
        assert_eq!(list.len(), 1);
    }
}
