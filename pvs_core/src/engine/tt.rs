use crate::engine::{Node, NodeKind};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtEntry {
    pub depth: i32,
    pub node: Node,
}

/// Outcome of a probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    /// No entry deep enough.
    Miss,
    /// A bound entry tightened (or kept) the window.
    Narrowed { alpha: i32, beta: i32 },
    /// The caller returns this node without searching.
    Return(Node),
}

/// Per-task cache keyed by the oracle's position hash. Hash collisions
/// simply overwrite.
#[derive(Default)]
pub struct TranspositionTable {
    entries: HashMap<u64, TtEntry>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: u64) -> Option<TtEntry> {
        self.entries.get(&key).copied()
    }

    pub fn probe(&self, key: u64, depth: i32, mut alpha: i32, mut beta: i32) -> Probe {
        let Some(entry) = self.entries.get(&key) else {
            return Probe::Miss;
        };
        if entry.depth < depth {
            return Probe::Miss;
        }

        match entry.node.kind {
            NodeKind::LowerBound => alpha = alpha.max(entry.node.score),
            NodeKind::UpperBound => beta = beta.min(entry.node.score),
            _ => return Probe::Return(entry.node),
        }

        if alpha >= beta {
            Probe::Return(Node::cut(alpha))
        } else {
            Probe::Narrowed { alpha, beta }
        }
    }

    /// Depth-preferred replacement: an existing entry is only replaced by
    /// one searched at least as deep.
    pub fn store(&mut self, key: u64, depth: i32, node: Node) {
        let incoming = TtEntry { depth, node };
        self.entries
            .entry(key)
            .and_modify(|entry| {
                if depth >= entry.depth {
                    *entry = incoming;
                }
            })
            .or_insert(incoming);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shallower_store_does_not_overwrite() {
        let mut tt = TranspositionTable::new();
        tt.store(42, 5, Node::new(10, NodeKind::Exact));
        tt.store(42, 3, Node::new(99, NodeKind::LowerBound));
        assert_eq!(tt.get(42).map(|e| (e.depth, e.node.score)), Some((5, 10)));
    }

    #[test]
    fn test_equal_or_deeper_store_overwrites() {
        let mut tt = TranspositionTable::new();
        tt.store(42, 5, Node::new(10, NodeKind::Exact));
        tt.store(42, 5, Node::new(20, NodeKind::UpperBound));
        assert_eq!(tt.get(42).map(|e| e.node.score), Some(20));
        tt.store(42, 8, Node::new(30, NodeKind::LowerBound));
        assert_eq!(tt.get(42).map(|e| (e.depth, e.node.kind)), Some((8, NodeKind::LowerBound)));
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn test_probe_ignores_shallow_entries() {
        let mut tt = TranspositionTable::new();
        tt.store(1, 2, Node::exact(50));
        assert_eq!(tt.probe(1, 3, -100, 100), Probe::Miss);
        assert_eq!(tt.probe(7, 0, -100, 100), Probe::Miss);
        assert_eq!(tt.probe(1, 2, -100, 100), Probe::Return(Node::exact(50)));
    }

    #[test]
    fn test_bounds_never_widen_window() {
        let mut tt = TranspositionTable::new();
        for (kind, score) in [
            (NodeKind::LowerBound, -500),
            (NodeKind::LowerBound, 20),
            (NodeKind::UpperBound, 500),
            (NodeKind::UpperBound, 40),
        ] {
            tt.clear();
            tt.store(9, 4, Node::new(score, kind));
            match tt.probe(9, 4, 0, 100) {
                Probe::Narrowed { alpha, beta } => {
                    assert!(alpha >= 0 && beta <= 100 && alpha < beta);
                }
                other => panic!("unexpected probe result {other:?}"),
            }
        }
    }

    #[test]
    fn test_lower_bound_raises_alpha() {
        let mut tt = TranspositionTable::new();
        tt.store(3, 4, Node::new(30, NodeKind::LowerBound));
        assert_eq!(tt.probe(3, 4, 0, 100), Probe::Narrowed { alpha: 30, beta: 100 });
    }

    #[test]
    fn test_upper_bound_lowers_beta() {
        let mut tt = TranspositionTable::new();
        tt.store(3, 4, Node::new(30, NodeKind::UpperBound));
        assert_eq!(tt.probe(3, 1, 0, 100), Probe::Narrowed { alpha: 0, beta: 30 });
    }

    #[test]
    fn test_collapsed_window_returns_cut_at_alpha() {
        let mut tt = TranspositionTable::new();
        tt.store(3, 4, Node::new(150, NodeKind::LowerBound));
        assert_eq!(tt.probe(3, 4, 0, 100), Probe::Return(Node::cut(150)));

        tt.store(3, 4, Node::new(-20, NodeKind::UpperBound));
        assert_eq!(tt.probe(3, 4, 0, 100), Probe::Return(Node::cut(0)));
    }
}
