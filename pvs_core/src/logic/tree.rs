use crate::engine::move_list::MoveList;
use crate::engine::{Evaluator, Move, MATE_SCORE};
use crate::logic::board::{Bitboard, PieceKind, Side};
use crate::logic::oracle::{OracleError, PositionOracle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Static value from White's point of view.
    pub value: i32,
    pub in_check: bool,
    pub children: Vec<usize>,
    /// Position among the parent's children, 0 for the root.
    pub ordinal: usize,
}

/// Explicit game tree, used to check search results against plain negamax.
#[derive(Debug, Clone)]
pub struct GameTree {
    nodes: Vec<TreeNode>,
}

impl GameTree {
    /// Uniform tree of the given depth and branching factor with seeded
    /// random values. Interior nodes are occasionally flagged as in check.
    pub fn random(seed: u64, depth: u32, branching: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(&mut rng, depth, branching, 0);
        tree
    }

    fn grow(&mut self, rng: &mut StdRng, depth: u32, branching: usize, ordinal: usize) -> usize {
        let id = self.nodes.len();
        self.nodes.push(TreeNode {
            value: rng.gen_range(-400..=400),
            in_check: depth > 0 && ordinal > 0 && rng.gen_bool(0.15),
            children: Vec::new(),
            ordinal,
        });
        if depth > 0 {
            let children: Vec<usize> = (0..branching)
                .map(|i| self.grow(rng, depth - 1, branching, i))
                .collect();
            if let Some(node) = self.nodes.get_mut(id) {
                node.children = children;
            }
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: usize) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Plain fixed-depth negamax over the tree with the same leaf and
    /// terminal conventions as the engine: leaves score the mover-relative
    /// static value, childless interior nodes score `-MATE_SCORE + depth`.
    pub fn negamax(&self, id: usize, side: Side, depth: i32) -> i32 {
        let Some(node) = self.nodes.get(id) else {
            return 0;
        };
        if depth <= 0 && (!node.in_check || depth < -10) {
            return node.value * side.sign();
        }
        if node.children.is_empty() {
            return -MATE_SCORE + depth;
        }
        node.children
            .iter()
            .map(|&child| -self.negamax(child, side.opposite(), depth - 1))
            .max()
            .unwrap_or(-MATE_SCORE + depth)
    }
}

#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    pub tree: Arc<GameTree>,
    pub node: usize,
    pub side: Side,
}

pub struct TreeOracle {
    tree: Arc<GameTree>,
    node: usize,
    side: Side,
    path: Vec<(usize, Side)>,
    null_move_nodes: Vec<usize>,
}

impl TreeOracle {
    pub fn new(tree: Arc<GameTree>, side: Side) -> Self {
        Self {
            tree,
            node: 0,
            side,
            path: Vec::new(),
            null_move_nodes: Vec::new(),
        }
    }

    pub const fn node_id(&self) -> usize {
        self.node
    }

    pub fn current(&self) -> Option<&TreeNode> {
        self.tree.node(self.node)
    }

    /// Nodes at which a null move was made, in order.
    pub fn null_move_nodes(&self) -> &[usize] {
        &self.null_move_nodes
    }
}

impl PositionOracle for TreeOracle {
    type Snapshot = TreeSnapshot;

    fn generate_captures(&self) -> MoveList {
        MoveList::new()
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn generate_quiet_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        if let Some(node) = self.current() {
            for (i, _) in node.children.iter().enumerate() {
                moves.push(Move {
                    from: i as u8,
                    score: -(i as i32),
                    ..Move::default()
                });
            }
        }
        moves
    }

    fn make_move(&mut self, mv: &Move) -> bool {
        self.path.push((self.node, self.side));
        let child = self
            .current()
            .and_then(|node| node.children.get(usize::from(mv.from)).copied());
        match child {
            Some(child) => {
                self.node = child;
                self.side = self.side.opposite();
                true
            }
            None => false,
        }
    }

    fn unmake_move(&mut self) {
        if let Some((node, side)) = self.path.pop() {
            self.node = node;
            self.side = side;
        }
    }

    fn make_null_move(&mut self) {
        self.null_move_nodes.push(self.node);
        self.path.push((self.node, self.side));
        self.side = self.side.opposite();
    }

    fn unmake_null_move(&mut self) {
        self.unmake_move();
    }

    fn position_hash(&self) -> u64 {
        let key = (self.node as u64) << 1 | self.side.index() as u64;
        key.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ 0x5851_F42D_4C95_7F2D
    }

    fn pawn_hash(&self) -> u64 {
        0
    }

    fn side_to_move(&self) -> Side {
        self.side
    }

    fn in_check(&self) -> bool {
        self.current().is_some_and(|node| node.in_check)
    }

    fn pieces(&self, _side: Side, _kind: PieceKind) -> Bitboard {
        0
    }

    fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            tree: Arc::clone(&self.tree),
            node: self.node,
            side: self.side,
        }
    }

    fn from_snapshot(snapshot: &TreeSnapshot) -> Result<Self, OracleError> {
        if snapshot.node >= snapshot.tree.len() {
            return Err(OracleError::UnknownNode { id: snapshot.node });
        }
        let mut oracle = Self::new(Arc::clone(&snapshot.tree), snapshot.side);
        oracle.node = snapshot.node;
        Ok(oracle)
    }

    fn move_label(&self, mv: &Move) -> String {
        let child = self
            .current()
            .and_then(|node| node.children.get(usize::from(mv.from)).copied());
        child.map_or_else(|| format!("?{}", mv.from), |id| format!("n{id}"))
    }
}

/// Mover-relative node value.
#[derive(Debug, Default)]
pub struct TreeEvaluator;

impl Evaluator<TreeOracle> for TreeEvaluator {
    fn evaluate(&mut self, pos: &TreeOracle) -> i32 {
        pos.current().map_or(0, |node| node.value) * pos.side_to_move().sign()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_tree_shape() {
        let tree = GameTree::random(7, 3, 3);
        assert_eq!(tree.len(), 1 + 3 + 9 + 27);
        assert_eq!(GameTree::random(7, 3, 3).node(20).map(|n| n.value), tree.node(20).map(|n| n.value));
    }

    #[test]
    fn test_tree_oracle_walk() {
        let tree = Arc::new(GameTree::random(1, 2, 2));
        let mut oracle = TreeOracle::new(tree, Side::White);
        let root_hash = oracle.position_hash();
        let moves = oracle.generate_moves();
        assert_eq!(moves.len(), 2);
        assert!(oracle.make_move(&moves[1]));
        assert_eq!(oracle.side_to_move(), Side::Black);
        assert_eq!(oracle.current().map(|n| n.ordinal), Some(1));
        oracle.unmake_move();
        assert_eq!(oracle.position_hash(), root_hash);

        oracle.make_null_move();
        assert_ne!(oracle.position_hash(), root_hash);
        assert_eq!(oracle.node_id(), 0);
        oracle.unmake_null_move();
        assert_eq!(oracle.null_move_nodes(), &[0]);
    }

    #[test]
    fn test_unknown_child_fails_but_balances() {
        let tree = Arc::new(GameTree::random(1, 1, 2));
        let mut oracle = TreeOracle::new(tree, Side::White);
        let bogus = Move {
            from: 9,
            ..Move::default()
        };
        assert!(!oracle.make_move(&bogus));
        oracle.unmake_move();
        assert_eq!(oracle.node_id(), 0);
        assert_eq!(oracle.side_to_move(), Side::White);
    }

    #[test]
    fn test_snapshot_rejects_unknown_node() {
        let tree = Arc::new(GameTree::random(1, 1, 2));
        let snapshot = TreeSnapshot {
            tree,
            node: 99,
            side: Side::White,
        };
        assert!(matches!(
            TreeOracle::from_snapshot(&snapshot),
            Err(OracleError::UnknownNode { id: 99 })
        ));
    }

    #[test]
    fn test_negamax_leaf_perspective() {
        let tree = GameTree::random(3, 1, 2);
        let leaf_values: Vec<i32> = tree
            .node(0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
            .iter()
            .filter_map(|&c| tree.node(c).map(|n| n.value))
            .collect();
        // White to move at the root picks the child best for White.
        let expected = leaf_values.iter().copied().max().unwrap_or(0);
        assert_eq!(tree.negamax(0, Side::White, 1), expected);
    }
}
