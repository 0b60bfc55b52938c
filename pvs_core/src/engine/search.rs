use crate::engine::context::SearchContext;
use crate::engine::move_list::MoveList;
use crate::engine::task::SearchTask;
use crate::engine::tt::Probe;
use crate::engine::{Evaluator, Move, Node, NodeKind, MATE_SCORE};
use crate::logic::oracle::PositionOracle;

/// Running window of one node while its move lists are searched.
struct NodeWindow {
    alpha: i32,
    beta: i32,
    /// Upper edge handed to the next child: `beta` for the first move,
    /// `alpha + 1` afterwards.
    child_beta: i32,
    pv_move: bool,
}

impl<O: PositionOracle, E: Evaluator<O>> SearchTask<O, E> {
    /// Negamax with principal-variation search, static-null and adaptive
    /// null-move pruning and a check extension below the horizon.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn search(
        &mut self,
        ctx: &SearchContext,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        is_pv: bool,
        allow_null: bool,
    ) -> Node {
        let hash = self.oracle.position_hash();
        match self.tt.probe(hash, depth, alpha, beta) {
            Probe::Miss => {}
            Probe::Narrowed { alpha: a, beta: b } => {
                self.counters.tt_hits += 1;
                alpha = a;
                beta = b;
            }
            Probe::Return(node) => {
                self.counters.tt_hits += 1;
                return node;
            }
        }

        let in_check = self.oracle.in_check();
        if depth <= 0 && (!in_check || depth < self.config.check_extension_floor) {
            return self.quiescence(depth - 1, alpha, beta);
        }

        let original_alpha = alpha;
        let mut new_depth = depth - 1;

        // Static null
        if self.config.static_null_pruning && depth < 3 && !is_pv && !in_check {
            if let Some(margin) = self.config.static_null_margin(depth) {
                let eval = self.evaluate();
                if eval - margin >= beta {
                    return Node::new(eval - margin, NodeKind::StaticNull);
                }
            }
        }

        // Adaptive null move
        if self.config.null_move_pruning
            && depth > self.config.null_move_min_depth
            && allow_null
            && !is_pv
            && !in_check
        {
            let r = self.config.null_move_r(depth);
            self.counters.null_move_searches += 1;
            #[cfg(test)]
            self.null_move_sites.push((is_pv, self.oracle.in_check()));
            self.oracle.make_null_move();
            let value = self
                .search(ctx, depth - 1 - r, -beta, -beta + 1, false, false)
                .negate();
            self.oracle.unmake_null_move();

            if value.score >= beta {
                new_depth -= self.config.null_move_depth_cut;
                if new_depth <= 0 {
                    return self.quiescence(depth - 1, alpha, beta);
                }
            }
        }

        let mut window = NodeWindow {
            alpha,
            beta,
            child_beta: beta,
            pv_move: true,
        };

        let captures = self.generate(O::generate_captures);
        let no_captures = captures.is_empty();
        let cut = self.search_moves(ctx, captures, &mut window, depth, new_depth, allow_null);

        if !cut {
            let quiets = self.generate(O::generate_quiet_moves);
            if quiets.is_empty() && no_captures {
                return Node::exact(-MATE_SCORE + depth);
            }
            if !self.search_moves(ctx, quiets, &mut window, depth, new_depth, allow_null) {
                let kind = if window.alpha > original_alpha {
                    NodeKind::Exact
                } else {
                    NodeKind::UpperBound
                };
                self.tt.store(hash, depth, Node::new(window.alpha, kind));
                return Node::exact(window.alpha);
            }
        }

        self.tt
            .store(hash, depth, Node::new(window.alpha, NodeKind::LowerBound));
        Node::cut(window.alpha)
    }

    /// Searches one move list in selection order. Returns `true` on a beta cutoff.
    fn search_moves(
        &mut self,
        ctx: &SearchContext,
        moves: MoveList,
        w: &mut NodeWindow,
        depth: i32,
        new_depth: i32,
        allow_null: bool,
    ) -> bool {
        let task_side = self.task_side;
        let root_mover = task_side.opposite();

        for (i, mv) in moves.picker().enumerate() {
            self.play(&mv, depth);
            let mut score = self
                .search(ctx, new_depth, -w.child_beta, -w.alpha, w.pv_move, allow_null)
                .negate();
            self.oracle.unmake_move();

            if !w.pv_move && score.score > w.alpha && score.score < w.beta {
                self.counters.researches += 1;
                self.play(&mv, depth);
                score = self
                    .search(ctx, new_depth, -w.beta, -score.score, true, allow_null)
                    .negate();
                self.oracle.unmake_move();
            }

            if score.score > w.alpha {
                w.alpha = score.score;
            }

            if self.oracle.side_to_move() == task_side {
                w.beta = w.beta.min(-ctx.alpha_for(root_mover));
            }

            if w.alpha >= w.beta {
                self.counters.beta_cuts += 1;
                if i == 0 {
                    self.counters.first_move_cuts += 1;
                }
                return true;
            }

            w.child_beta = w.alpha + 1;
            w.pv_move = false;
        }
        false
    }

    /// Capture-only search past the horizon.
    pub(crate) fn quiescence(&mut self, d: i32, mut alpha: i32, beta: i32) -> Node {
        let stand_pat = self.evaluate();

        if d < self.config.qsearch_floor {
            return Node::exact(stand_pat);
        }
        if stand_pat >= beta {
            return Node::cut(stand_pat);
        }
        if !self.config.endgame && stand_pat + self.config.delta_margin < alpha {
            return Node::exact(alpha);
        }
        alpha = alpha.max(stand_pat);

        let in_check = self.oracle.in_check();
        let captures = self.generate(O::generate_captures);

        for (i, mv) in captures.picker().enumerate() {
            if !self.config.endgame && !in_check && !mv.is_promotion() {
                let gain = mv
                    .captured
                    .and_then(|kind| self.config.capture_values.get(kind.index()).copied())
                    .unwrap_or(0);
                if stand_pat + self.config.capture_margin + gain < alpha || mv.bad_capture {
                    continue;
                }
            }

            self.play(&mv, d);
            let score = self.quiescence(d - 1, -beta, -alpha).negate();
            self.oracle.unmake_move();

            alpha = alpha.max(score.score);
            if alpha >= beta {
                self.counters.beta_cuts += 1;
                if i == 0 {
                    self.counters.first_move_cuts += 1;
                }
                return Node::cut(alpha);
            }
        }

        Node::exact(alpha)
    }

    fn evaluate(&mut self) -> i32 {
        self.counters.evaluations += 1;
        self.evaluator.evaluate(&self.oracle)
    }

    fn generate(&mut self, gen: fn(&O) -> MoveList) -> MoveList {
        self.counters.generation_calls += 1;
        gen(&self.oracle)
    }

    /// Makes `mv`; a refused move is logged and the search carries on.
    fn play(&mut self, mv: &Move, depth: i32) {
        if !self.oracle.make_move(mv) {
            self.counters.failed_moves += 1;
            log::error!(
                "move refused: task {} depth {} move {}",
                self.label,
                depth,
                self.oracle.move_label(mv)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::EngineConfig;
    use crate::engine::eval::StaticEvaluator;
    use crate::engine::{SCORE_INF, SCORE_NEG_INF};
    use crate::logic::board::{Bitboard, PieceKind, Side};
    use crate::logic::game::ChessOracle;
    use crate::logic::oracle::OracleError;
    use crate::logic::tree::{GameTree, TreeEvaluator, TreeOracle};
    use std::sync::Arc;

    /// Every position offers one more capture; the evaluator always
    /// reports the mover slightly worse.
    struct EndlessCaptures {
        ply: usize,
        max_ply: usize,
    }

    impl PositionOracle for EndlessCaptures {
        type Snapshot = ();

        fn generate_captures(&self) -> MoveList {
            let mut moves = MoveList::new();
            moves.push(Move {
                captured: Some(PieceKind::Pawn),
                score: 900,
                ..Move::default()
            });
            moves
        }

        fn generate_quiet_moves(&self) -> MoveList {
            MoveList::new()
        }

        fn make_move(&mut self, _mv: &Move) -> bool {
            self.ply += 1;
            self.max_ply = self.max_ply.max(self.ply);
            true
        }

        fn unmake_move(&mut self) {
            self.ply -= 1;
        }

        fn make_null_move(&mut self) {}

        fn unmake_null_move(&mut self) {}

        fn position_hash(&self) -> u64 {
            self.ply as u64
        }

        fn pawn_hash(&self) -> u64 {
            0
        }

        fn side_to_move(&self) -> Side {
            if self.ply % 2 == 0 {
                Side::White
            } else {
                Side::Black
            }
        }

        fn in_check(&self) -> bool {
            false
        }

        fn pieces(&self, _side: Side, _kind: PieceKind) -> Bitboard {
            0
        }

        fn snapshot(&self) -> Self::Snapshot {}

        fn from_snapshot(_snapshot: &()) -> Result<Self, OracleError> {
            Ok(Self { ply: 0, max_ply: 0 })
        }
    }

    struct Pessimist;

    impl Evaluator<EndlessCaptures> for Pessimist {
        fn evaluate(&mut self, _pos: &EndlessCaptures) -> i32 {
            -50
        }
    }

    fn chess_task(fen: &str, config: EngineConfig) -> SearchTask<ChessOracle, StaticEvaluator> {
        let config = Arc::new(config);
        SearchTask::new(
            ChessOracle::from_fen(fen).unwrap(),
            StaticEvaluator::new(Arc::clone(&config)),
            config,
            0,
            "test",
            1,
        )
    }

    #[test]
    fn test_quiescence_stops_at_floor() {
        let config = Arc::new(EngineConfig::default());
        let oracle = EndlessCaptures { ply: 0, max_ply: 0 };
        let mut task = SearchTask::new(oracle, Pessimist, config, 0, "endless", 0);
        let ctx = SearchContext::strict();
        let node = task.search(&ctx, 0, SCORE_NEG_INF, SCORE_INF, true, true);
        assert_eq!(task.oracle().ply, 0);
        assert_eq!(task.oracle().max_ply, 100);
        assert!(node.score.abs() <= 50);
    }

    #[test]
    fn test_quiescence_stand_pat_cut() {
        let mut task = chess_task("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", EngineConfig::default());
        let node = task.quiescence(-1, -500, 50);
        assert_eq!(node, Node::cut(100));
    }

    #[test]
    fn test_quiescence_delta_pruning_returns_alpha() {
        let mut task = chess_task("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", EngineConfig::default());
        let node = task.quiescence(-1, 5000, 6000);
        assert_eq!(node, Node::exact(5000));
        assert_eq!(task.counters().generation_calls, 0);
    }

    #[test]
    fn test_quiescence_resolves_hanging_queen() {
        // White to move can take an undefended queen.
        let mut task = chess_task("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1", EngineConfig::default());
        let static_eval = task.evaluate();
        let node = task.quiescence(-1, SCORE_NEG_INF, SCORE_INF);
        assert!(node.score > static_eval + 900);
    }

    #[test]
    fn test_no_moves_scores_mate_distance() {
        for fen in [
            "7k/6Q1/6K1/8/8/8/8/8 b - - 0 1",
            "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1",
        ] {
            let mut task = chess_task(fen, EngineConfig::default());
            let ctx = SearchContext::strict();
            let node = task.search(&ctx, 3, SCORE_NEG_INF, SCORE_INF, true, true);
            assert_eq!(node, Node::exact(-MATE_SCORE + 3), "{fen}");
        }
    }

    #[test]
    fn test_static_null_prunes_outside_pv() {
        // White is a rook up: a depth-1 non-PV node with a low beta prunes.
        let mut task = chess_task("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", EngineConfig::default());
        let ctx = SearchContext::strict();
        let node = task.search(&ctx, 1, -100, 0, false, true);
        assert_eq!(node.kind, NodeKind::StaticNull);
        assert_eq!(task.counters().generation_calls, 0);

        let pv = task.search(&ctx, 1, -100, 0, true, true);
        assert_ne!(pv.kind, NodeKind::StaticNull);
    }

    #[test]
    fn test_tt_hit_short_circuits() {
        let tree = Arc::new(GameTree::random(11, 3, 3));
        let config = Arc::new(EngineConfig::strict());
        let mut task = SearchTask::new(
            TreeOracle::new(tree, Side::White),
            TreeEvaluator,
            config,
            3,
            "root",
            0,
        );
        let ctx = SearchContext::strict();
        let first = task.search(&ctx, 3, SCORE_NEG_INF, SCORE_INF, true, true);
        let generated = task.counters().generation_calls;
        let second = task.search(&ctx, 3, SCORE_NEG_INF, SCORE_INF, true, true);
        assert_eq!(first.score, second.score);
        assert_eq!(task.counters().generation_calls, generated);
        assert!(task.counters().tt_hits > 0);
    }

    #[test]
    fn test_tree_search_matches_negamax() {
        for seed in 0..8 {
            let tree = Arc::new(GameTree::random(seed, 4, 3));
            let expected = tree.negamax(0, Side::White, 4);
            let mut task = SearchTask::new(
                TreeOracle::new(Arc::clone(&tree), Side::White),
                TreeEvaluator,
                Arc::new(EngineConfig::strict()),
                4,
                "root",
                seed,
            );
            let ctx = SearchContext::strict();
            let node = task.search(&ctx, 4, SCORE_NEG_INF, SCORE_INF, true, true);
            assert_eq!(node.score, expected, "seed {seed}");
        }
    }

    #[test]
    fn test_null_move_skipped_at_pv_and_check_nodes() {
        let mut tried = 0;
        for seed in 0..6 {
            let tree = Arc::new(GameTree::random(seed, 6, 3));
            let mut task = SearchTask::new(
                TreeOracle::new(Arc::clone(&tree), Side::White),
                TreeEvaluator,
                Arc::new(EngineConfig::default()),
                6,
                "root",
                seed,
            );
            let ctx = SearchContext::strict();
            task.search(&ctx, 6, SCORE_NEG_INF, SCORE_INF, true, true);

            let sites = &task.null_move_sites;
            assert_eq!(sites.len() as u64, task.counters().null_move_searches);
            assert!(
                sites.iter().all(|&(is_pv, in_check)| !is_pv && !in_check),
                "seed {seed}: {sites:?}"
            );
            for &id in task.oracle().null_move_nodes() {
                assert_ne!(id, 0, "seed {seed}: null move at the root");
                assert!(!tree.node(id).unwrap().in_check, "seed {seed}: in check at {id}");
            }
            tried += sites.len();
        }
        assert!(tried > 0);
    }

    #[test]
    fn test_null_move_fail_high_falls_through_to_quiescence() {
        let tree = Arc::new(GameTree::random(3, 3, 2));
        let value = tree.node(0).unwrap().value;
        let mut task = SearchTask::new(
            TreeOracle::new(tree, Side::White),
            TreeEvaluator,
            Arc::new(EngineConfig::default()),
            3,
            "root",
            3,
        );
        let ctx = SearchContext::strict();
        // The null search fails high and the depth cut leaves nothing to search.
        let node = task.search(&ctx, 3, value - 2, value - 1, false, true);

        assert_eq!(task.counters().null_move_searches, 1);
        // Only the reduced null search's quiescence generated moves.
        assert_eq!(task.counters().generation_calls, 1);
        assert_eq!(node, Node::cut(value));
        assert_eq!(node.kind, NodeKind::CutNode);
    }
}
