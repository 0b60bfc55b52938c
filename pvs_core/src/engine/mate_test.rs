use crate::engine::config::EngineConfig;
use crate::engine::context::SearchContext;
use crate::engine::driver::RootDriver;
use crate::engine::eval::StaticEvaluator;
use crate::engine::task::SearchTask;
use crate::engine::{NodeKind, MATE_SCORE};
use crate::logic::game::ChessOracle;
use std::sync::Arc;

// Black to move, back-rank mate.
const MATED: &str = "R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1";
// Black to move, no legal moves and not in check.
const STALEMATED: &str = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";

fn finished_task(fen: &str, depth: i32) -> SearchTask<ChessOracle, StaticEvaluator> {
    let config = Arc::new(EngineConfig::default());
    let mut task = SearchTask::new(
        ChessOracle::from_fen(fen).unwrap(),
        StaticEvaluator::new(Arc::clone(&config)),
        config,
        depth,
        "final",
        1,
    );
    task.start(&SearchContext::strict());
    task
}

#[test]
fn test_mated_position_scores_mate_minus_depth() {
    for depth in [1, 3, 5] {
        let task = finished_task(MATED, depth);
        assert_eq!(task.reached_score(), Some(MATE_SCORE - depth));
        assert_eq!(task.score_kind(), Some(NodeKind::Exact));
    }
}

#[test]
fn test_stalemate_is_not_distinguished_from_mate() {
    // A stalemate scores exactly like a mate. Known ambiguity, kept as is.
    let mate = finished_task(MATED, 4);
    let stalemate = finished_task(STALEMATED, 4);
    assert_eq!(stalemate.reached_score(), mate.reached_score());
    assert_eq!(stalemate.counters().evaluations, 0);
}

#[test]
fn test_driver_finds_back_rank_mate() {
    let driver = RootDriver::new(EngineConfig::default());
    let analysis = driver
        .analyze_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", 2)
        .unwrap();
    assert_eq!(analysis.best_label(), Some("a1a8"));
    assert_eq!(analysis.best_score, Some(MATE_SCORE - 1));
}

#[test]
fn test_driver_on_mated_root_has_no_best_move() {
    let driver = RootDriver::new(EngineConfig::default());
    let analysis = driver.analyze_fen(MATED, 3).unwrap();
    assert!(analysis.reports.is_empty());
    assert_eq!(analysis.best_label(), None);
}
