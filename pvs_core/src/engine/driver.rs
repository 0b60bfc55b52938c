use crate::engine::config::EngineConfig;
use crate::engine::context::SearchContext;
use crate::engine::eval::StaticEvaluator;
use crate::engine::task::{render_table, SearchTask, TaskReport};
use crate::engine::{Evaluator, SearchCounters, SearchError};
use crate::logic::board::Side;
use crate::logic::game::ChessOracle;
use crate::logic::oracle::PositionOracle;
use crossbeam_channel::{RecvTimeoutError, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::Scope;
use std::time::{Duration, Instant};

/// A legal root move and the position it leads to.
struct RootMove<S> {
    /// Position in the root's move-ordering sequence.
    index: usize,
    label: String,
    snapshot: S,
}

type Completion = (usize, Result<TaskReport, SearchError>);

/// Result of one root evaluation pass.
#[derive(Debug, Clone)]
pub struct RootAnalysis {
    /// One report per root move, in launch order.
    pub reports: Vec<TaskReport>,
    /// Index into `reports`.
    pub best: Option<usize>,
    pub best_score: Option<i32>,
    pub root_side: Side,
    pub depth: i32,
    /// Shallow ordering scores aligned with `reports`, when a pre-search ran.
    pub presearch_scores: Option<Vec<i32>>,
    pub totals: SearchCounters,
    pub elapsed: Duration,
    /// Mean over tasks that produced at least one cutoff.
    pub first_move_cut_ratio: Option<f64>,
}

impl RootAnalysis {
    pub fn best_report(&self) -> Option<&TaskReport> {
        self.best.and_then(|i| self.reports.get(i))
    }

    pub fn best_label(&self) -> Option<&str> {
        self.best_report().map(|r| r.label.as_str())
    }

    pub fn table(&self) -> String {
        render_table(&self.reports)
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn summary_line(&self) -> String {
        let secs = self.elapsed.as_secs_f64();
        let rate = |count: u64| {
            if secs > 0.0 {
                (count as f64 / secs) as u64
            } else {
                0
            }
        };
        format!(
            "{:.2}s  cutoffs at first move {:.1}%  evals {}  gens {}  evals/s {}  gens/s {}",
            secs,
            self.first_move_cut_ratio.unwrap_or(0.0) * 100.0,
            self.totals.evaluations,
            self.totals.generation_calls,
            rate(self.totals.evaluations),
            rate(self.totals.generation_calls)
        )
    }
}

/// Runs one independent search per root move under a bounded worker budget.
pub struct RootDriver {
    config: Arc<EngineConfig>,
}

impl RootDriver {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Chess position in, best root move out.
    pub fn analyze_fen(&self, fen: &str, depth: i32) -> Result<RootAnalysis, SearchError> {
        let root = ChessOracle::from_fen(fen)?;
        self.analyze::<ChessOracle, _, _>(&root.snapshot(), depth, &|config: &Arc<EngineConfig>| {
            StaticEvaluator::new(Arc::clone(config))
        })
    }

    /// Evaluates every root move of `snapshot` at `depth - 1` plies below it.
    ///
    /// Each task builds its own oracle and evaluator on its worker thread,
    /// so neither needs to be `Send`.
    pub fn analyze<O, E, F>(
        &self,
        snapshot: &O::Snapshot,
        depth: i32,
        make_evaluator: &F,
    ) -> Result<RootAnalysis, SearchError>
    where
        O: PositionOracle,
        E: Evaluator<O>,
        F: Fn(&Arc<EngineConfig>) -> E + Sync,
    {
        let ctx = if self.config.shared_bounds {
            SearchContext::new()
        } else {
            SearchContext::strict()
        };
        self.analyze_with::<O, E, F>(&ctx, snapshot, depth, make_evaluator)
    }

    fn analyze_with<O, E, F>(
        &self,
        ctx: &SearchContext,
        snapshot: &O::Snapshot,
        depth: i32,
        make_evaluator: &F,
    ) -> Result<RootAnalysis, SearchError>
    where
        O: PositionOracle,
        E: Evaluator<O>,
        F: Fn(&Arc<EngineConfig>) -> E + Sync,
    {
        let timer = Instant::now();
        let mut root = O::from_snapshot(snapshot)?;
        let root_side = root.side_to_move();
        let mut roots = root_moves(&mut root);

        let mut presearch_scores = None;
        if depth > self.config.presearch_threshold && roots.len() > 1 {
            let shallow = depth - self.config.presearch_reduction;
            log::info!("pre-search at depth {shallow} to order {} root moves", roots.len());
            let ordering = self.analyze_with::<O, E, F>(ctx, snapshot, shallow, make_evaluator)?;
            ctx.reset();

            let mut scored: Vec<(RootMove<O::Snapshot>, i32)> = roots
                .into_iter()
                .map(|rm| {
                    let score = ordering
                        .reports
                        .iter()
                        .find(|r| r.move_index == rm.index)
                        .map_or(crate::engine::SCORE_NEG_INF, |r| r.score);
                    (rm, score)
                })
                .collect();
            scored.sort_by_key(|(_, score)| std::cmp::Reverse(*score));
            presearch_scores = Some(scored.iter().map(|(_, score)| *score).collect());
            roots = scored.into_iter().map(|(rm, _)| rm).collect();
        }

        let reports = self.run_pass::<O, E, F>(ctx, root_side, &roots, depth - 1, make_evaluator)?;

        let mut best: Option<(usize, i32)> = None;
        let mut totals = SearchCounters::default();
        let mut ratios = Vec::new();
        for (i, report) in reports.iter().enumerate() {
            match best {
                Some((_, score)) if report.score <= score => {}
                _ => best = Some((i, report.score)),
            }
            totals.merge(&report.counters);
            if let Some(ratio) = report.counters.first_move_cut_ratio() {
                ratios.push(ratio);
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let first_move_cut_ratio =
            (!ratios.is_empty()).then(|| ratios.iter().sum::<f64>() / ratios.len() as f64);

        let analysis = RootAnalysis {
            reports,
            best: best.map(|(i, _)| i),
            best_score: best.map(|(_, score)| score),
            root_side,
            depth,
            presearch_scores,
            totals,
            elapsed: timer.elapsed(),
            first_move_cut_ratio,
        };
        log::info!(
            "depth {depth}: best {} ({}), {}",
            analysis.best_label().unwrap_or("-"),
            analysis.best_score.map_or_else(|| "-".to_string(), |s| s.to_string()),
            analysis.summary_line()
        );
        Ok(analysis)
    }

    /// Launches up to `workers` tasks and admits the next queued one each
    /// time a running task finishes. Reports come back in launch order.
    fn run_pass<O, E, F>(
        &self,
        ctx: &SearchContext,
        root_side: Side,
        roots: &[RootMove<O::Snapshot>],
        task_depth: i32,
        make_evaluator: &F,
    ) -> Result<Vec<TaskReport>, SearchError>
    where
        O: PositionOracle,
        E: Evaluator<O>,
        F: Fn(&Arc<EngineConfig>) -> E + Sync,
    {
        let workers = self.config.workers.max(1);
        let interval = Duration::from_millis(self.config.progress_interval_ms.max(1));
        let (tx, rx) = crossbeam_channel::unbounded::<Completion>();
        let mut slots: Vec<Option<TaskReport>> = vec![None; roots.len()];

        std::thread::scope(|scope| -> Result<(), SearchError> {
            let mut queue = roots.iter().enumerate();
            let mut running = 0usize;
            for (slot, root) in queue.by_ref().take(workers) {
                self.spawn_task::<O, E, F>(scope, &tx, ctx, slot, root, task_depth, make_evaluator);
                running += 1;
            }

            let mut finished = 0usize;
            while running > 0 {
                match rx.recv_timeout(interval) {
                    Ok((slot, outcome)) => {
                        running -= 1;
                        let report = outcome?;
                        ctx.publish(root_side, report.score);
                        if let Some(entry) = slots.get_mut(slot) {
                            *entry = Some(report);
                        }
                        finished += 1;

                        if let Some((slot, root)) = queue.next() {
                            self.spawn_task::<O, E, F>(
                                scope,
                                &tx,
                                ctx,
                                slot,
                                root,
                                task_depth,
                                make_evaluator,
                            );
                            running += 1;
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        let done: Vec<TaskReport> = slots.iter().flatten().cloned().collect();
                        log::info!(
                            "{finished}/{} tasks finished, {running} running\n{}",
                            roots.len(),
                            render_table(&done)
                        );
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            Ok(())
        })?;

        Ok(slots.into_iter().flatten().collect())
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn_task<'scope, 'env, O, E, F>(
        &self,
        scope: &'scope Scope<'scope, 'env>,
        tx: &Sender<Completion>,
        ctx: &'env SearchContext,
        slot: usize,
        root: &RootMove<O::Snapshot>,
        depth: i32,
        make_evaluator: &'env F,
    ) where
        O: PositionOracle,
        E: Evaluator<O>,
        F: Fn(&Arc<EngineConfig>) -> E + Sync,
    {
        let tx = tx.clone();
        let config = Arc::clone(&self.config);
        let snapshot = root.snapshot.clone();
        let label = root.label.clone();
        let index = root.index;
        let seed = index as u64;

        scope.spawn(move || {
            let run = AssertUnwindSafe(|| -> Result<TaskReport, SearchError> {
                let oracle = O::from_snapshot(&snapshot)?;
                let evaluator = make_evaluator(&config);
                let mut task = SearchTask::new(
                    oracle,
                    evaluator,
                    Arc::clone(&config),
                    depth,
                    label.as_str(),
                    seed,
                );
                task.start(ctx);
                Ok(task.report(index))
            });
            let outcome = panic::catch_unwind(run).unwrap_or_else(|_| {
                log::error!("search task for {label} panicked");
                Err(SearchError::TaskPanicked {
                    label: label.clone(),
                })
            });
            if tx.send((slot, outcome)).is_err() {
                log::error!("driver stopped listening before task {label} reported");
            }
        });
    }
}

/// Legal root moves in ordering-score order, each with the position it
/// leads to. Moves the oracle refuses are logged and left out.
fn root_moves<O: PositionOracle>(root: &mut O) -> Vec<RootMove<O::Snapshot>> {
    let mut roots = Vec::new();
    for mv in root.generate_moves().picker() {
        let label = root.move_label(&mv);
        if root.make_move(&mv) {
            roots.push(RootMove {
                index: roots.len(),
                label,
                snapshot: root.snapshot(),
            });
        } else {
            log::error!("root move {label} refused by the position");
        }
        root.unmake_move();
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::tree::{GameTree, TreeEvaluator, TreeOracle, TreeSnapshot};

    fn tree_snapshot(seed: u64, depth: u32, branching: usize) -> TreeSnapshot {
        TreeSnapshot {
            tree: Arc::new(GameTree::random(seed, depth, branching)),
            node: 0,
            side: Side::White,
        }
    }

    fn tree_evaluator(_: &Arc<EngineConfig>) -> TreeEvaluator {
        TreeEvaluator
    }

    struct Exploding;

    impl Evaluator<TreeOracle> for Exploding {
        fn evaluate(&mut self, _pos: &TreeOracle) -> i32 {
            panic!("evaluator blew up");
        }
    }

    #[test]
    fn test_reports_follow_launch_order() {
        let mut config = EngineConfig::strict();
        config.workers = 1;
        let driver = RootDriver::new(config);
        let analysis = driver
            .analyze::<TreeOracle, _, _>(&tree_snapshot(4, 3, 4), 3, &tree_evaluator)
            .unwrap();
        let indices: Vec<usize> = analysis.reports.iter().map(|r| r.move_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(analysis.presearch_scores.is_none());
        assert_eq!(analysis.depth, 3);
        assert!(analysis.reports.iter().all(|r| r.depth == 2));
    }

    #[test]
    fn test_more_workers_than_moves() {
        let mut config = EngineConfig::strict();
        config.workers = 16;
        let driver = RootDriver::new(config);
        let analysis = driver
            .analyze::<TreeOracle, _, _>(&tree_snapshot(5, 3, 3), 3, &tree_evaluator)
            .unwrap();
        assert_eq!(analysis.reports.len(), 3);
        let mut indices: Vec<usize> = analysis.reports.iter().map(|r| r.move_index).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_panicking_task_is_reported() {
        let mut config = EngineConfig::strict();
        config.workers = 2;
        let driver = RootDriver::new(config);
        let result = driver.analyze::<TreeOracle, _, _>(&tree_snapshot(6, 2, 2), 2, &|_: &Arc<EngineConfig>| Exploding);
        match result {
            Err(SearchError::TaskPanicked { label }) => assert!(label.starts_with('n')),
            other => panic!("expected a panicked task, got {other:?}"),
        }
    }

    #[test]
    fn test_root_without_moves_has_no_best() {
        let driver = RootDriver::new(EngineConfig::default());
        let analysis = driver
            .analyze::<TreeOracle, _, _>(&tree_snapshot(1, 0, 2), 4, &tree_evaluator)
            .unwrap();
        assert!(analysis.reports.is_empty());
        assert_eq!(analysis.best, None);
        assert_eq!(analysis.best_score, None);
        assert_eq!(analysis.first_move_cut_ratio, None);
    }

    #[test]
    fn test_invalid_fen_is_an_error() {
        let driver = RootDriver::new(EngineConfig::default());
        assert!(matches!(
            driver.analyze_fen("not a fen", 3),
            Err(SearchError::Position(_))
        ));
    }

    #[test]
    fn test_summary_line_mentions_totals() {
        let driver = RootDriver::new(EngineConfig::strict());
        let analysis = driver
            .analyze::<TreeOracle, _, _>(&tree_snapshot(2, 2, 2), 2, &tree_evaluator)
            .unwrap();
        let line = analysis.summary_line();
        assert!(line.contains(&format!("evals {}", analysis.totals.evaluations)));
        assert_eq!(analysis.table().lines().count(), 3);
    }
}
