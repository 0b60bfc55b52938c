use crate::engine::config::EngineConfig;
use crate::engine::context::SearchContext;
use crate::engine::tt::TranspositionTable;
use crate::engine::{Evaluator, Node, NodeKind, SearchCounters};
use crate::logic::board::Side;
use crate::logic::oracle::PositionOracle;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Finished,
}

/// One complete search below a single root move.
///
/// The task owns its position, transposition table and evaluator; the only
/// state it shares with sibling tasks is the [`SearchContext`] it is
/// started with.
pub struct SearchTask<O: PositionOracle, E: Evaluator<O>> {
    pub(crate) label: String,
    pub(crate) depth: i32,
    pub(crate) seed: u64,
    pub(crate) oracle: O,
    pub(crate) evaluator: E,
    pub(crate) tt: TranspositionTable,
    pub(crate) config: Arc<EngineConfig>,
    pub(crate) counters: SearchCounters,
    /// Side to move in the task's starting position.
    pub(crate) task_side: Side,
    status: TaskStatus,
    result: Option<Node>,
    elapsed: Duration,
    /// `(is_pv, in_check)` seen at every null move tried.
    #[cfg(test)]
    pub(crate) null_move_sites: Vec<(bool, bool)>,
}

impl<O: PositionOracle, E: Evaluator<O>> SearchTask<O, E> {
    /// `oracle` holds the position after the root move `label`.
    pub fn new(
        oracle: O,
        evaluator: E,
        config: Arc<EngineConfig>,
        depth: i32,
        label: impl Into<String>,
        seed: u64,
    ) -> Self {
        let task_side = oracle.side_to_move();
        Self {
            label: label.into(),
            depth,
            seed,
            oracle,
            evaluator,
            tt: TranspositionTable::new(),
            config,
            counters: SearchCounters::default(),
            task_side,
            status: TaskStatus::Pending,
            result: None,
            elapsed: Duration::ZERO,
            #[cfg(test)]
            null_move_sites: Vec::new(),
        }
    }

    /// Runs the search to completion on the calling thread and returns the
    /// score from the root mover's point of view.
    pub fn start(&mut self, ctx: &SearchContext) -> Node {
        self.status = TaskStatus::Running;
        log::debug!(
            "task {} started: depth {}, seed {}",
            self.label,
            self.depth,
            self.seed
        );

        let timer = Instant::now();
        let (alpha, beta) = ctx.window_for(self.root_mover());
        let node = self
            .search(ctx, self.depth, -beta, -alpha, true, true)
            .negate();
        self.elapsed = timer.elapsed();
        self.tt.clear();

        self.result = Some(node);
        self.status = TaskStatus::Finished;
        log::debug!(
            "task {} finished: {} {} in {:?}",
            self.label,
            node.score,
            node.kind,
            self.elapsed
        );
        node
    }

    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub const fn depth(&self) -> i32 {
        self.depth
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Side that played the root move.
    pub const fn root_mover(&self) -> Side {
        self.task_side.opposite()
    }

    pub const fn counters(&self) -> &SearchCounters {
        &self.counters
    }

    pub fn reached_score(&self) -> Option<i32> {
        self.result.map(|node| node.score)
    }

    pub fn score_kind(&self) -> Option<NodeKind> {
        self.result.map(|node| node.kind)
    }

    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    pub const fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Summary of a finished task. `move_index` is the root move's
    /// position in generation order.
    pub fn report(&self, move_index: usize) -> TaskReport {
        let node = self.result.unwrap_or(Node::exact(crate::engine::SCORE_NEG_INF));
        TaskReport {
            move_index,
            label: self.label.clone(),
            score: node.score,
            kind: node.kind,
            depth: self.depth,
            counters: self.counters,
            elapsed: self.elapsed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskReport {
    pub move_index: usize,
    pub label: String,
    pub score: i32,
    pub kind: NodeKind,
    pub depth: i32,
    pub counters: SearchCounters,
    pub elapsed: Duration,
}

impl TaskReport {
    pub const HEADER: [&'static str; 9] = [
        "Score",
        "Move",
        "Type",
        "Eval",
        "Gens",
        "Eval/s",
        "Gen/s",
        "TT hits",
        "re-search",
    ];

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn per_second(&self, count: u64) -> u64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (count as f64 / secs) as u64
        } else {
            0
        }
    }

    pub fn header() -> String {
        let h = Self::HEADER;
        format!(
            "{:<7} {:<7} {:<15} {:>8} {:>20} {:>20} {:>20} {:>20} {:>20}",
            h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]
        )
    }
}

impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<7} {:<7} {:<15} {:>8} {:>20} {:>20} {:>20} {:>20} {:>20}",
            self.score,
            self.label,
            self.kind,
            self.counters.evaluations,
            self.counters.generation_calls,
            self.per_second(self.counters.evaluations),
            self.per_second(self.counters.generation_calls),
            self.counters.tt_hits,
            self.counters.researches
        )
    }
}

/// Header plus one row per report, best score first.
pub fn render_table(reports: &[TaskReport]) -> String {
    let mut rows: Vec<&TaskReport> = reports.iter().collect();
    rows.sort_by_key(|r| std::cmp::Reverse(r.score));
    let mut out = TaskReport::header();
    for row in rows {
        out.push('\n');
        out.push_str(&row.to_string());
    }
    out
}
