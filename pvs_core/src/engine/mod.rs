use crate::logic::board::{square_name, PieceKind};
use crate::logic::oracle::{OracleError, PositionOracle};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod bench;
pub mod config;
pub mod context;
pub mod driver;
pub mod eval;
pub mod move_list;
pub mod search;
pub mod task;
pub mod tt;

#[cfg(test)]
mod mate_test;

/// Outer window sentinel. Leaves headroom so negation never overflows.
pub const SCORE_INF: i32 = i32::MAX - 10;
pub const SCORE_NEG_INF: i32 = i32::MIN + 10;
/// Score of a node with no moves is `-MATE_SCORE + depth`.
pub const MATE_SCORE: i32 = 32_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Move {
    pub from: u8,
    pub to: u8,
    pub promotion: Option<PieceKind>,
    pub captured: Option<PieceKind>,
    pub bad_capture: bool,
    pub score: i32,
}

impl Move {
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub const fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", square_name(self.from), square_name(self.to))?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.symbol())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Exact,
    CutNode,
    LowerBound,
    UpperBound,
    StaticNull,
    NullMove,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exact => "Exact",
            Self::CutNode => "CutNode",
            Self::LowerBound => "LowerBound",
            Self::UpperBound => "UpperBound",
            Self::StaticNull => "StaticNull",
            Self::NullMove => "NullMove",
        };
        f.pad(name)
    }
}

/// Bounded score returned by every search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub score: i32,
    pub kind: NodeKind,
}

impl Node {
    pub const fn new(score: i32, kind: NodeKind) -> Self {
        Self { score, kind }
    }

    pub const fn exact(score: i32) -> Self {
        Self::new(score, NodeKind::Exact)
    }

    pub const fn cut(score: i32) -> Self {
        Self::new(score, NodeKind::CutNode)
    }

    #[must_use]
    pub const fn negate(self) -> Self {
        Self {
            score: -self.score,
            kind: self.kind,
        }
    }
}

impl std::ops::Neg for Node {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

/// Static evaluation, positive favours the side to move.
pub trait Evaluator<O: PositionOracle + ?Sized> {
    fn evaluate(&mut self, pos: &O) -> i32;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCounters {
    pub evaluations: u64,
    pub generation_calls: u64,
    pub tt_hits: u64,
    pub researches: u64,
    pub beta_cuts: u64,
    pub first_move_cuts: u64,
    pub null_move_searches: u64,
    pub failed_moves: u64,
}

impl SearchCounters {
    pub fn merge(&mut self, other: &Self) {
        self.evaluations += other.evaluations;
        self.generation_calls += other.generation_calls;
        self.tt_hits += other.tt_hits;
        self.researches += other.researches;
        self.beta_cuts += other.beta_cuts;
        self.first_move_cuts += other.first_move_cuts;
        self.null_move_searches += other.null_move_searches;
        self.failed_moves += other.failed_moves;
    }

    /// Share of beta cutoffs produced by the first move tried, `None` without cutoffs.
    #[allow(clippy::cast_precision_loss)]
    pub fn first_move_cut_ratio(&self) -> Option<f64> {
        if self.beta_cuts == 0 {
            None
        } else {
            Some(self.first_move_cuts as f64 / self.beta_cuts as f64)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Position(#[from] OracleError),
    #[error("search task for {label} panicked")]
    TaskPanicked { label: String },
}
