use crate::engine::config::EngineConfig;
use crate::engine::eval::StaticEvaluator;
use crate::engine::{Evaluator, SearchError};
use crate::logic::game::ChessOracle;
use crate::logic::oracle::PositionOracle;
use std::fmt;
use std::hint::black_box;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Middlegame positions from common Sicilian and Italian lines.
pub const BENCH_FENS: [&str; 27] = [
    "r2qk2r/pp2bppp/2b1pn2/2pp4/5P2/1P2PN2/PBPP2PP/RN1Q1RK1 w kq - 0 1",
    "r3kb1r/pp1q1ppp/2nppn2/8/3pP3/2P2N2/PP3PPP/RNBQR1K1 w kq - 0 1",
    "r3kb1r/pp1qpppp/3p4/2pPn3/4n3/2P2N2/PP3PPP/RNBQ1RK1 w kq - 0 1",
    "r2qkb1r/pp3ppp/2bppn2/6B1/3QP3/2N2N2/PPP2PPP/R3K2R w KQkq - 0 1",
    "rnb1k2r/1pq1bppp/p2ppn2/6B1/3NPP2/2N2Q2/PPP3PP/R3KB1R w KQkq - 0 1",
    "rn1qk2r/1p2bppp/p2pbn2/4p3/4P3/1NN1BP2/PPP3PP/R2QKB1R w KQkq - 0 1",
    "r1bq1rk1/pp2ppbp/2np1np1/8/3NP3/2N1BP2/PPPQ2PP/R3KB1R w KQ - 0 1",
    "r1bqkb1r/5ppp/p1np1n2/1p2p1B1/4P3/N1N5/PPP2PPP/R2QKB1R w KQkq - 0 1",
    "r2qkb1r/1p1b1ppp/p1nppn2/6B1/3NP3/2N5/PPPQ1PPP/2KR1B1R w kq - 0 1",
    "r1bqkb1r/1p3pp1/p1nppn1p/6B1/3NP3/2N5/PPPQ1PPP/2KR1B1R w kq - 0 1",
    "r1bqkb1r/pp3pp1/2n1pn1p/3p4/3NP1PP/2N5/PPP2P2/R1BQKBR1 w Qkq - 0 1",
    "r1bqkb1r/pp3pp1/2nppn2/7p/3NP1PP/2N5/PPP2P2/R1BQKBR1 w Qkq - 0 1",
    "r1bqk2r/1p2bppp/p1nppn2/8/2BNP3/2N1B3/PPP1QPPP/R3K2R w KQkq - 0 1",
    "r1b1k2r/pp2bppp/1qnppn2/8/2B1P3/1NN5/PPP2PPP/R1BQ1RK1 w kq - 0 1",
    "r1bq1rk1/pp2bppp/2nppn2/8/3NP3/2N1B3/PPP1BPPP/R2Q1RK1 w - - 0 1",
    "r1bqkb1r/3n1ppp/p2ppn2/1p6/3NP3/2N1BP2/PPPQ2PP/R3KB1R w KQkq - 0 1",
    "rnb1k1nr/1pqp1ppp/p3p3/8/1b1NP3/2N3P1/PPP2P1P/R1BQKB1R w KQkq - 0 1",
    "r1b1k2r/1pqp1ppp/p1n1pn2/8/1b1NP3/2N1B3/PPPQ1PPP/2KR1B1R w kq - 0 1",
    "r1bqkb1r/pppp1pp1/5np1/3P4/8/2PB4/PP3PPP/RNBQK2R w KQkq - 0 1",
    "rnbqk2r/ppppbppp/8/3P4/8/2PN4/PP3PPP/RNBQK2R w KQkq - 0 1",
    "r1bqkbnr/ppp3pp/2n2p2/1B1pp3/Q3P3/2P2N2/PP1P1PPP/RNB1K2R b KQkq - 0 1",
    "r2qkb1r/pppb1ppp/5n2/3P4/2B1p3/2P2Q2/PP1P1PPP/RNB1K2R w KQkq - 0 1",
    "2kr1bnr/pppb1ppp/2nq4/4p3/Q1B5/2P2N2/PP1P1PPP/RNB2RK1 w - - 0 1",
    "r1b1kbnr/ppp2ppp/2n5/1B1qp3/Q7/2P2N2/PP1P1PPP/RNB1K2R b KQkq - 0 1",
    "r1bq1rk1/pppp1ppp/2n5/3nP3/3P4/5N2/PP1Q1PPP/RN2KB1R w KQ - 0 1",
    "r2qk2r/ppp1bppp/2npb3/1B1nP3/3P4/2N2N2/PP3PPP/R1BQK2R w KQkq - 0 1",
    "r1b1kb1r/ppp3pp/2n2q2/3p4/3pn3/2P2N2/PP1NQPPP/R1B1KB1R w KQkq - 0 1",
];

const BATCH: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchReport {
    pub evals_per_sec: f64,
    pub generations_per_sec: f64,
    pub budget: Duration,
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "eval {:.0}/s  movegen {:.0}/s  ({} ms each)",
            self.evals_per_sec,
            self.generations_per_sec,
            self.budget.as_millis()
        )
    }
}

fn positions() -> Result<Vec<ChessOracle>, SearchError> {
    BENCH_FENS
        .iter()
        .map(|fen| ChessOracle::from_fen(fen).map_err(SearchError::from))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn rate(cycles: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        cycles as f64 / secs
    } else {
        0.0
    }
}

/// Static evaluations per second, cycling through the library until
/// `budget` has elapsed. The pawn cache stays warm, as it does in a search.
pub fn eval_speed(config: &Arc<EngineConfig>, budget: Duration) -> Result<f64, SearchError> {
    let positions = positions()?;
    let mut evaluator = StaticEvaluator::new(Arc::clone(config));
    let timer = Instant::now();
    let mut cycles = 0;

    for pos in positions.iter().cycle() {
        for _ in 0..BATCH {
            black_box(evaluator.evaluate(black_box(pos)));
        }
        cycles += BATCH;
        if timer.elapsed() >= budget {
            break;
        }
    }
    Ok(rate(cycles, timer.elapsed()))
}

/// Full legal move generations per second over the same library.
pub fn movegen_speed(budget: Duration) -> Result<f64, SearchError> {
    let positions = positions()?;
    let timer = Instant::now();
    let mut cycles = 0;

    for pos in positions.iter().cycle() {
        for _ in 0..BATCH {
            black_box(black_box(pos).generate_moves());
        }
        cycles += BATCH;
        if timer.elapsed() >= budget {
            break;
        }
    }
    Ok(rate(cycles, timer.elapsed()))
}

pub fn run(config: &Arc<EngineConfig>, budget: Duration) -> Result<BenchReport, SearchError> {
    let evals_per_sec = eval_speed(config, budget)?;
    let generations_per_sec = movegen_speed(budget)?;
    log::info!("bench: {evals_per_sec:.0} evals/s, {generations_per_sec:.0} generations/s");
    Ok(BenchReport {
        evals_per_sec,
        generations_per_sec,
        budget,
    })
}
