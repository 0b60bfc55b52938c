use crate::logic::eval_constants::{
    CAPTURE_VALUES, CHECK_PENALTY, KING_SHIELD, PAIR_BISHOP, PAIR_KNIGHT, PAIR_ROOK, PAWN_BACKWARD,
    PAWN_DEFENDED, PAWN_ISOLATED, PAWN_OPEN, PAWN_PASSED, ROOK_CONNECTED, ROOK_SEVENTH, TEMPO,
    VAL_BISHOP, VAL_KNIGHT, VAL_PAWN, VAL_QUEEN, VAL_ROOK,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Evaluation Parameters
    pub val_pawn: i32,
    pub val_knight: i32,
    pub val_bishop: i32,
    pub val_rook: i32,
    pub val_queen: i32,
    pub pair_knight: i32,
    pub pair_bishop: i32,
    pub pair_rook: i32,
    pub pawn_open: i32,
    pub pawn_passed: i32,
    pub pawn_defended: i32,
    pub pawn_backward: i32,
    pub pawn_isolated: i32,
    pub rook_seventh: i32,
    pub rook_connected: i32,
    pub tempo: i32,
    pub check_penalty: i32,
    pub king_shield: [i32; 6],
    /// Game phase flag: switches king tables, margins and qsearch pruning.
    pub endgame: bool,

    // Search Parameters
    pub static_null_pruning: bool,
    pub static_null_margins: [i32; 3],
    pub static_null_margins_endgame: [i32; 3],
    pub null_move_pruning: bool,
    pub null_move_min_depth: i32, // null move needs depth > this
    pub null_move_reduction: i32,
    pub null_move_reduction_deep: i32,
    pub null_move_deep_depth: i32, // deep reduction above this depth
    pub null_move_depth_cut: i32,
    pub check_extension_floor: i32,
    pub qsearch_floor: i32,
    pub delta_margin: i32,
    pub capture_margin: i32,
    pub capture_values: [i32; 7],

    // Driver Parameters
    pub presearch_threshold: i32,
    pub presearch_reduction: i32,
    pub workers: usize,
    pub shared_bounds: bool,
    pub progress_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            val_pawn: VAL_PAWN,
            val_knight: VAL_KNIGHT,
            val_bishop: VAL_BISHOP,
            val_rook: VAL_ROOK,
            val_queen: VAL_QUEEN,
            pair_knight: PAIR_KNIGHT,
            pair_bishop: PAIR_BISHOP,
            pair_rook: PAIR_ROOK,
            pawn_open: PAWN_OPEN,
            pawn_passed: PAWN_PASSED,
            pawn_defended: PAWN_DEFENDED,
            pawn_backward: PAWN_BACKWARD,
            pawn_isolated: PAWN_ISOLATED,
            rook_seventh: ROOK_SEVENTH,
            rook_connected: ROOK_CONNECTED,
            tempo: TEMPO,
            check_penalty: CHECK_PENALTY,
            king_shield: KING_SHIELD,
            endgame: false,

            static_null_pruning: true,
            static_null_margins: [0, 120, 240],
            static_null_margins_endgame: [60, 180, 340],
            null_move_pruning: true,
            null_move_min_depth: 2,
            null_move_reduction: 3,
            null_move_reduction_deep: 4,
            null_move_deep_depth: 6,
            null_move_depth_cut: 4,
            check_extension_floor: -10,
            qsearch_floor: -100,
            delta_margin: 1000,
            capture_margin: 200,
            capture_values: CAPTURE_VALUES,

            presearch_threshold: 9,
            presearch_reduction: 4,
            workers: 1,
            shared_bounds: true,
            progress_interval_ms: 750,
        }
    }
}

impl EngineConfig {
    /// Configuration with every pruning heuristic and the shared bound
    /// disabled. Search results then equal plain negamax.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            static_null_pruning: false,
            null_move_pruning: false,
            shared_bounds: false,
            ..Self::default()
        }
    }

    pub fn static_null_margin(&self, depth: i32) -> Option<i32> {
        let margins = if self.endgame {
            &self.static_null_margins_endgame
        } else {
            &self.static_null_margins
        };
        usize::try_from(depth).ok().and_then(|d| margins.get(d).copied())
    }

    pub const fn null_move_r(&self, depth: i32) -> i32 {
        if depth > self.null_move_deep_depth {
            self.null_move_reduction_deep
        } else {
            self.null_move_reduction
        }
    }
}

/// On-disk format: evaluation weights are scale factors applied to the
/// defaults, search and driver parameters are absolute.
#[derive(Deserialize)]
struct EngineConfigJson {
    val_pawn: Option<f32>,
    val_knight: Option<f32>,
    val_bishop: Option<f32>,
    val_rook: Option<f32>,
    val_queen: Option<f32>,
    pair_knight: Option<f32>,
    pair_bishop: Option<f32>,
    pair_rook: Option<f32>,
    pawn_open: Option<f32>,
    pawn_passed: Option<f32>,
    pawn_defended: Option<f32>,
    pawn_backward: Option<f32>,
    pawn_isolated: Option<f32>,
    rook_seventh: Option<f32>,
    rook_connected: Option<f32>,
    tempo: Option<f32>,
    check_penalty: Option<f32>,
    king_shield: Option<[i32; 6]>,
    endgame: Option<bool>,

    static_null_pruning: Option<bool>,
    static_null_margins: Option<[i32; 3]>,
    static_null_margins_endgame: Option<[i32; 3]>,
    null_move_pruning: Option<bool>,
    null_move_min_depth: Option<i32>,
    null_move_reduction: Option<i32>,
    null_move_reduction_deep: Option<i32>,
    null_move_deep_depth: Option<i32>,
    null_move_depth_cut: Option<i32>,
    check_extension_floor: Option<i32>,
    qsearch_floor: Option<i32>,
    delta_margin: Option<i32>,
    capture_margin: Option<i32>,
    capture_values: Option<[i32; 7]>,

    presearch_threshold: Option<i32>,
    presearch_reduction: Option<i32>,
    workers: Option<usize>,
    shared_bounds: Option<bool>,
    progress_interval_ms: Option<u64>,
}

impl EngineConfig {
    pub fn load_from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        let json: EngineConfigJson = serde_json::from_str(json_str)?;
        let d = Self::default();

        Ok(Self {
            val_pawn: apply_scale(d.val_pawn, json.val_pawn),
            val_knight: apply_scale(d.val_knight, json.val_knight),
            val_bishop: apply_scale(d.val_bishop, json.val_bishop),
            val_rook: apply_scale(d.val_rook, json.val_rook),
            val_queen: apply_scale(d.val_queen, json.val_queen),
            pair_knight: apply_scale(d.pair_knight, json.pair_knight),
            pair_bishop: apply_scale(d.pair_bishop, json.pair_bishop),
            pair_rook: apply_scale(d.pair_rook, json.pair_rook),
            pawn_open: apply_scale(d.pawn_open, json.pawn_open),
            pawn_passed: apply_scale(d.pawn_passed, json.pawn_passed),
            pawn_defended: apply_scale(d.pawn_defended, json.pawn_defended),
            pawn_backward: apply_scale(d.pawn_backward, json.pawn_backward),
            pawn_isolated: apply_scale(d.pawn_isolated, json.pawn_isolated),
            rook_seventh: apply_scale(d.rook_seventh, json.rook_seventh),
            rook_connected: apply_scale(d.rook_connected, json.rook_connected),
            tempo: apply_scale(d.tempo, json.tempo),
            check_penalty: apply_scale(d.check_penalty, json.check_penalty),
            king_shield: json.king_shield.unwrap_or(d.king_shield),
            endgame: json.endgame.unwrap_or(d.endgame),

            static_null_pruning: json.static_null_pruning.unwrap_or(d.static_null_pruning),
            static_null_margins: json.static_null_margins.unwrap_or(d.static_null_margins),
            static_null_margins_endgame: json
                .static_null_margins_endgame
                .unwrap_or(d.static_null_margins_endgame),
            null_move_pruning: json.null_move_pruning.unwrap_or(d.null_move_pruning),
            null_move_min_depth: json.null_move_min_depth.unwrap_or(d.null_move_min_depth),
            null_move_reduction: json.null_move_reduction.unwrap_or(d.null_move_reduction),
            null_move_reduction_deep: json
                .null_move_reduction_deep
                .unwrap_or(d.null_move_reduction_deep),
            null_move_deep_depth: json.null_move_deep_depth.unwrap_or(d.null_move_deep_depth),
            null_move_depth_cut: json.null_move_depth_cut.unwrap_or(d.null_move_depth_cut),
            check_extension_floor: json
                .check_extension_floor
                .unwrap_or(d.check_extension_floor),
            qsearch_floor: json.qsearch_floor.unwrap_or(d.qsearch_floor),
            delta_margin: json.delta_margin.unwrap_or(d.delta_margin),
            capture_margin: json.capture_margin.unwrap_or(d.capture_margin),
            capture_values: json.capture_values.unwrap_or(d.capture_values),

            presearch_threshold: json.presearch_threshold.unwrap_or(d.presearch_threshold),
            presearch_reduction: json.presearch_reduction.unwrap_or(d.presearch_reduction),
            workers: json.workers.unwrap_or(d.workers).max(1),
            shared_bounds: json.shared_bounds.unwrap_or(d.shared_bounds),
            progress_interval_ms: json.progress_interval_ms.unwrap_or(d.progress_interval_ms),
        })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn apply_scale(default_val: i32, scale: Option<f32>) -> i32 {
    scale.map_or(default_val, |s| (default_val as f32 * s) as i32)
}
