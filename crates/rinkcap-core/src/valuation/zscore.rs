// Replacement-level draftability and shifted z-scores per position.

use tracing::debug;

use crate::config::LeagueConfig;
use crate::pool::player::{OwnershipStatus, Player, Position};

// ---------------------------------------------------------------------------
// Pool statistics
// ---------------------------------------------------------------------------

/// Mean and standard deviation of points across a draftable pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Threshold below which standard deviation is treated as zero.
const STDEV_EPSILON: f64 = 1e-9;

/// Mean and sample standard deviation (N - 1 denominator) of `values`.
///
/// The standard deviation falls back to 1.0 when it is zero or undefined
/// (fewer than two values), so callers can always divide by it.
pub fn compute_pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats {
            mean: 0.0,
            stdev: 1.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return PoolStats { mean, stdev: 1.0 };
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stdev = variance.sqrt();
    PoolStats {
        mean,
        stdev: if stdev.is_finite() && stdev >= STDEV_EPSILON {
            stdev
        } else {
            1.0
        },
    }
}

/// Z-scores of `values`, shifted so the smallest is exactly 0.
pub fn shifted_zscores(values: &[f64]) -> Vec<f64> {
    let stats = compute_pool_stats(values);
    let raw: Vec<f64> = values
        .iter()
        .map(|v| (v - stats.mean) / stats.stdev)
        .collect();
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    raw.into_iter().map(|z| z - min).collect()
}

// ---------------------------------------------------------------------------
// Per-position valuation
// ---------------------------------------------------------------------------

/// Outcome of the valuation pass for one position.
#[derive(Debug, Clone)]
pub struct PositionValuation {
    pub position: Position,
    /// `quota × num_teams`.
    pub baseline: usize,
    /// START players ranked below the baseline cutline.
    pub starters_below_baseline: usize,
    pub adjusted_baseline: usize,
    /// `(player id, unrounded shifted z)` for every draftable player, in rank order.
    pub draftable: Vec<(usize, f64)>,
}

impl PositionValuation {
    pub fn total_z(&self) -> f64 {
        self.draftable.iter().map(|(_, z)| z).sum()
    }
}

/// Rank one position and pick its draftable players.
///
/// 1. Drop MINOR players, then stable-sort by points descending.
/// 2. Count START players ranked below `baseline`; they hold cap slots the
///    market cannot fill, so the window shrinks by that many.
/// 3. Within the shrunken window, unowned players are draftable.
/// 4. Z-score the draftable points and shift the minimum to 0.
pub fn value_position(
    players: &[Player],
    position: Position,
    baseline: usize,
) -> PositionValuation {
    let mut ranked: Vec<&Player> = players
        .iter()
        .filter(|p| p.position == position && p.status != OwnershipStatus::Minor)
        .collect();
    ranked.sort_by(|a, b| b.points.cmp(&a.points));

    let starters_below_baseline = ranked
        .iter()
        .skip(baseline)
        .filter(|p| p.status == OwnershipStatus::Start)
        .count();
    let adjusted_baseline = baseline.saturating_sub(starters_below_baseline);

    let window: Vec<&Player> = ranked
        .into_iter()
        .take(adjusted_baseline)
        .filter(|p| p.is_unowned())
        .collect();

    let points: Vec<f64> = window.iter().map(|p| p.points as f64).collect();
    let zscores = if points.is_empty() {
        Vec::new()
    } else {
        shifted_zscores(&points)
    };

    PositionValuation {
        position,
        baseline,
        starters_below_baseline,
        adjusted_baseline,
        draftable: window.iter().map(|p| p.id).zip(zscores).collect(),
    }
}

// ---------------------------------------------------------------------------
// League-wide pass
// ---------------------------------------------------------------------------

/// Valuation of every position plus the engine-wide totals used for pricing.
#[derive(Debug, Clone)]
pub struct ValuationPass {
    pub positions: Vec<PositionValuation>,
    /// Draftable players across all positions.
    pub player_count: usize,
    /// Sum of shifted (unrounded) z-scores across all positions.
    pub total_z: f64,
}

impl ValuationPass {
    /// Unrounded shifted z-score per player id; `None` for non-draftable rows.
    pub fn zscores_by_id(&self, pool_len: usize) -> Vec<Option<f64>> {
        let mut by_id = vec![None; pool_len];
        for valuation in &self.positions {
            for &(id, z) in &valuation.draftable {
                if let Some(slot) = by_id.get_mut(id) {
                    *slot = Some(z);
                }
            }
        }
        by_id
    }
}

/// Run the valuation pass over the whole pool without modifying it.
pub fn compute_valuations(players: &[Player], league: &LeagueConfig) -> ValuationPass {
    let positions: Vec<PositionValuation> = Position::ALL
        .iter()
        .map(|&pos| {
            let valuation = value_position(players, pos, league.baseline(pos));
            debug!(
                "{}: baseline {} adjusted {} ({} starters below), {} draftable",
                pos,
                valuation.baseline,
                valuation.adjusted_baseline,
                valuation.starters_below_baseline,
                valuation.draftable.len()
            );
            valuation
        })
        .collect();

    let player_count = positions.iter().map(|v| v.draftable.len()).sum();
    let total_z = positions.iter().map(PositionValuation::total_z).sum();

    ValuationPass {
        positions,
        player_count,
        total_z,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
