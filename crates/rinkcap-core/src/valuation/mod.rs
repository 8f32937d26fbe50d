// Valuation engine: draftability, z-scores, and auction bid pricing.

pub mod auction;
pub mod zscore;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::LeagueConfig;
use crate::pool::PlayerPool;

/// Decimal places kept on stored z-scores and bids.
pub const DISPLAY_DECIMALS: i32 = 2;

/// Round to `DISPLAY_DECIMALS` places.
pub fn round_display(value: f64) -> f64 {
    let scale = 10f64.powi(DISPLAY_DECIMALS);
    (value * scale).round() / scale
}

/// Aggregates from one recompute, reported for observability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketSummary {
    /// `salary_cap × num_teams`.
    pub total_pool: f64,
    /// Committed contracts plus all team penalties.
    pub committed_salary: f64,
    pub available_to_spend: f64,
    pub player_count: usize,
    pub total_z: f64,
    /// Sum of the bids written to draftable players.
    pub total_bid_sum: f64,
    pub reserve: f64,
    /// Dollars per unit of shifted z-score.
    pub rate: f64,
}

/// Run the full valuation pipeline over the pool: zero open-pool salaries,
/// mark draftable players, store their z-scores, and reprice them.
///
/// Returns `None` and leaves the pool untouched when there is nothing to
/// value. All figures are computed before the pool is written, so a failed
/// pass never leaves it half-updated.
pub fn recompute(pool: &mut PlayerPool, league: &LeagueConfig) -> Option<MarketSummary> {
    if pool.is_empty() {
        warn!("recompute skipped: player pool is empty");
        return None;
    }

    let pass = zscore::compute_valuations(pool.players(), league);
    let total_pool = league.total_pool();
    let committed_salary = auction::committed_league_salary(pool.players(), league);
    let available_to_spend = total_pool - committed_salary;
    let pricing = auction::compute_pricing(
        pass.player_count,
        pass.total_z,
        available_to_spend,
        league.min_player_price,
    );

    if !pricing.rate.is_finite() {
        warn!("recompute aborted: non-finite market rate {}", pricing.rate);
        return None;
    }

    let zscores = pass.zscores_by_id(pool.len());
    let mut total_bid_sum = 0.0;
    for player in pool.players_mut() {
        if player.is_unowned() {
            player.salary = 0.0;
        }
        match zscores.get(player.id).copied().flatten() {
            Some(z) => {
                player.draftable = true;
                player.z_score = Some(round_display(z));
                player.bid = pricing.bid_for(z);
                total_bid_sum += player.bid;
            }
            None => {
                player.draftable = false;
                player.z_score = None;
            }
        }
    }

    if pricing.rate < 0.0 {
        warn!(
            "league is over-committed: {:.2} available against a {:.2} reserve",
            available_to_spend, pricing.reserve
        );
    }

    let summary = MarketSummary {
        total_pool,
        committed_salary,
        available_to_spend,
        player_count: pass.player_count,
        total_z: pass.total_z,
        total_bid_sum,
        reserve: pricing.reserve,
        rate: pricing.rate,
    };
    info!(
        "recompute: {} draftable, total_z {:.2}, available {:.2}, rate {:.3}/z, bids {:.2}",
        summary.player_count,
        summary.total_z,
        summary.available_to_spend,
        summary.rate,
        summary.total_bid_sum
    );
    Some(summary)
}


#[cfg(test)]
mod tests {
    use super::tests_support::small_league;
    use super::*;
    use crate::pool::player::{OwnershipStatus, PlayerRecord, Position};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn record(
        position: Position,
        team: &str,
        status: OwnershipStatus,
        salary: f64,
        points: u32,
    ) -> PlayerRecord {
        PlayerRecord {
            name: format!("{position}{points}"),
            position,
            nhl_team: "BOS".into(),
            league_team: team.into(),
            status,
            age: 28,
            group: "A".into(),
            salary,
            bid: 0.0,
            points,
        }
    }

    fn pool() -> PlayerPool {
        PlayerPool::from_records(vec![
            record(Position::Forward, "UFA", OwnershipStatus::No, 3.0, 60),
            record(Position::Forward, "UFA", OwnershipStatus::No, 0.0, 45),
            record(Position::Forward, "RFA", OwnershipStatus::No, 0.0, 30),
            record(Position::Forward, "BOT", OwnershipStatus::Start, 6.0, 70),
            record(Position::Defence, "ENT", OwnershipStatus::No, 0.0, 25),
            record(Position::Defence, "UFA", OwnershipStatus::No, 0.0, 15),
            record(Position::Goalie, "UFA", OwnershipStatus::No, 0.0, 40),
            record(Position::Goalie, "GVR", OwnershipStatus::Start, 4.0, 50),
        ])
    }

    #[test]
    fn round_display_two_places() {
        assert_eq!(round_display(1.23456), 1.23);
        assert_eq!(round_display(-1.004), -1.0);
        assert_eq!(round_display(2.0), 2.0);
    }

    #[test]
    fn empty_pool_returns_none() {
        let mut pool = PlayerPool::default();
        assert!(recompute(&mut pool, &small_league()).is_none());
        assert_eq!(pool.revision(), 0);
    }

    #[test]
    fn recompute_marks_and_prices() {
        let mut pool = pool();
        let league = small_league();
        let summary = recompute(&mut pool, &league).unwrap();

        assert!(approx_eq(summary.total_pool, 40.0, 1e-9));
        assert!(approx_eq(summary.committed_salary, 10.0, 1e-9));
        assert!(approx_eq(summary.available_to_spend, 30.0, 1e-9));

        // Forwards: baseline 4, all three free agents draftable.
        // Defence: baseline 2, both draftable. Goalies: baseline 2, one free agent.
        assert_eq!(summary.player_count, 6);
        let draftable: Vec<usize> = pool
            .players()
            .iter()
            .filter(|p| p.draftable)
            .map(|p| p.id)
            .collect();
        assert_eq!(draftable, vec![0, 1, 2, 4, 5, 6]);

        // Open-pool salary zeroed.
        assert_eq!(pool.get(0).unwrap().salary, 0.0);
        // Owned players keep their bid and have no z-score.
        assert!(pool.get(3).unwrap().z_score.is_none());
        assert_eq!(pool.get(3).unwrap().bid, 0.0);

        // Each position's weakest draftable player sits at z = 0 and the minimum price.
        for id in [2usize, 5, 6] {
            let p = pool.get(id).unwrap();
            assert_eq!(p.z_score, Some(0.0));
            assert!(approx_eq(p.bid, league.min_player_price, 1e-9));
        }

        assert!(approx_eq(
            summary.total_bid_sum,
            summary.available_to_spend,
            summary.player_count as f64 * 0.05
        ));
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut pool = pool();
        let league = small_league();
        let first = recompute(&mut pool, &league).unwrap();
        let snapshot = pool.players().to_vec();
        let second = recompute(&mut pool, &league).unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.players(), snapshot.as_slice());
    }

    #[test]
    fn stale_zscore_cleared_when_player_is_owned() {
        let mut pool = pool();
        let league = small_league();
        recompute(&mut pool, &league).unwrap();
        assert!(pool.get(0).unwrap().draftable);

        pool.assign(0, "GVR", 7.5).unwrap();
        recompute(&mut pool, &league).unwrap();
        let p = pool.get(0).unwrap();
        assert!(!p.draftable);
        assert!(p.z_score.is_none());
        assert!(approx_eq(p.bid, 7.5, 1e-9));
    }
}
