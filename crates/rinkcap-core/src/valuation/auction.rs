// Auction bid pricing.
//
// Converts the dollars still available to the open market into a single
// dollars-per-z rate and prices every draftable player with it. Every
// draftable player is reserved the league minimum first; the rest of the
// market is spread proportionally to shifted z-score.

use crate::config::LeagueConfig;
use crate::pool::player::Player;

use super::round_display;

// ---------------------------------------------------------------------------
// Committed salary
// ---------------------------------------------------------------------------

/// League-wide committed salary: START contracts, MINOR contracts in cap
/// groups, and every team's penalty.
///
/// Open-pool players count as zero salary regardless of the stored value,
/// since recompute zeroes them anyway.
pub fn committed_league_salary(players: &[Player], league: &LeagueConfig) -> f64 {
    let contracts: f64 = players
        .iter()
        .filter(|p| !p.is_unowned() && p.salary_is_committed(&league.minor_cap_groups))
        .map(|p| p.salary)
        .sum();
    contracts + league.total_penalties()
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// Conversion factors derived once per recompute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BidPricing {
    /// `player_count × min_player_price`.
    pub reserve: f64,
    /// Dollars per unit of shifted z. Negative when the league is
    /// over-committed; zero when there is no z-score to spread over.
    pub rate: f64,
    pub min_price: f64,
}

/// Compute the market rate.
///
/// `rate = (available_to_spend - reserve) / total_z`, or 0.0 when
/// `total_z` is zero so that every draftable player lands on the minimum.
pub fn compute_pricing(
    player_count: usize,
    total_z: f64,
    available_to_spend: f64,
    min_price: f64,
) -> BidPricing {
    let reserve = player_count as f64 * min_price;
    let rate = if total_z.abs() > f64::EPSILON {
        (available_to_spend - reserve) / total_z
    } else {
        0.0
    };
    BidPricing {
        reserve,
        rate,
        min_price,
    }
}

impl BidPricing {
    /// Price one draftable player from its unrounded shifted z-score.
    pub fn bid_for(&self, z_score: f64) -> f64 {
        round_display(z_score * self.rate + self.min_price)
    }
}
