// Mutation API: single-row edits to the player pool.
//
// None of these recompute valuations or bids. Callers run
// `valuation::recompute` once after a batch of edits.

use tracing::debug;

use super::player::{OwnershipStatus, TEAM_UFA};
use super::store::{PlayerPool, PoolError};

fn check_amount(field: &'static str, value: f64) -> Result<(), PoolError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PoolError::InvalidAmount { field, value })
    }
}

impl PlayerPool {
    /// Put a player on `team_code` at `price` as an active (START) player.
    pub fn assign(
        &mut self,
        player_id: usize,
        team_code: &str,
        price: f64,
    ) -> Result<(), PoolError> {
        check_amount("price", price)?;
        let player = self.get_mut(player_id)?;
        player.league_team = team_code.to_string();
        player.bid = price;
        player.status = OwnershipStatus::Start;
        debug!("assigned {} to {} for {:.2}", player.name, team_code, price);
        Ok(())
    }

    /// Return a player to the open pool as an uninitialized UFA.
    pub fn remove(&mut self, player_id: usize) -> Result<(), PoolError> {
        let player = self.get_mut(player_id)?;
        debug!("removed {} from {}", player.name, player.league_team);
        player.league_team = TEAM_UFA.to_string();
        player.status = OwnershipStatus::No;
        player.bid = 0.0;
        Ok(())
    }

    pub fn update_status(
        &mut self,
        player_id: usize,
        status: OwnershipStatus,
    ) -> Result<(), PoolError> {
        self.get_mut(player_id)?.status = status;
        Ok(())
    }

    pub fn update_salary(&mut self, player_id: usize, salary: f64) -> Result<(), PoolError> {
        check_amount("salary", salary)?;
        self.get_mut(player_id)?.salary = salary;
        Ok(())
    }

    pub fn update_bid(&mut self, player_id: usize, bid: f64) -> Result<(), PoolError> {
        check_amount("bid", bid)?;
        self.get_mut(player_id)?.bid = bid;
        Ok(())
    }

    /// Undo auction activity: every AUCTION player goes back to the open pool
    /// and every open-pool player has its bid cleared. Returns how many
    /// AUCTION players were reverted.
    pub fn reset_to_baseline(&mut self) -> usize {
        let mut reverted = 0;
        for player in self.players_mut() {
            if player.status == OwnershipStatus::Auction {
                player.league_team = TEAM_UFA.to_string();
                player.status = OwnershipStatus::No;
                player.bid = 0.0;
                reverted += 1;
            }
            if player.is_unowned() {
                player.bid = 0.0;
            }
        }
        debug!("reset to baseline: {} auction players reverted", reverted);
        reverted
    }
}
