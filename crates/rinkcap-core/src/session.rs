// Auction session: one league configuration, one player pool, and the
// ordered log of every edit made to it.
//
// The session is the single writer of its pool. Every mutation goes through
// here so it can be validated against the league and recorded.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::{Config, LeagueConfig};
use crate::optimizer::{self, OptimizeError, RosterOutcome};
use crate::pool::budget::{self, TeamBudget, TeamComposition};
use crate::pool::{OwnershipStatus, Player, PlayerFilter, PlayerPool, PoolError};
use crate::valuation::{self, MarketSummary};

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Assign,
    Remove,
    Status,
    Salary,
    Bid,
    Reset,
}

/// One recorded edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuctionAction {
    pub kind: ActionKind,
    /// `None` for pool-wide actions (reset).
    pub player_id: Option<usize>,
    pub player_name: Option<String>,
    pub from_team: Option<String>,
    pub to_team: Option<String>,
    /// Price, salary, or bid written by the action.
    pub amount: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl AuctionAction {
    fn for_player(kind: ActionKind, player: &Player) -> Self {
        AuctionAction {
            kind,
            player_id: Some(player.id),
            player_name: Some(player.name.clone()),
            from_team: Some(player.league_team.clone()),
            to_team: None,
            amount: None,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct AuctionSession {
    config: Config,
    pool: PlayerPool,
    history: Vec<AuctionAction>,
    last_summary: Option<MarketSummary>,
}

impl AuctionSession {
    pub fn new(config: Config, pool: PlayerPool) -> Self {
        info!(
            "auction session for {}: {} players, {} teams",
            config.league.name,
            pool.len(),
            config.league.teams.len()
        );
        AuctionSession {
            config,
            pool,
            history: Vec::new(),
            last_summary: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn league(&self) -> &LeagueConfig {
        &self.config.league
    }

    pub fn pool(&self) -> &PlayerPool {
        &self.pool
    }

    /// Edits in the order they were applied.
    pub fn history(&self) -> &[AuctionAction] {
        &self.history
    }

    /// Summary of the most recent successful recompute.
    pub fn last_summary(&self) -> Option<&MarketSummary> {
        self.last_summary.as_ref()
    }

    // -- Pipeline ----------------------------------------------------------

    /// Revalue and reprice the pool. See `valuation::recompute`.
    pub fn recompute(&mut self) -> Option<MarketSummary> {
        let summary = valuation::recompute(&mut self.pool, &self.config.league);
        if summary.is_some() {
            self.last_summary = summary;
        }
        summary
    }

    /// Propose the managed team's best roster from the current pool.
    pub fn optimize(&self) -> Result<RosterOutcome, OptimizeError> {
        optimizer::optimize_roster(&self.pool, &self.config)
    }

    // -- Views -------------------------------------------------------------

    pub fn team_budgets(&self) -> Vec<TeamBudget> {
        budget::team_budgets(&self.pool, &self.config.league)
    }

    pub fn team_budget(&self, team_code: &str) -> Result<TeamBudget, PoolError> {
        let team = self
            .config
            .league
            .team(team_code)
            .ok_or_else(|| PoolError::UnknownTeam(team_code.to_string()))?;
        Ok(budget::team_budget(&self.pool, team, &self.config.league))
    }

    pub fn team_composition(&self, team_code: &str) -> TeamComposition {
        budget::team_composition(&self.pool, team_code)
    }

    pub fn team_roster(&self, team_code: &str) -> Vec<&Player> {
        self.pool.team_roster(team_code)
    }

    pub fn available_players(&self) -> Vec<&Player> {
        self.pool.available_players()
    }

    pub fn filter(&self, filter: &PlayerFilter) -> Vec<&Player> {
        self.pool.filter(filter)
    }

    // -- Mutations ---------------------------------------------------------

    /// Assign without validating the team or its budget.
    pub fn assign(
        &mut self,
        player_id: usize,
        team_code: &str,
        price: f64,
    ) -> Result<(), PoolError> {
        let mut action = self.action_for(ActionKind::Assign, player_id)?;
        self.pool.assign(player_id, team_code, price)?;
        action.to_team = Some(team_code.to_string());
        action.amount = Some(price);
        self.record(action);
        Ok(())
    }

    /// Assign after checking that `team_code` is a configured team and
    /// that it can absorb the player's cost within the cap.
    pub fn assign_checked(
        &mut self,
        player_id: usize,
        team_code: &str,
        price: f64,
    ) -> Result<(), PoolError> {
        let budget = self.team_budget(team_code)?;
        let player = self
            .pool
            .get(player_id)
            .ok_or(PoolError::UnknownPlayer(player_id))?;

        // Once assigned the player is START, so its salary counts too. A
        // player already on the team is repriced, not added twice.
        let mut added_cost = price + player.salary;
        if player.league_team == team_code {
            added_cost -= player.bid;
            if player.salary_is_committed(&self.config.league.minor_cap_groups) {
                added_cost -= player.salary;
            }
        }
        if added_cost > budget.remaining + 1e-9 {
            return Err(PoolError::InsufficientBudget {
                team: team_code.to_string(),
                price,
                remaining: budget.remaining,
            });
        }
        self.assign(player_id, team_code, price)
    }

    pub fn remove(&mut self, player_id: usize) -> Result<(), PoolError> {
        let mut action = self.action_for(ActionKind::Remove, player_id)?;
        self.pool.remove(player_id)?;
        action.to_team = self.pool.get(player_id).map(|p| p.league_team.clone());
        self.record(action);
        Ok(())
    }

    pub fn update_status(
        &mut self,
        player_id: usize,
        status: OwnershipStatus,
    ) -> Result<(), PoolError> {
        let action = self.action_for(ActionKind::Status, player_id)?;
        self.pool.update_status(player_id, status)?;
        self.record(action);
        Ok(())
    }

    pub fn update_salary(&mut self, player_id: usize, salary: f64) -> Result<(), PoolError> {
        let mut action = self.action_for(ActionKind::Salary, player_id)?;
        self.pool.update_salary(player_id, salary)?;
        action.amount = Some(salary);
        self.record(action);
        Ok(())
    }

    pub fn update_bid(&mut self, player_id: usize, bid: f64) -> Result<(), PoolError> {
        let mut action = self.action_for(ActionKind::Bid, player_id)?;
        self.pool.update_bid(player_id, bid)?;
        action.amount = Some(bid);
        self.record(action);
        Ok(())
    }

    /// Undo auction activity. Returns the number of AUCTION players reverted.
    pub fn reset_to_baseline(&mut self) -> usize {
        let reverted = self.pool.reset_to_baseline();
        self.record(AuctionAction {
            kind: ActionKind::Reset,
            player_id: None,
            player_name: None,
            from_team: None,
            to_team: None,
            amount: None,
            timestamp: Utc::now(),
        });
        reverted
    }

    fn action_for(&self, kind: ActionKind, player_id: usize) -> Result<AuctionAction, PoolError> {
        self.pool
            .get(player_id)
            .map(|p| AuctionAction::for_player(kind, p))
            .ok_or(PoolError::UnknownPlayer(player_id))
    }

    fn record(&mut self, action: AuctionAction) {
        info!(
            "{:?}: {} {} -> {} {}",
            action.kind,
            action.player_name.as_deref().unwrap_or("*"),
            action.from_team.as_deref().unwrap_or("-"),
            action.to_team.as_deref().unwrap_or("-"),
            action.amount.map(|a| format!("{a:.2}")).unwrap_or_default()
        );
        self.history.push(action);
    }
}
