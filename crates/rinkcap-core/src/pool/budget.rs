// Budget accounting: per-team cap projections computed on demand from the pool.

use serde::Serialize;

use crate::config::{LeagueConfig, TeamConfig};

use super::player::{OwnershipStatus, Player, Position};
use super::store::PlayerPool;

/// Cap position of one team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamBudget {
    pub code: String,
    pub name: String,
    /// Contracts that count against the cap (START, plus MINOR in cap groups).
    pub committed_salary: f64,
    /// Sum of bids over every player the team owns.
    pub auction_spending: f64,
    pub penalty: f64,
    pub total_spent: f64,
    /// Cap room left. Negative means the team is over the cap.
    pub remaining: f64,
    pub f_count: usize,
    pub d_count: usize,
    pub g_count: usize,
}

impl TeamBudget {
    pub fn is_over_cap(&self) -> bool {
        self.remaining < 0.0
    }

    pub fn count(&self, position: Position) -> usize {
        match position {
            Position::Forward => self.f_count,
            Position::Defence => self.d_count,
            Position::Goalie => self.g_count,
        }
    }
}

/// Per-position roster counts split by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PositionBreakdown {
    pub total: usize,
    pub start: usize,
    pub minor: usize,
}

/// Position × {total, START, MINOR} breakdown of one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamComposition {
    pub forwards: PositionBreakdown,
    pub defence: PositionBreakdown,
    pub goalies: PositionBreakdown,
}

impl TeamComposition {
    pub fn get(&self, position: Position) -> &PositionBreakdown {
        match position {
            Position::Forward => &self.forwards,
            Position::Defence => &self.defence,
            Position::Goalie => &self.goalies,
        }
    }

    fn get_mut(&mut self, position: Position) -> &mut PositionBreakdown {
        match position {
            Position::Forward => &mut self.forwards,
            Position::Defence => &mut self.defence,
            Position::Goalie => &mut self.goalies,
        }
    }
}

/// Committed salary over an arbitrary set of players.
pub fn committed_salary<'a>(
    players: impl IntoIterator<Item = &'a Player>,
    minor_cap_groups: &[String],
) -> f64 {
    players
        .into_iter()
        .filter(|p| p.salary_is_committed(minor_cap_groups))
        .map(|p| p.salary)
        .sum()
}

/// Budget snapshot for a single configured team.
pub fn team_budget(pool: &PlayerPool, team: &TeamConfig, league: &LeagueConfig) -> TeamBudget {
    let roster: Vec<&Player> = pool
        .players()
        .iter()
        .filter(|p| p.league_team == team.code)
        .collect();

    let committed = committed_salary(roster.iter().copied(), &league.minor_cap_groups);
    let auction_spending: f64 = roster.iter().map(|p| p.bid).sum();
    let total_spent = committed + auction_spending + team.penalty;
    let count = |pos: Position| roster.iter().filter(|p| p.position == pos).count();

    TeamBudget {
        code: team.code.clone(),
        name: team.name.clone(),
        committed_salary: committed,
        auction_spending,
        penalty: team.penalty,
        total_spent,
        remaining: league.salary_cap - total_spent,
        f_count: count(Position::Forward),
        d_count: count(Position::Defence),
        g_count: count(Position::Goalie),
    }
}

/// Budget snapshots for every configured team, in configuration order.
pub fn team_budgets(pool: &PlayerPool, league: &LeagueConfig) -> Vec<TeamBudget> {
    league
        .teams
        .iter()
        .map(|team| team_budget(pool, team, league))
        .collect()
}

pub fn team_composition(pool: &PlayerPool, team_code: &str) -> TeamComposition {
    let mut composition = TeamComposition::default();
    for player in pool.players().iter().filter(|p| p.league_team == team_code) {
        let entry = composition.get_mut(player.position);
        entry.total += 1;
        match player.status {
            OwnershipStatus::Start => entry.start += 1,
            OwnershipStatus::Minor => entry.minor += 1,
            _ => {}
        }
    }
    composition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterQuotas;
    use crate::pool::player::PlayerRecord;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn league() -> LeagueConfig {
        LeagueConfig {
            name: "Budget Test".into(),
            num_teams: 2,
            salary_cap: 20.0,
            min_player_price: 0.5,
            managed_team: "BOT".into(),
            minor_cap_groups: vec!["2".into(), "3".into()],
            quotas: RosterQuotas {
                forwards: 2,
                defence: 1,
                goalies: 1,
            },
            teams: vec![
                TeamConfig {
                    code: "BOT".into(),
                    name: "Bots".into(),
                    penalty: 1.0,
                },
                TeamConfig {
                    code: "GVR".into(),
                    name: "Rangers".into(),
                    penalty: 0.0,
                },
            ],
        }
    }

    fn record(
        position: Position,
        team: &str,
        status: OwnershipStatus,
        group: &str,
        salary: f64,
        bid: f64,
    ) -> PlayerRecord {
        PlayerRecord {
            name: format!("{team}-{position}-{status}"),
            position,
            nhl_team: "VAN".into(),
            league_team: team.into(),
            status,
            age: 22,
            group: group.into(),
            salary,
            bid,
            points: 10,
        }
    }

    fn pool() -> PlayerPool {
        PlayerPool::from_records(vec![
            record(Position::Forward, "BOT", OwnershipStatus::Start, "A", 5.0, 0.0),
            record(Position::Forward, "BOT", OwnershipStatus::Minor, "2", 1.5, 0.0),
            record(Position::Defence, "BOT", OwnershipStatus::Minor, "C", 4.0, 0.0),
            record(Position::Goalie, "BOT", OwnershipStatus::Auction, "A", 0.0, 3.5),
            record(Position::Forward, "GVR", OwnershipStatus::Start, "A", 9.0, 2.0),
            record(Position::Forward, "UFA", OwnershipStatus::No, "A", 0.0, 1.0),
        ])
    }

    #[test]
    fn budget_components() {
        let budget = team_budget(&pool(), &league().teams[0], &league());
        // START 5.0 + MINOR group 2 1.5; MINOR group C excluded.
        assert!(approx_eq(budget.committed_salary, 6.5, 1e-9));
        assert!(approx_eq(budget.auction_spending, 3.5, 1e-9));
        assert!(approx_eq(budget.total_spent, 11.0, 1e-9));
        assert!(approx_eq(budget.remaining, 9.0, 1e-9));
        assert_eq!((budget.f_count, budget.d_count, budget.g_count), (2, 1, 1));
        assert!(!budget.is_over_cap());
    }

    #[test]
    fn over_cap_is_reported_not_raised() {
        let mut pool = pool();
        pool.update_bid(4, 15.0).unwrap();
        let budgets = team_budgets(&pool, &league());
        assert_eq!(budgets.len(), 2);
        let gvr = &budgets[1];
        assert!(approx_eq(gvr.remaining, 20.0 - 24.0, 1e-9));
        assert!(gvr.is_over_cap());
        assert_eq!(gvr.count(Position::Forward), 1);
    }

    #[test]
    fn composition_splits_start_and_minor() {
        let composition = team_composition(&pool(), "BOT");
        assert_eq!(
            *composition.get(Position::Forward),
            PositionBreakdown {
                total: 2,
                start: 1,
                minor: 1
            }
        );
        assert_eq!(composition.defence.minor, 1);
        assert_eq!(composition.goalies.total, 1);
        assert_eq!(composition.goalies.start, 0);
        assert_eq!(team_composition(&pool(), "NONE"), TeamComposition::default());
    }
}
