// The player pool: the authoritative in-memory table of league players.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::player::{OwnershipStatus, Player, PlayerRecord, Position};

#[derive(Debug, Error, PartialEq)]
pub enum PoolError {
    #[error("unknown player id {0}")]
    UnknownPlayer(usize),

    #[error("unknown team code `{0}`")]
    UnknownTeam(String),

    #[error("{team} cannot afford {price:.2}: only {remaining:.2} remaining")]
    InsufficientBudget {
        team: String,
        price: f64,
        remaining: f64,
    },

    #[error("invalid amount {value} for {field}: must be finite and >= 0")]
    InvalidAmount { field: &'static str, value: f64 },
}

/// Owns every player row for one session.
///
/// `revision` increases on every write so derived artifacts (optimization
/// models) can detect that they were built against an older snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerPool {
    players: Vec<Player>,
    #[serde(default)]
    revision: u64,
}

impl PlayerPool {
    /// Build a pool from externally validated rows. Ids are assigned in row order.
    pub fn from_records(records: impl IntoIterator<Item = PlayerRecord>) -> Self {
        let players = records
            .into_iter()
            .enumerate()
            .map(|(id, record)| Player::from_record(id, record))
            .collect();
        PlayerPool {
            players,
            revision: 0,
        }
    }

    /// Restore a pool from a JSON snapshot produced by `to_json`.
    ///
    /// Rows are addressed by index, so every row's id must equal its position.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let pool: PlayerPool = serde_json::from_str(json)?;
        if let Some((index, player)) = pool
            .players
            .iter()
            .enumerate()
            .find(|(index, player)| player.id != *index)
        {
            return Err(serde::de::Error::custom(format!(
                "snapshot row {index} carries player id {}",
                player.id
            )));
        }
        Ok(pool)
    }

    /// Serialize the full field set for an external persistence layer.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn get(&self, id: usize) -> Option<&Player> {
        self.players.get(id)
    }

    /// Mutable access to one row; bumps the revision.
    pub(crate) fn get_mut(&mut self, id: usize) -> Result<&mut Player, PoolError> {
        let player = self
            .players
            .get_mut(id)
            .ok_or(PoolError::UnknownPlayer(id))?;
        self.revision += 1;
        Ok(player)
    }

    /// Mutable access to every row; bumps the revision.
    pub(crate) fn players_mut(&mut self) -> &mut [Player] {
        self.revision += 1;
        &mut self.players
    }

    /// Players owned by `team_code`, sorted by position then points descending.
    pub fn team_roster(&self, team_code: &str) -> Vec<&Player> {
        let mut roster: Vec<&Player> = self
            .players
            .iter()
            .filter(|p| p.league_team == team_code)
            .collect();
        sort_for_display(&mut roster);
        roster
    }

    /// Unowned draftable players with a positive bid, sorted for display.
    pub fn available_players(&self) -> Vec<&Player> {
        let mut available: Vec<&Player> = self
            .players
            .iter()
            .filter(|p| p.is_unowned() && p.draftable && p.bid > 0.0)
            .collect();
        sort_for_display(&mut available);
        available
    }

    /// Players matching every criterion set on `filter`, in pool order.
    pub fn filter(&self, filter: &PlayerFilter) -> Vec<&Player> {
        self.players.iter().filter(|p| filter.matches(p)).collect()
    }
}

/// Position order (F, D, G), then points descending. Stable, so equal rows
/// keep pool order.
fn sort_for_display(players: &mut [&Player]) {
    players.sort_by(|a, b| {
        a.position
            .sort_order()
            .cmp(&b.position.sort_order())
            .then_with(|| b.points.cmp(&a.points))
    });
}

/// Optional criteria for browsing the pool. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    pub position: Option<Position>,
    pub status: Option<OwnershipStatus>,
    pub league_team: Option<String>,
}

impl PlayerFilter {
    pub fn matches(&self, player: &Player) -> bool {
        self.position.map_or(true, |pos| player.position == pos)
            && self.status.map_or(true, |status| player.status == status)
            && self
                .league_team
                .as_deref()
                .map_or(true, |team| player.league_team == team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, position: Position, team: &str, points: u32) -> PlayerRecord {
        PlayerRecord {
            name: name.into(),
            position,
            nhl_team: "EDM".into(),
            league_team: team.into(),
            status: if team == "UFA" {
                OwnershipStatus::No
            } else {
                OwnershipStatus::Start
            },
            age: 27,
            group: "A".into(),
            salary: 0.0,
            bid: 1.0,
            points,
        }
    }

    fn sample_pool() -> PlayerPool {
        PlayerPool::from_records(vec![
            record("Goalie A", Position::Goalie, "BOT", 40),
            record("Forward A", Position::Forward, "BOT", 50),
            record("Defence A", Position::Defence, "BOT", 30),
            record("Forward B", Position::Forward, "BOT", 80),
            record("Forward C", Position::Forward, "UFA", 70),
        ])
    }

    #[test]
    fn ids_follow_row_order() {
        let pool = sample_pool();
        assert_eq!(pool.len(), 5);
        for (i, p) in pool.players().iter().enumerate() {
            assert_eq!(p.id, i);
        }
        assert!(pool.get(5).is_none());
    }

    #[test]
    fn team_roster_sorted_by_position_then_points() {
        let pool = sample_pool();
        let names: Vec<&str> = pool.team_roster("BOT").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Forward B", "Forward A", "Defence A", "Goalie A"]);
        assert!(pool.team_roster("XXX").is_empty());
    }

    #[test]
    fn available_requires_draftable_and_positive_bid() {
        let mut pool = sample_pool();
        assert!(pool.available_players().is_empty());
        pool.players_mut()[4].draftable = true;
        let available = pool.available_players();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name, "Forward C");
        pool.players_mut()[4].bid = 0.0;
        assert!(pool.available_players().is_empty());
    }

    #[test]
    fn filter_combines_criteria() {
        let pool = sample_pool();
        let forwards = pool.filter(&PlayerFilter {
            position: Some(Position::Forward),
            ..Default::default()
        });
        assert_eq!(forwards.len(), 3);

        let owned_forwards = pool.filter(&PlayerFilter {
            position: Some(Position::Forward),
            league_team: Some("BOT".into()),
            ..Default::default()
        });
        assert_eq!(owned_forwards.len(), 2);

        let open = pool.filter(&PlayerFilter {
            status: Some(OwnershipStatus::No),
            ..Default::default()
        });
        assert_eq!(open.len(), 1);
        assert_eq!(pool.filter(&PlayerFilter::default()).len(), 5);
    }

    #[test]
    fn writes_bump_revision() {
        let mut pool = sample_pool();
        assert_eq!(pool.revision(), 0);
        pool.get_mut(1).unwrap().bid = 2.0;
        assert_eq!(pool.revision(), 1);
        assert_eq!(pool.get_mut(99).unwrap_err(), PoolError::UnknownPlayer(99));
        assert_eq!(pool.revision(), 1);
    }

    #[test]
    fn json_snapshot_round_trips_field_set() {
        let mut pool = sample_pool();
        pool.players_mut()[4].z_score = Some(1.25);
        let json = pool.to_json().unwrap();
        let restored = PlayerPool::from_json(&json).unwrap();
        assert_eq!(restored.players(), pool.players());
        assert_eq!(restored.revision(), pool.revision());
    }

    #[test]
    fn json_snapshot_with_reordered_rows_is_rejected() {
        let pool = sample_pool();
        let mut value: serde_json::Value = serde_json::from_str(&pool.to_json().unwrap()).unwrap();
        value["players"].as_array_mut().unwrap().swap(0, 1);

        let err = PlayerPool::from_json(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("row 0 carries player id 1"), "{err}");
    }
}
