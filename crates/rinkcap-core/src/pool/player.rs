// Player row representation: positions, ownership statuses, and the raw
// record shape accepted by bulk load.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Pseudo-team codes
// ---------------------------------------------------------------------------

pub const TEAM_UFA: &str = "UFA";
pub const TEAM_RFA: &str = "RFA";
pub const TEAM_ENT: &str = "ENT";

/// League-team codes meaning "in the open pool, not yet owned".
pub const OPEN_POOL_TEAMS: [&str; 3] = [TEAM_UFA, TEAM_RFA, TEAM_ENT];

/// Whether a league-team code is one of the open-pool pseudo-teams.
pub fn is_open_pool(team_code: &str) -> bool {
    OPEN_POOL_TEAMS.contains(&team_code)
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Hockey positions tracked by the league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "F")]
    Forward,
    #[serde(rename = "D")]
    Defence,
    #[serde(rename = "G")]
    Goalie,
}

impl Position {
    /// All positions in roster display order.
    pub const ALL: [Position; 3] = [Position::Forward, Position::Defence, Position::Goalie];

    /// Parse a position code ("F", "D", "G"). Returns `None` for anything else.
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "F" => Some(Position::Forward),
            "D" => Some(Position::Defence),
            "G" => Some(Position::Goalie),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Position::Forward => "F",
            Position::Defence => "D",
            Position::Goalie => "G",
        }
    }

    /// Deterministic ordering index for roster display (F, D, G).
    pub fn sort_order(&self) -> u8 {
        match self {
            Position::Forward => 0,
            Position::Defence => 1,
            Position::Goalie => 2,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// Ownership status
// ---------------------------------------------------------------------------

/// Contract/ownership status of a player. `No` is the uninitialized default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OwnershipStatus {
    Start,
    Minor,
    Auction,
    Ufa,
    Rfa,
    Ent,
    #[default]
    No,
}

impl OwnershipStatus {
    /// Parse a status code. Blank input maps to `No`, matching how the league
    /// sheet leaves unassigned rows empty.
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "START" => Some(OwnershipStatus::Start),
            "MINOR" => Some(OwnershipStatus::Minor),
            "AUCTION" => Some(OwnershipStatus::Auction),
            "UFA" => Some(OwnershipStatus::Ufa),
            "RFA" => Some(OwnershipStatus::Rfa),
            "ENT" => Some(OwnershipStatus::Ent),
            "NO" | "" => Some(OwnershipStatus::No),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            OwnershipStatus::Start => "START",
            OwnershipStatus::Minor => "MINOR",
            OwnershipStatus::Auction => "AUCTION",
            OwnershipStatus::Ufa => "UFA",
            OwnershipStatus::Rfa => "RFA",
            OwnershipStatus::Ent => "ENT",
            OwnershipStatus::No => "NO",
        }
    }
}

impl fmt::Display for OwnershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Externally validated input row for bulk load. Carries every persisted
/// field of a player except the derived ones (`id`, `z_score`, `draftable`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub position: Position,
    pub nhl_team: String,
    pub league_team: String,
    pub status: OwnershipStatus,
    pub age: u32,
    pub group: String,
    pub salary: f64,
    pub bid: f64,
    pub points: u32,
}

/// One row of the player pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Stable index into the pool.
    pub id: usize,
    pub name: String,
    pub position: Position,
    pub nhl_team: String,
    pub status: OwnershipStatus,
    /// Owning team code, or one of `OPEN_POOL_TEAMS`.
    pub league_team: String,
    pub age: u32,
    pub group: String,
    pub salary: f64,
    pub bid: f64,
    pub points: u32,
    /// Shifted z-score; `Some` only while `draftable`.
    pub z_score: Option<f64>,
    pub draftable: bool,
}

impl Player {
    pub fn from_record(id: usize, record: PlayerRecord) -> Self {
        Player {
            id,
            name: record.name,
            position: record.position,
            nhl_team: record.nhl_team,
            status: record.status,
            league_team: record.league_team,
            age: record.age,
            group: record.group,
            salary: record.salary,
            bid: record.bid,
            points: record.points,
            z_score: None,
            draftable: false,
        }
    }

    /// Whether the player sits in the open pool (UFA/RFA/ENT).
    pub fn is_unowned(&self) -> bool {
        is_open_pool(&self.league_team)
    }

    /// Cost of carrying this player on a roster: contract plus acquisition price.
    pub fn total_cost(&self) -> f64 {
        self.salary + self.bid
    }

    /// Whether the salary counts against the cap. START always does; MINOR
    /// only when the player's group is one of `minor_cap_groups`.
    pub fn salary_is_committed(&self, minor_cap_groups: &[String]) -> bool {
        match self.status {
            OwnershipStatus::Start => true,
            OwnershipStatus::Minor => minor_cap_groups.iter().any(|g| g == &self.group),
            _ => false,
        }
    }
}
