// Player CSV ingestion.
//
// Reads the league's player sheet (PLAYER, POS, NHL TEAM, FCHL TEAM, STATUS,
// GROUP, AGE, SALARY, BID, PTS) into validated `PlayerRecord`s. Rows that
// cannot be represented in the pool are skipped with a warning.

use std::io::Read;
use std::path::Path;

use rinkcap_core::pool::{OwnershipStatus, PlayerRecord, Position};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

/// One sheet row as written. Numeric cells may be blank; extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawPlayerRow {
    #[serde(rename = "PLAYER")]
    player: String,
    #[serde(rename = "POS")]
    pos: String,
    #[serde(rename = "NHL TEAM", default)]
    nhl_team: String,
    #[serde(rename = "FCHL TEAM")]
    league_team: String,
    #[serde(rename = "STATUS", default)]
    status: String,
    #[serde(rename = "GROUP", default)]
    group: String,
    #[serde(rename = "AGE", default)]
    age: Option<f64>,
    #[serde(rename = "SALARY", default)]
    salary: Option<f64>,
    #[serde(rename = "BID", default)]
    bid: Option<f64>,
    #[serde(rename = "PTS", default)]
    points: Option<f64>,
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    match value {
        None => Some(0.0),
        Some(v) if v.is_finite() && v >= 0.0 => Some(v),
        Some(_) => None,
    }
}

impl RawPlayerRow {
    /// Validate one row. `Err` carries the reason it was skipped.
    fn into_record(self) -> Result<PlayerRecord, String> {
        let name = self.player.trim().to_string();
        if name.is_empty() {
            return Err("empty PLAYER".into());
        }
        let position = Position::from_code(&self.pos)
            .ok_or_else(|| format!("unknown POS '{}'", self.pos.trim()))?;
        let status = OwnershipStatus::from_code(&self.status)
            .ok_or_else(|| format!("unknown STATUS '{}'", self.status.trim()))?;
        let league_team = self.league_team.trim().to_uppercase();
        if league_team.is_empty() {
            return Err("empty FCHL TEAM".into());
        }
        let salary = non_negative(self.salary).ok_or("negative or non-finite SALARY")?;
        let bid = non_negative(self.bid).ok_or("negative or non-finite BID")?;
        let points = non_negative(self.points).ok_or("negative or non-finite PTS")?;
        let age = non_negative(self.age).ok_or("negative or non-finite AGE")?;

        Ok(PlayerRecord {
            name,
            position,
            nhl_team: self.nhl_team.trim().to_string(),
            league_team,
            status,
            age: age.round() as u32,
            group: self.group.trim().to_string(),
            salary,
            bid,
            points: points.round() as u32,
        })
    }
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<PlayerRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawPlayerRow>() {
        match result {
            Ok(raw) => {
                let label = raw.player.trim().to_string();
                match raw.into_record() {
                    Ok(record) => players.push(record),
                    Err(reason) => warn!("skipping player '{}': {}", label, reason),
                }
            }
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
            }
        }
    }
    Ok(players)
}

/// Load every valid player row from the CSV at `path`.
pub fn load_players(path: &Path) -> Result<Vec<PlayerRecord>, ImportError> {
    let file = std::fs::File::open(path).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let players = load_players_from_reader(file).map_err(|e| ImportError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    info!("loaded {} players from {}", players.len(), path.display());
    Ok(players)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "PLAYER,POS,NHL TEAM,FCHL TEAM,STATUS,GROUP,AGE,SALARY,BID,PTS";

    fn load(rows: &[&str]) -> Vec<PlayerRecord> {
        let csv_data = format!("{HEADER}\n{}\n", rows.join("\n"));
        load_players_from_reader(csv_data.as_bytes()).unwrap()
    }

    #[test]
    fn parses_full_row() {
        let players = load(&["Connor McDavid,F,EDM,BOT,START,A,27,12.5,0,132"]);
        assert_eq!(players.len(), 1);
        let p = &players[0];
        assert_eq!(p.name, "Connor McDavid");
        assert_eq!(p.position, Position::Forward);
        assert_eq!(p.nhl_team, "EDM");
        assert_eq!(p.league_team, "BOT");
        assert_eq!(p.status, OwnershipStatus::Start);
        assert_eq!(p.group, "A");
        assert_eq!(p.age, 27);
        assert_eq!(p.salary, 12.5);
        assert_eq!(p.points, 132);
    }

    #[test]
    fn blank_cells_default() {
        let players = load(&["Rookie Goalie,G,SEA,ENT,,,,,,"]);
        assert_eq!(players.len(), 1);
        let p = &players[0];
        assert_eq!(p.status, OwnershipStatus::No);
        assert_eq!(p.group, "");
        assert_eq!(p.salary, 0.0);
        assert_eq!(p.bid, 0.0);
        assert_eq!(p.points, 0);
    }

    #[test]
    fn numeric_group_stays_text() {
        let players = load(&["Prospect,D,MIN,HRB,MINOR,2,20,0.75,0,12"]);
        assert_eq!(players[0].group, "2");
        assert_eq!(players[0].status, OwnershipStatus::Minor);
    }

    #[test]
    fn invalid_rows_are_skipped() {
        let players = load(&[
            "Keeper,F,TOR,GVR,START,A,30,5,0,80",
            "Winger,LW,TOR,UFA,,A,30,0,0,40",
            "Ghost,F,TOR,UFA,MAYBE,A,30,0,0,40",
            "Debt,D,TOR,KNG,START,A,30,-1,0,40",
            "Typo,D,TOR,KNG,START,A,thirty,1,0,40",
            ",G,TOR,UFA,,A,30,0,0,40",
        ]);
        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Keeper"]);
    }

    #[test]
    fn extra_columns_and_case_are_tolerated() {
        let csv_data = "\
PLAYER,POS,NHL TEAM,FCHL TEAM,STATUS,GROUP,AGE,SALARY,BID,PTS,NOTES
Depth Guy,f,NSH,ufa,no,B,29,0,0,21.6,waiver pickup
";
        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].position, Position::Forward);
        assert_eq!(players[0].league_team, "UFA");
        assert_eq!(players[0].points, 22);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_players(Path::new("/nonexistent/rinkcap/players.csv")).unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }
}
