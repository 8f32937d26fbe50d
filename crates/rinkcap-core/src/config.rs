// Configuration loading and parsing (league.toml).

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::pool::player::{is_open_pool, Position};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub optimizer: OptimizerConfig,
    pub data_paths: DataPaths,
}

/// Raw deserialization target for the whole league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    league: LeagueConfig,
    #[serde(default)]
    optimizer: OptimizerConfig,
    data: DataPaths,
}

// ---------------------------------------------------------------------------
// [league]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub num_teams: usize,
    /// Per-team cap, in league dollars.
    pub salary_cap: f64,
    /// Floor price every draftable player is guaranteed.
    pub min_player_price: f64,
    /// Code of the team whose roster the optimizer builds.
    pub managed_team: String,
    /// MINOR-player groups whose salary still counts against the cap.
    #[serde(default = "default_minor_cap_groups")]
    pub minor_cap_groups: Vec<String>,
    pub quotas: RosterQuotas,
    pub teams: Vec<TeamConfig>,
}

fn default_minor_cap_groups() -> Vec<String> {
    vec!["2".into(), "3".into()]
}

/// Exact number of players per position on a legal roster.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RosterQuotas {
    pub forwards: usize,
    pub defence: usize,
    pub goalies: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamConfig {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub penalty: f64,
}

impl LeagueConfig {
    pub fn quota(&self, position: Position) -> usize {
        match position {
            Position::Forward => self.quotas.forwards,
            Position::Defence => self.quotas.defence,
            Position::Goalie => self.quotas.goalies,
        }
    }

    /// Number of starter-caliber players league-wide at a position.
    pub fn baseline(&self, position: Position) -> usize {
        self.quota(position) * self.num_teams
    }

    /// Total dollars across every team's cap.
    pub fn total_pool(&self) -> f64 {
        self.salary_cap * self.num_teams as f64
    }

    pub fn total_penalties(&self) -> f64 {
        self.teams.iter().map(|t| t.penalty).sum()
    }

    pub fn team(&self, code: &str) -> Option<&TeamConfig> {
        self.teams.iter().find(|t| t.code == code)
    }
}

// ---------------------------------------------------------------------------
// [optimizer] and [data]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizerConfig {
    /// Advisory wall-clock limit for one solve. `None` waits indefinitely.
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: Option<u64>,
}

fn default_time_limit_secs() -> Option<u64> {
    Some(30)
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            time_limit_secs: default_time_limit_secs(),
        }
    }
}

impl OptimizerConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub players: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` relative to the
/// given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let league_path = base_dir.join("config").join("league.toml");
    let text = read_file(&league_path)?;
    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: league_path.clone(),
        source: e,
    })?;

    let config = Config {
        league: file.league,
        optimizer: file.optimizer,
        data_paths: file.data,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);

        // Existing files in config/ are left alone.
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

/// Check the league invariants the engine relies on.
pub fn validate_league(league: &LeagueConfig) -> Result<(), ConfigError> {
    if league.num_teams == 0 {
        return Err(invalid("league.num_teams", "must be greater than 0"));
    }
    if !(league.salary_cap.is_finite() && league.salary_cap > 0.0) {
        return Err(invalid(
            "league.salary_cap",
            format!("must be greater than 0, got {}", league.salary_cap),
        ));
    }
    if !(league.min_player_price.is_finite() && league.min_player_price >= 0.0) {
        return Err(invalid(
            "league.min_player_price",
            format!("must be >= 0, got {}", league.min_player_price),
        ));
    }

    let quota_fields: &[(&str, usize)] = &[
        ("league.quotas.forwards", league.quotas.forwards),
        ("league.quotas.defence", league.quotas.defence),
        ("league.quotas.goalies", league.quotas.goalies),
    ];
    for (name, val) in quota_fields {
        if *val == 0 {
            return Err(invalid(name, "must be > 0"));
        }
    }

    if league.teams.len() != league.num_teams {
        return Err(invalid(
            "league.teams",
            format!(
                "expected {} teams to match num_teams, got {}",
                league.num_teams,
                league.teams.len()
            ),
        ));
    }

    let mut seen = HashSet::new();
    for team in &league.teams {
        if team.code.trim().is_empty() {
            return Err(invalid("league.teams.code", "must not be empty"));
        }
        if is_open_pool(&team.code) {
            return Err(invalid(
                "league.teams.code",
                format!("`{}` is reserved for the open player pool", team.code),
            ));
        }
        if !seen.insert(team.code.as_str()) {
            return Err(invalid(
                "league.teams.code",
                format!("duplicate team code `{}`", team.code),
            ));
        }
        if !(team.penalty.is_finite() && team.penalty >= 0.0) {
            return Err(invalid(
                "league.teams.penalty",
                format!("team `{}` penalty must be >= 0, got {}", team.code, team.penalty),
            ));
        }
    }

    if league.team(&league.managed_team).is_none() {
        return Err(invalid(
            "league.managed_team",
            format!("`{}` is not a configured team", league.managed_team),
        ));
    }

    Ok(())
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_league(&config.league)?;

    if config.optimizer.time_limit_secs == Some(0) {
        return Err(invalid("optimizer.time_limit_secs", "must be > 0 when set"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Locate the repository root holding `defaults/league.toml`.
    fn project_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .ancestors()
            .find(|dir| dir.join("defaults/league.toml").exists())
            .map(Path::to_path_buf)
            .expect("cannot locate defaults/league.toml above the crate")
    }

    fn default_league_text() -> String {
        fs::read_to_string(project_root().join("defaults/league.toml")).unwrap()
    }

    /// Fresh temp dir with `config/league.toml` holding `text`.
    fn temp_config(name: &str, text: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config/league.toml"), text).unwrap();
        tmp
    }

    fn expect_validation_field(tmp: &Path, expected: &str) {
        let err = load_config_from(tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_default_league_file() {
        let tmp = temp_config("rinkcap_config_defaults", &default_league_text());
        let config = load_config_from(&tmp).expect("should load valid config");

        assert_eq!(config.league.num_teams, 11);
        assert!((config.league.salary_cap - 56.8).abs() < f64::EPSILON);
        assert!((config.league.min_player_price - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.league.managed_team, "BOT");
        assert_eq!(config.league.minor_cap_groups, vec!["2", "3"]);
        assert_eq!(config.league.baseline(Position::Forward), 154);
        assert_eq!(config.league.baseline(Position::Defence), 77);
        assert_eq!(config.league.baseline(Position::Goalie), 33);
        assert_eq!(config.league.teams.len(), 11);
        assert!((config.league.total_penalties() - 5.0).abs() < 1e-9);
        assert_eq!(config.optimizer.time_limit(), Some(Duration::from_secs(30)));
        assert_eq!(config.data_paths.players, "data/players.csv");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn minor_cap_groups_default_when_omitted() {
        let text = default_league_text().replace("minor_cap_groups = [\"2\", \"3\"]", "");
        let tmp = temp_config("rinkcap_config_minor_default", &text);
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.league.minor_cap_groups, vec!["2", "3"]);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_num_teams_mismatch() {
        let text = default_league_text().replace("num_teams = 11", "num_teams = 10");
        let tmp = temp_config("rinkcap_config_team_mismatch", &text);
        expect_validation_field(&tmp, "league.teams");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_salary_cap_zero() {
        let text = default_league_text().replace("salary_cap = 56.8", "salary_cap = 0.0");
        let tmp = temp_config("rinkcap_config_cap_zero", &text);
        expect_validation_field(&tmp, "league.salary_cap");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_quota() {
        let text = default_league_text().replace("goalies = 3", "goalies = 0");
        let tmp = temp_config("rinkcap_config_zero_quota", &text);
        expect_validation_field(&tmp, "league.quotas.goalies");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_unknown_managed_team() {
        let text =
            default_league_text().replace("managed_team = \"BOT\"", "managed_team = \"XXX\"");
        let tmp = temp_config("rinkcap_config_managed", &text);
        expect_validation_field(&tmp, "league.managed_team");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_pseudo_team_code() {
        let text = default_league_text().replace("code = \"WDL\"", "code = \"UFA\"");
        let tmp = temp_config("rinkcap_config_pseudo_code", &text);
        expect_validation_field(&tmp, "league.teams.code");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_negative_penalty() {
        let text = default_league_text().replace("penalty = 2.0", "penalty = -2.0");
        let tmp = temp_config("rinkcap_config_negative_penalty", &text);
        expect_validation_field(&tmp, "league.teams.penalty");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_league_toml() {
        let tmp = std::env::temp_dir().join("rinkcap_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("league.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = temp_config("rinkcap_config_invalid_toml", "this is not valid [[[ toml");
        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("league.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_files() {
        let tmp = std::env::temp_dir().join("rinkcap_config_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join("league.toml"), default_league_text()).unwrap();
        fs::write(defaults_dir.join("notes.toml.example"), "# template\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(tmp.join("config/league.toml").exists());
        assert!(!tmp.join("config/notes.toml.example").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_skips_existing() {
        let tmp = temp_config("rinkcap_config_ensure_skips", "# custom\n");
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join("league.toml"), default_league_text()).unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());
        let content = fs::read_to_string(tmp.join("config/league.toml")).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_second_run_keeps_first_copy() {
        let tmp = std::env::temp_dir().join("rinkcap_config_ensure_twice");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join("league.toml"), default_league_text()).unwrap();

        assert_eq!(ensure_config_files(&tmp).unwrap().len(), 1);
        fs::write(tmp.join("config/league.toml"), "# edited\n").unwrap();
        fs::write(defaults_dir.join("league.toml"), "# newer default\n").unwrap();

        assert!(ensure_config_files(&tmp).unwrap().is_empty());
        let content = fs::read_to_string(tmp.join("config/league.toml")).unwrap();
        assert_eq!(content, "# edited\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("rinkcap_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_files(&tmp).unwrap_err();
        match &err {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
