// CSV import of players, college seasons, team schedule strength, and
// professional seasons.
//
// Empty cells are treated as missing values. Rows that fail to parse are
// skipped with a warning rather than aborting the import.

use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::model::{PlayerProfile, SeasonRecord, TeamYear};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Locations of the CSV exports to import. Only the players file is required.
#[derive(Debug, Clone, Default)]
pub struct ImportPaths {
    pub players: PathBuf,
    pub seasons: Option<PathBuf>,
    pub team_years: Option<PathBuf>,
    pub pro_seasons: Option<PathBuf>,
}

/// Parsed rows ready to be written to the store.
#[derive(Debug, Clone, Default)]
pub struct ImportBundle {
    pub players: Vec<PlayerProfile>,
    pub seasons: Vec<SeasonRecord>,
    pub team_years: Vec<TeamYear>,
    pub pro_seasons: Vec<(String, u16)>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPlayer {
    player_id: String,
    #[serde(default)]
    name: String,
    position: String,
    height: Option<f64>,
    weight: Option<f64>,
    birth_date: Option<String>,
    draft_cap: Option<u32>,
    draft_year: Option<u16>,
    ras: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSeason {
    player_id: String,
    year: u16,
    team_id: Option<String>,
    games_played: Option<u32>,
    scrim_ypg: Option<f64>,
    fppg: Option<f64>,
    run_grade: Option<f64>,
    rec_grade: Option<f64>,
    yprr: Option<f64>,
    tprr: Option<f64>,
    rec_yds: Option<f64>,
    receptions: Option<u32>,
    rush_att: Option<u32>,
    rush_yds: Option<f64>,
    season_age: Option<u32>,
    team_yards_market_share: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTeamYear {
    team_id: String,
    year: u16,
    sos: Option<f64>,
    srs: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawProSeason {
    player_id: String,
    year: u16,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns true if every present value is finite (not NaN or Infinity).
fn all_finite(values: &[Option<f64>]) -> bool {
    values.iter().flatten().all(|v| v.is_finite())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Reader-based loaders (enable testing without temp files)
// ---------------------------------------------------------------------------

pub fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<PlayerProfile>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawPlayer>() {
        match result {
            Ok(raw) => {
                let player_id = raw.player_id.trim().to_string();
                if player_id.is_empty() {
                    warn!("skipping player row with empty player_id");
                    continue;
                }
                if !all_finite(&[raw.height, raw.weight, raw.ras]) {
                    warn!("skipping player '{}': non-finite measurable", player_id);
                    continue;
                }
                let birth_date = non_empty(raw.birth_date).and_then(|text| {
                    match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
                        Ok(date) => Some(date),
                        Err(e) => {
                            warn!("ignoring birth_date '{}' for '{}': {}", text, player_id, e);
                            None
                        }
                    }
                });
                players.push(PlayerProfile {
                    player_id,
                    name: raw.name.trim().to_string(),
                    position: raw.position.trim().to_uppercase(),
                    height: raw.height,
                    weight: raw.weight,
                    birth_date,
                    draft_cap: raw.draft_cap,
                    draft_year: raw.draft_year,
                    athletic_testing_score: raw.ras,
                });
            }
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
            }
        }
    }
    Ok(players)
}

pub fn load_seasons_from_reader<R: Read>(rdr: R) -> Result<Vec<SeasonRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut seasons = Vec::new();
    for result in reader.deserialize::<RawSeason>() {
        match result {
            Ok(raw) => {
                let player_id = raw.player_id.trim().to_string();
                if !all_finite(&[
                    raw.scrim_ypg,
                    raw.fppg,
                    raw.run_grade,
                    raw.rec_grade,
                    raw.yprr,
                    raw.tprr,
                    raw.rec_yds,
                    raw.rush_yds,
                    raw.team_yards_market_share,
                ]) {
                    warn!(
                        "skipping season {} for '{}': non-finite value",
                        raw.year, player_id
                    );
                    continue;
                }
                seasons.push(SeasonRecord {
                    player_id,
                    year: raw.year,
                    team_id: non_empty(raw.team_id),
                    games_played: raw.games_played,
                    scrimmage_yards_per_game: raw.scrim_ypg,
                    fantasy_points_per_game: raw.fppg,
                    run_grade: raw.run_grade,
                    reception_grade: raw.rec_grade,
                    yards_per_route_run: raw.yprr,
                    targets_per_route_run: raw.tprr,
                    receiving_yards: raw.rec_yds,
                    receptions: raw.receptions,
                    rush_attempts: raw.rush_att,
                    rush_yards: raw.rush_yds,
                    team_strength_of_schedule: None,
                    team_simple_rating: None,
                    season_age: raw.season_age,
                    team_yardage_market_share: raw.team_yards_market_share,
                });
            }
            Err(e) => {
                warn!("skipping malformed season row: {}", e);
            }
        }
    }
    Ok(seasons)
}

pub fn load_team_years_from_reader<R: Read>(rdr: R) -> Result<Vec<TeamYear>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut team_years = Vec::new();
    for result in reader.deserialize::<RawTeamYear>() {
        match result {
            Ok(raw) => {
                if !all_finite(&[raw.sos, raw.srs]) {
                    warn!("skipping team '{}' {}: non-finite rating", raw.team_id.trim(), raw.year);
                    continue;
                }
                team_years.push(TeamYear {
                    team_id: raw.team_id.trim().to_string(),
                    year: raw.year,
                    strength_of_schedule: raw.sos,
                    simple_rating: raw.srs,
                });
            }
            Err(e) => {
                warn!("skipping malformed team-year row: {}", e);
            }
        }
    }
    Ok(team_years)
}

pub fn load_pro_seasons_from_reader<R: Read>(rdr: R) -> Result<Vec<(String, u16)>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut pro = Vec::new();
    for result in reader.deserialize::<RawProSeason>() {
        match result {
            Ok(raw) => pro.push((raw.player_id.trim().to_string(), raw.year)),
            Err(e) => {
                warn!("skipping malformed pro-season row: {}", e);
            }
        }
    }
    Ok(pro)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open_csv(path: &Path) -> Result<std::fs::File, ImportError> {
    std::fs::File::open(path).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> ImportError + '_ {
    move |e| ImportError::Csv {
        path: path.display().to_string(),
        source: e,
    }
}

/// Load every configured CSV file into an `ImportBundle`.
pub fn load_bundle(paths: &ImportPaths) -> Result<ImportBundle, ImportError> {
    let players =
        load_players_from_reader(open_csv(&paths.players)?).map_err(csv_error(&paths.players))?;
    if players.is_empty() {
        return Err(ImportError::Validation(
            "player CSV produced zero valid rows".into(),
        ));
    }

    let mut bundle = ImportBundle {
        players,
        ..Default::default()
    };

    if let Some(path) = &paths.seasons {
        bundle.seasons = load_seasons_from_reader(open_csv(path)?).map_err(csv_error(path))?;
    }
    if let Some(path) = &paths.team_years {
        bundle.team_years = load_team_years_from_reader(open_csv(path)?).map_err(csv_error(path))?;
    }
    if let Some(path) = &paths.pro_seasons {
        bundle.pro_seasons =
            load_pro_seasons_from_reader(open_csv(path)?).map_err(csv_error(path))?;
    }

    Ok(bundle)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn players_csv_with_missing_cells() {
        let csv_data = "\
player_id,name,position,height,weight,birth_date,draft_cap,draft_year,ras
bijan-r,Bijan Robinson,rb,71,215,2002-01-30,8,2023,9.3
sam-l,Sam LaPorta,TE,,,,34,2023,";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 2);

        assert_eq!(players[0].player_id, "bijan-r");
        assert_eq!(players[0].position, "RB");
        assert_eq!(players[0].height, Some(71.0));
        assert_eq!(players[0].birth_date, NaiveDate::from_ymd_opt(2002, 1, 30));
        assert_eq!(players[0].draft_cap, Some(8));
        assert_eq!(players[0].athletic_testing_score, Some(9.3));

        assert_eq!(players[1].height, None);
        assert_eq!(players[1].weight, None);
        assert_eq!(players[1].birth_date, None);
        assert_eq!(players[1].athletic_testing_score, None);
        assert_eq!(players[1].draft_year, Some(2023));
    }

    #[test]
    fn players_csv_skips_malformed_rows() {
        let csv_data = "\
player_id,name,position,height,weight,birth_date,draft_cap,draft_year,ras
ok,Fine Player,WR,72,200,,,,
bad,Broken Player,WR,tall,200,,,,
,No Id,WR,72,200,,,,";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].player_id, "ok");
    }

    #[test]
    fn players_csv_ignores_bad_birth_date() {
        let csv_data = "\
player_id,name,position,height,weight,birth_date,draft_cap,draft_year,ras
p1,Someone,RB,70,200,03/14/2000,,,";

        let players = load_players_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].birth_date, None);
    }

    #[test]
    fn seasons_csv_maps_columns() {
        let csv_data = "\
player_id,year,team_id,games_played,scrim_ypg,fppg,run_grade,rec_grade,yprr,tprr,rec_yds,receptions,rush_att,rush_yds,season_age,team_yards_market_share
p1,2021,texas,12,150.2,24.1,91.0,,,,314,26,258,1580,19,0.31
p1,2022,texas,,,,,,,,,,,,,";

        let seasons = load_seasons_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(seasons.len(), 2);

        let s = &seasons[0];
        assert_eq!(s.team_id.as_deref(), Some("texas"));
        assert_eq!(s.games_played, Some(12));
        assert_eq!(s.run_grade, Some(91.0));
        assert_eq!(s.reception_grade, None);
        assert_eq!(s.receptions, Some(26));
        assert_eq!(s.rush_attempts, Some(258));
        assert_eq!(s.season_age, Some(19));
        assert_eq!(s.team_yardage_market_share, Some(0.31));
        assert_eq!(s.team_strength_of_schedule, None);

        assert_eq!(seasons[1].games_played, None);
        assert_eq!(seasons[1].rush_attempts, None);
    }

    #[test]
    fn seasons_csv_skips_non_finite_values() {
        let csv_data = "\
player_id,year,team_id,games_played,scrim_ypg,fppg,run_grade,rec_grade,yprr,tprr,rec_yds,receptions,rush_att,rush_yds,season_age,team_yards_market_share
p1,2021,texas,12,NaN,24.1,,,,,,,,,,";

        let seasons = load_seasons_from_reader(csv_data.as_bytes()).unwrap();
        assert!(seasons.is_empty());
    }

    #[test]
    fn team_years_and_pro_seasons_csv() {
        let teams = "team_id,year,sos,srs\nuga,2021,5.5,22.1\nsmu,2021,,-1.5";
        let team_years = load_team_years_from_reader(teams.as_bytes()).unwrap();
        assert_eq!(team_years.len(), 2);
        assert_eq!(team_years[0].strength_of_schedule, Some(5.5));
        assert_eq!(team_years[1].strength_of_schedule, None);
        assert_eq!(team_years[1].simple_rating, Some(-1.5));

        let pro = "player_id,year\np1,2023\np1,2024";
        let pro_seasons = load_pro_seasons_from_reader(pro.as_bytes()).unwrap();
        assert_eq!(pro_seasons, vec![("p1".to_string(), 2023), ("p1".to_string(), 2024)]);
    }

    #[test]
    fn load_bundle_reports_missing_file() {
        let paths = ImportPaths {
            players: PathBuf::from("/definitely/not/here/players.csv"),
            ..Default::default()
        };
        let err = load_bundle(&paths).unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }

    #[test]
    fn load_bundle_rejects_empty_player_file() {
        let dir = std::env::temp_dir().join("cupps_import_test_empty");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let players = dir.join("players.csv");
        std::fs::write(
            &players,
            "player_id,name,position,height,weight,birth_date,draft_cap,draft_year,ras\n",
        )
        .unwrap();

        let err = load_bundle(&ImportPaths {
            players,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ImportError::Validation(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
