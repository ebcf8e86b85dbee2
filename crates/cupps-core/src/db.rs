// SQLite persistence layer for prospects, college seasons, and scores.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use tracing::warn;

use crate::model::{PlayerProfile, ScoreRecord, SeasonRecord, TeamYear};

/// Date format used for `player.birth_date`.
const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// The read and write surface the batch scorer needs from storage.
///
/// Reads are bulk and happen before any scoring; the single write happens
/// after every score has been computed.
pub trait ProspectStore {
    /// All player profiles, ordered by `player_id`.
    fn load_players(&self) -> Result<Vec<PlayerProfile>>;

    /// All college seasons with team schedule strength joined in, ordered by
    /// player then year.
    fn load_seasons(&self) -> Result<Vec<SeasonRecord>>;

    /// Earliest professional season per player.
    fn first_pro_seasons(&self) -> Result<HashMap<String, u16>>;

    /// Write the three scores for every record in one all-or-nothing batch.
    fn write_scores(&self, scores: &[ScoreRecord]) -> Result<()>;
}

/// A stored player with their most recent scores, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPlayer {
    pub player_id: String,
    pub name: String,
    pub position: String,
    pub production_score: f64,
    pub size_score: f64,
    pub cupps_score: f64,
}

/// Row counts written by a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub players: usize,
    pub seasons: usize,
    pub team_years: usize,
    pub pro_seasons: usize,
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// SQLite-backed store for player profiles, college seasons, team schedule
/// strength, professional seasons, and computed scores.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS player (
                player_id        TEXT PRIMARY KEY,
                name             TEXT NOT NULL DEFAULT '',
                position         TEXT NOT NULL,
                height           REAL,
                weight           REAL,
                birth_date       TEXT,
                draft_cap        INTEGER,
                draft_year       INTEGER,
                ras              REAL,
                production_score REAL,
                size_score       REAL,
                cupps_score      REAL
            );

            CREATE TABLE IF NOT EXISTS college_season (
                player_id               TEXT NOT NULL REFERENCES player(player_id),
                year                    INTEGER NOT NULL,
                team_id                 TEXT,
                games_played            INTEGER,
                scrim_ypg               REAL,
                fppg                    REAL,
                run_grade               REAL,
                rec_grade               REAL,
                yprr                    REAL,
                tprr                    REAL,
                rec_yds                 REAL,
                receptions              INTEGER,
                rush_att                INTEGER,
                rush_yds                REAL,
                season_age              INTEGER,
                team_yards_market_share REAL,
                PRIMARY KEY (player_id, year)
            );

            CREATE TABLE IF NOT EXISTS team_year (
                team_id TEXT NOT NULL,
                year    INTEGER NOT NULL,
                sos     REAL,
                srs     REAL,
                PRIMARY KEY (team_id, year)
            );

            CREATE TABLE IF NOT EXISTS pro_season (
                player_id TEXT NOT NULL REFERENCES player(player_id),
                year      INTEGER NOT NULL,
                PRIMARY KEY (player_id, year)
            );
            ",
        )
        .context("failed to create database schema")?;

        conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_player_cupps ON player(cupps_score);",
        )
        .context("failed to create cupps_score index")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Insert a player or replace their profile columns. Previously computed
    /// scores are left untouched.
    pub fn upsert_player(&self, player: &PlayerProfile) -> Result<()> {
        let conn = self.conn();
        upsert_player_on(&conn, player)
    }

    /// Insert or replace one college season. Schedule strength is not stored
    /// here; it lives in `team_year`.
    pub fn upsert_season(&self, season: &SeasonRecord) -> Result<()> {
        let conn = self.conn();
        upsert_season_on(&conn, season)
    }

    pub fn upsert_team_year(&self, team_year: &TeamYear) -> Result<()> {
        let conn = self.conn();
        upsert_team_year_on(&conn, team_year)
    }

    /// Record that a player appeared in a professional season. Idempotent.
    pub fn record_pro_season(&self, player_id: &str, year: u16) -> Result<()> {
        let conn = self.conn();
        record_pro_season_on(&conn, player_id, year)
    }

    /// Import players, seasons, team years, and pro seasons in a single
    /// transaction. Players are written first so season foreign keys resolve.
    pub fn import_records(
        &self,
        players: &[PlayerProfile],
        seasons: &[SeasonRecord],
        team_years: &[TeamYear],
        pro_seasons: &[(String, u16)],
    ) -> Result<ImportCounts> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin import transaction")?;

        for player in players {
            upsert_player_on(&tx, player)?;
        }
        for team_year in team_years {
            upsert_team_year_on(&tx, team_year)?;
        }
        for season in seasons {
            upsert_season_on(&tx, season)?;
        }
        for (player_id, year) in pro_seasons {
            record_pro_season_on(&tx, player_id, *year)?;
        }

        tx.commit().context("failed to commit import")?;
        Ok(ImportCounts {
            players: players.len(),
            seasons: seasons.len(),
            team_years: team_years.len(),
            pro_seasons: pro_seasons.len(),
        })
    }

    /// Load scored players, highest `cupps_score` first, optionally limited
    /// to one position code.
    pub fn load_scores(&self, position: Option<&str>, limit: usize) -> Result<Vec<RankedPlayer>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT player_id, name, position, production_score, size_score, cupps_score
                 FROM player
                 WHERE cupps_score IS NOT NULL
                   AND (?1 IS NULL OR UPPER(position) = UPPER(?1))
                 ORDER BY cupps_score DESC, player_id
                 LIMIT ?2",
            )
            .context("failed to prepare load_scores query")?;

        let ranked = stmt
            .query_map(params![position, limit as i64], |row| {
                Ok(RankedPlayer {
                    player_id: row.get(0)?,
                    name: row.get(1)?,
                    position: row.get(2)?,
                    production_score: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
                    size_score: row.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
                    cupps_score: row.get(5)?,
                })
            })
            .context("failed to query scores")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map score rows")?;

        Ok(ranked)
    }
}

impl ProspectStore for Database {
    fn load_players(&self) -> Result<Vec<PlayerProfile>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT player_id, name, position, height, weight, birth_date,
                        draft_cap, draft_year, ras
                 FROM player ORDER BY player_id",
            )
            .context("failed to prepare load_players query")?;

        let players = stmt
            .query_map([], player_from_row)
            .context("failed to query players")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map player rows")?;

        Ok(players)
    }

    fn load_seasons(&self) -> Result<Vec<SeasonRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT c.player_id, c.year, c.team_id, c.games_played, c.scrim_ypg, c.fppg,
                        c.run_grade, c.rec_grade, c.yprr, c.tprr, c.rec_yds, c.receptions,
                        c.rush_att, c.rush_yds, t.sos, t.srs, c.season_age,
                        c.team_yards_market_share
                 FROM college_season c
                 LEFT JOIN team_year t ON c.team_id = t.team_id AND c.year = t.year
                 ORDER BY c.player_id, c.year",
            )
            .context("failed to prepare load_seasons query")?;

        let seasons = stmt
            .query_map([], |row| {
                Ok(SeasonRecord {
                    player_id: row.get(0)?,
                    year: row.get(1)?,
                    team_id: row.get(2)?,
                    games_played: row.get(3)?,
                    scrimmage_yards_per_game: row.get(4)?,
                    fantasy_points_per_game: row.get(5)?,
                    run_grade: row.get(6)?,
                    reception_grade: row.get(7)?,
                    yards_per_route_run: row.get(8)?,
                    targets_per_route_run: row.get(9)?,
                    receiving_yards: row.get(10)?,
                    receptions: row.get(11)?,
                    rush_attempts: row.get(12)?,
                    rush_yards: row.get(13)?,
                    team_strength_of_schedule: row.get(14)?,
                    team_simple_rating: row.get(15)?,
                    season_age: row.get(16)?,
                    team_yardage_market_share: row.get(17)?,
                })
            })
            .context("failed to query college seasons")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map college season rows")?;

        Ok(seasons)
    }

    fn first_pro_seasons(&self) -> Result<HashMap<String, u16>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT player_id, MIN(year) FROM pro_season GROUP BY player_id")
            .context("failed to prepare first_pro_seasons query")?;

        let firsts = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u16>(1)?)))
            .context("failed to query pro seasons")?
            .collect::<std::result::Result<HashMap<_, _>, _>>()
            .context("failed to map pro season rows")?;

        Ok(firsts)
    }

    /// Uses a proper transaction with automatic rollback on error, so a
    /// failure part-way through leaves every player row untouched.
    fn write_scores(&self, scores: &[ScoreRecord]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin score transaction")?;
        {
            let mut stmt = tx
                .prepare(
                    "UPDATE player
                     SET production_score = ?1, size_score = ?2, cupps_score = ?3
                     WHERE player_id = ?4",
                )
                .context("failed to prepare score update")?;
            for score in scores {
                stmt.execute(params![
                    score.production_score,
                    score.size_score,
                    score.cupps_score,
                    score.player_id,
                ])
                .with_context(|| format!("failed to write scores for {}", score.player_id))?;
            }
        }
        tx.commit().context("failed to commit scores")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row helpers (shared by single-row and transactional writes)
// ---------------------------------------------------------------------------

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<PlayerProfile> {
    let player_id: String = row.get(0)?;
    let birth_text: Option<String> = row.get(5)?;
    let birth_date = birth_text.and_then(|text| {
        match NaiveDate::parse_from_str(text.trim(), DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                warn!("ignoring unparseable birth_date '{}' for {}", text, player_id);
                None
            }
        }
    });
    Ok(PlayerProfile {
        player_id,
        name: row.get(1)?,
        position: row.get(2)?,
        height: row.get(3)?,
        weight: row.get(4)?,
        birth_date,
        draft_cap: row.get(6)?,
        draft_year: row.get(7)?,
        athletic_testing_score: row.get(8)?,
    })
}

fn upsert_player_on(conn: &Connection, player: &PlayerProfile) -> Result<()> {
    let birth_date = player
        .birth_date
        .map(|d| d.format(DATE_FORMAT).to_string());
    conn.execute(
        "INSERT INTO player
            (player_id, name, position, height, weight, birth_date, draft_cap, draft_year, ras)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(player_id) DO UPDATE SET
            name       = excluded.name,
            position   = excluded.position,
            height     = excluded.height,
            weight     = excluded.weight,
            birth_date = excluded.birth_date,
            draft_cap  = excluded.draft_cap,
            draft_year = excluded.draft_year,
            ras        = excluded.ras",
        params![
            player.player_id,
            player.name,
            player.position,
            player.height,
            player.weight,
            birth_date,
            player.draft_cap,
            player.draft_year,
            player.athletic_testing_score,
        ],
    )
    .with_context(|| format!("failed to upsert player {}", player.player_id))?;
    Ok(())
}

fn upsert_season_on(conn: &Connection, season: &SeasonRecord) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO college_season
            (player_id, year, team_id, games_played, scrim_ypg, fppg, run_grade, rec_grade,
             yprr, tprr, rec_yds, receptions, rush_att, rush_yds, season_age,
             team_yards_market_share)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            season.player_id,
            season.year,
            season.team_id,
            season.games_played,
            season.scrimmage_yards_per_game,
            season.fantasy_points_per_game,
            season.run_grade,
            season.reception_grade,
            season.yards_per_route_run,
            season.targets_per_route_run,
            season.receiving_yards,
            season.receptions,
            season.rush_attempts,
            season.rush_yards,
            season.season_age,
            season.team_yardage_market_share,
        ],
    )
    .with_context(|| {
        format!(
            "failed to upsert season {} for {}",
            season.year, season.player_id
        )
    })?;
    Ok(())
}

fn upsert_team_year_on(conn: &Connection, team_year: &TeamYear) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO team_year (team_id, year, sos, srs) VALUES (?1, ?2, ?3, ?4)",
        params![
            team_year.team_id,
            team_year.year,
            team_year.strength_of_schedule,
            team_year.simple_rating,
        ],
    )
    .context("failed to upsert team year")?;
    Ok(())
}

fn record_pro_season_on(conn: &Connection, player_id: &str, year: u16) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO pro_season (player_id, year) VALUES (?1, ?2)",
        params![player_id, year],
    )
    .context("failed to record pro season")?;
    Ok(())
}
