// Player, season, and score records shared by storage and the scoring engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Offensive skill positions the scoring engine knows how to evaluate.
///
/// Any other position string coming out of storage is carried as raw text on
/// `PlayerProfile` and rejected when the batch driver parses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    RunningBack,
    WideReceiver,
    TightEnd,
}

impl Position {
    pub const ALL: [Position; 3] = [
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
    ];

    /// Parse a position code ("RB", "WR", "TE"), case-insensitively.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
        }
    }

    /// Whether receptions (rather than rush attempts) are this position's
    /// primary measure of involvement.
    pub fn is_receiving_first(&self) -> bool {
        matches!(self, Position::WideReceiver | Position::TightEnd)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// Static profile for one prospect, as stored by the data-collection side.
///
/// `position` is kept as the raw stored code so that unsupported positions
/// survive loading and can be reported when they are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_id: String,
    pub name: String,
    pub position: String,
    /// Inches.
    pub height: Option<f64>,
    /// Pounds.
    pub weight: Option<f64>,
    pub birth_date: Option<NaiveDate>,
    /// Overall draft pick number. `None` means undrafted.
    pub draft_cap: Option<u32>,
    pub draft_year: Option<u16>,
    /// Relative Athletic Score, 0-10.
    pub athletic_testing_score: Option<f64>,
}

impl PlayerProfile {
    /// Minimal profile used by tests and the CSV importer.
    pub fn new(player_id: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            name: String::new(),
            position: position.into(),
            height: None,
            weight: None,
            birth_date: None,
            draft_cap: None,
            draft_year: None,
            athletic_testing_score: None,
        }
    }

    pub fn parsed_position(&self) -> Option<Position> {
        Position::from_str_pos(&self.position)
    }
}

/// One college season for one player. Team schedule strength is joined in
/// from the team-year table when the season is loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub player_id: String,
    pub year: u16,
    pub team_id: Option<String>,
    pub games_played: Option<u32>,
    pub scrimmage_yards_per_game: Option<f64>,
    pub fantasy_points_per_game: Option<f64>,
    pub run_grade: Option<f64>,
    pub reception_grade: Option<f64>,
    pub yards_per_route_run: Option<f64>,
    pub targets_per_route_run: Option<f64>,
    pub receiving_yards: Option<f64>,
    pub receptions: Option<u32>,
    pub rush_attempts: Option<u32>,
    pub rush_yards: Option<f64>,
    pub team_strength_of_schedule: Option<f64>,
    pub team_simple_rating: Option<f64>,
    pub season_age: Option<u32>,
    pub team_yardage_market_share: Option<f64>,
}

impl SeasonRecord {
    pub fn new(player_id: impl Into<String>, year: u16) -> Self {
        Self {
            player_id: player_id.into(),
            year,
            ..Default::default()
        }
    }

    /// Whether any of the four grade-like metrics is present.
    pub fn has_any_grade(&self) -> bool {
        self.run_grade.is_some()
            || self.reception_grade.is_some()
            || self.yards_per_route_run.is_some()
            || self.targets_per_route_run.is_some()
    }
}

/// Schedule strength for one team in one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamYear {
    pub team_id: String,
    pub year: u16,
    pub strength_of_schedule: Option<f64>,
    pub simple_rating: Option<f64>,
}

// ---------------------------------------------------------------------------
// Output record
// ---------------------------------------------------------------------------

/// The three scores written back onto a player row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player_id: String,
    pub production_score: f64,
    pub size_score: f64,
    pub cupps_score: f64,
}
