// Season aggregation: age- and schedule-weighted totals, peaks, and the
// involvement-gated metric samples that feed the production score.

use chrono::NaiveDate;

use cupps_core::config::ThresholdConfig;
use cupps_core::model::{Position, SeasonRecord};

use crate::averages::GradeAverages;
use crate::error::SkipReason;
use crate::imputation::{resolve_grades, resolve_season_age};

/// Age recorded for a peak season whose age is unknown, and the peak age
/// assumed when no season ever passed an involvement gate.
pub const DEFAULT_PEAK_AGE: u32 = 21;

/// Divisor inside `tanh` for the schedule adjustment.
const SCHEDULE_SCALE: f64 = 50.0;

// ---------------------------------------------------------------------------
// Multipliers
// ---------------------------------------------------------------------------

/// Per-position multipliers for ages 18 through 24.
const RB_AGE_TABLE: [f64; 7] = [1.35, 1.30, 1.25, 0.90, 0.80, 0.70, 0.60];
const WR_AGE_TABLE: [f64; 7] = [1.50, 1.40, 1.30, 0.80, 0.70, 0.60, 0.50];
const TE_AGE_TABLE: [f64; 7] = [1.20, 1.15, 1.10, 1.00, 0.90, 0.80, 0.70];

const FIRST_TABULATED_AGE: u32 = 18;

/// Younger production is worth more. Unknown age is neutral, 25 and older is
/// halved, and any other untabulated age (17 and under) is neutral.
pub fn age_multiplier(position: Position, age: Option<u32>) -> f64 {
    let Some(age) = age else {
        return 1.0;
    };
    let table = match position {
        Position::RunningBack => &RB_AGE_TABLE,
        Position::WideReceiver => &WR_AGE_TABLE,
        Position::TightEnd => &TE_AGE_TABLE,
    };
    match age.checked_sub(FIRST_TABULATED_AGE) {
        Some(idx) if (idx as usize) < table.len() => table[idx as usize],
        Some(_) => 0.5,
        None => 1.0,
    }
}

/// `1 + tanh(x / 50)` where `x` blends strength of schedule and simple rating,
/// or uses whichever one is present. Neutral when both are missing.
pub fn schedule_multiplier(sos: Option<f64>, srs: Option<f64>) -> f64 {
    let blended = match (sos, srs) {
        (Some(sos), Some(srs)) => 0.5 * sos + 0.5 * srs,
        (Some(v), None) | (None, Some(v)) => v,
        (None, None) => return 1.0,
    };
    1.0 + (blended / SCHEDULE_SCALE).tanh()
}

pub fn weight_stat(raw: f64, age_multiplier: f64, schedule_multiplier: f64) -> f64 {
    raw * age_multiplier * schedule_multiplier
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Grade-metric values from seasons that cleared the involvement gates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSamples {
    pub run_grade: Vec<f64>,
    pub reception_grade: Vec<f64>,
    pub yards_per_route_run: Vec<f64>,
    pub targets_per_route_run: Vec<f64>,
}

/// Career summary for one player. Totals and weighted peaks include every
/// season with games played; the averages divide by `valid_seasons`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonAggregate {
    pub total_scrimmage_ypg: f64,
    pub total_fppg: f64,
    pub total_market_share: f64,

    pub peak_fppg: f64,
    pub peak_market_share: f64,

    pub peak_run_grade: f64,
    pub peak_reception_grade: f64,
    pub peak_yards_per_route_run: f64,
    pub peak_targets_per_route_run: f64,
    /// Rush plus receiving yards, unweighted.
    pub peak_scrimmage_yards: f64,
    pub peak_receiving_yards: f64,
    pub peak_season_age: Option<u32>,

    pub samples: MetricSamples,
    pub valid_seasons: u32,
}

impl SeasonAggregate {
    fn per_valid_season(&self, total: f64) -> f64 {
        if self.valid_seasons == 0 {
            return 0.0;
        }
        total / f64::from(self.valid_seasons)
    }

    pub fn avg_scrimmage_ypg(&self) -> f64 {
        self.per_valid_season(self.total_scrimmage_ypg)
    }

    pub fn avg_fppg(&self) -> f64 {
        self.per_valid_season(self.total_fppg)
    }

    pub fn avg_market_share(&self) -> f64 {
        self.per_valid_season(self.total_market_share)
    }

    pub fn peak_age(&self) -> u32 {
        self.peak_season_age.unwrap_or(DEFAULT_PEAK_AGE)
    }
}

/// Per-player inputs to the aggregation pass beyond the season rows.
#[derive(Debug, Clone, Copy)]
pub struct SeasonAggregator<'a> {
    pub position: Position,
    pub grades: &'a GradeAverages,
    pub thresholds: &'a ThresholdConfig,
    pub birth_date: Option<NaiveDate>,
    pub derive_age_from_birth_date: bool,
}

impl<'a> SeasonAggregator<'a> {
    pub fn new(position: Position, grades: &'a GradeAverages, thresholds: &'a ThresholdConfig) -> Self {
        Self {
            position,
            grades,
            thresholds,
            birth_date: None,
            derive_age_from_birth_date: false,
        }
    }

    pub fn with_birth_date(mut self, birth_date: Option<NaiveDate>, derive: bool) -> Self {
        self.birth_date = birth_date;
        self.derive_age_from_birth_date = derive;
        self
    }

    /// Fold the seasons (expected in year order) into a [`SeasonAggregate`].
    ///
    /// Seasons with no games played are ignored entirely. Returns
    /// [`SkipReason::NoValidSeasons`] when no season meets the position's
    /// touch threshold.
    pub fn aggregate<'s, I>(&self, seasons: I) -> Result<SeasonAggregate, SkipReason>
    where
        I: IntoIterator<Item = &'s SeasonRecord>,
    {
        let mut agg = SeasonAggregate::default();

        for season in seasons {
            if season.games_played.unwrap_or(0) == 0 {
                continue;
            }
            self.fold_season(&mut agg, season);
        }

        if agg.valid_seasons == 0 {
            return Err(SkipReason::NoValidSeasons);
        }
        Ok(agg)
    }

    fn fold_season(&self, agg: &mut SeasonAggregate, season: &SeasonRecord) {
        let grades = resolve_grades(season, self.grades);
        let age = resolve_season_age(season, self.birth_date, self.derive_age_from_birth_date);
        let rush_attempts = season.rush_attempts.unwrap_or(0);
        let receptions = season.receptions.unwrap_or(0);
        let receiving_yards = season.receiving_yards.unwrap_or(0.0);
        let scrimmage_yards = season.rush_yards.unwrap_or(0.0) + receiving_yards;

        // ---- involvement-gated samples and peaks ----
        if rush_attempts > self.thresholds.rush_sample_gate {
            agg.samples.run_grade.push(grades.run_grade);
            agg.peak_run_grade = agg.peak_run_grade.max(grades.run_grade);
            agg.peak_scrimmage_yards = agg.peak_scrimmage_yards.max(scrimmage_yards);
            agg.peak_season_age = Some(age.unwrap_or(DEFAULT_PEAK_AGE));
        }

        if receptions > self.thresholds.reception_sample_gate {
            agg.samples.reception_grade.push(grades.reception_grade);
            agg.samples.yards_per_route_run.push(grades.yards_per_route_run);
            agg.samples
                .targets_per_route_run
                .push(grades.targets_per_route_run);
            agg.peak_reception_grade = agg.peak_reception_grade.max(grades.reception_grade);
            agg.peak_yards_per_route_run =
                agg.peak_yards_per_route_run.max(grades.yards_per_route_run);
            agg.peak_targets_per_route_run =
                agg.peak_targets_per_route_run.max(grades.targets_per_route_run);
            if receiving_yards > agg.peak_receiving_yards {
                agg.peak_receiving_yards = receiving_yards;
                agg.peak_season_age = Some(age.unwrap_or(DEFAULT_PEAK_AGE));
            }
        }

        // ---- weighted totals ----
        let age_mult = age_multiplier(self.position, age);
        let sched_mult =
            schedule_multiplier(season.team_strength_of_schedule, season.team_simple_rating);
        let weighted = |raw: Option<f64>| weight_stat(raw.unwrap_or(0.0), age_mult, sched_mult);

        let scrimmage_ypg = weighted(season.scrimmage_yards_per_game);
        let fppg = weighted(season.fantasy_points_per_game);
        let market_share = weighted(season.team_yardage_market_share);

        agg.total_scrimmage_ypg += scrimmage_ypg;
        agg.total_fppg += fppg;
        agg.total_market_share += market_share;
        agg.peak_fppg = agg.peak_fppg.max(fppg);
        agg.peak_market_share = agg.peak_market_share.max(market_share);

        // ---- validity ----
        let touches = if self.position.is_receiving_first() {
            receptions
        } else {
            rush_attempts
        };
        if touches >= self.thresholds.valid_season_touches(self.position) {
            agg.valid_seasons += 1;
        }
    }
}
