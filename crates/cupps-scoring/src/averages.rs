// Per-run fallback averages: grade metrics per position, and athletic testing
// scores per position and draft bucket.
//
// Both maps are computed once from the full store at the start of a batch and
// are read-only afterwards.

use std::collections::HashMap;

use cupps_core::model::{PlayerProfile, Position, SeasonRecord};
use tracing::info;

use crate::stats::MeanAccumulator;

// ---------------------------------------------------------------------------
// Grade averages
// ---------------------------------------------------------------------------

/// Fallback values for the four grade-like metrics at one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeAverages {
    pub run_grade: f64,
    pub reception_grade: f64,
    pub yards_per_route_run: f64,
    pub targets_per_route_run: f64,
}

/// Used for any metric with no qualifying rows at a position.
pub const DEFAULT_GRADE_AVERAGES: GradeAverages = GradeAverages {
    run_grade: 60.0,
    reception_grade: 60.0,
    yards_per_route_run: 1.5,
    targets_per_route_run: 0.1,
};

impl Default for GradeAverages {
    fn default() -> Self {
        DEFAULT_GRADE_AVERAGES
    }
}

#[derive(Debug, Default)]
struct GradeAccumulator {
    run_grade: MeanAccumulator,
    reception_grade: MeanAccumulator,
    yards_per_route_run: MeanAccumulator,
    targets_per_route_run: MeanAccumulator,
}

impl GradeAccumulator {
    fn push(&mut self, season: &SeasonRecord) {
        self.run_grade.push_opt(season.run_grade);
        self.reception_grade.push_opt(season.reception_grade);
        self.yards_per_route_run.push_opt(season.yards_per_route_run);
        self.targets_per_route_run.push_opt(season.targets_per_route_run);
    }

    fn finish(&self) -> GradeAverages {
        GradeAverages {
            run_grade: self
                .run_grade
                .mean()
                .unwrap_or(DEFAULT_GRADE_AVERAGES.run_grade),
            reception_grade: self
                .reception_grade
                .mean()
                .unwrap_or(DEFAULT_GRADE_AVERAGES.reception_grade),
            yards_per_route_run: self
                .yards_per_route_run
                .mean()
                .unwrap_or(DEFAULT_GRADE_AVERAGES.yards_per_route_run),
            targets_per_route_run: self
                .targets_per_route_run
                .mean()
                .unwrap_or(DEFAULT_GRADE_AVERAGES.targets_per_route_run),
        }
    }
}

/// Grade-metric fallbacks for every supported position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalAverages {
    by_position: HashMap<Position, GradeAverages>,
}

impl GlobalAverages {
    /// Average each metric over every season row (of a player at the given
    /// position) that carries at least one grade. Each metric's mean only
    /// counts rows where that metric is present.
    pub fn compute(players: &[PlayerProfile], seasons: &[SeasonRecord]) -> Self {
        let positions: HashMap<&str, Position> = players
            .iter()
            .filter_map(|p| p.parsed_position().map(|pos| (p.player_id.as_str(), pos)))
            .collect();

        let mut accumulators: HashMap<Position, GradeAccumulator> = HashMap::new();
        for season in seasons.iter().filter(|s| s.has_any_grade()) {
            if let Some(&pos) = positions.get(season.player_id.as_str()) {
                accumulators.entry(pos).or_default().push(season);
            }
        }

        let by_position = Position::ALL
            .iter()
            .map(|&pos| {
                let averages = accumulators
                    .get(&pos)
                    .map(GradeAccumulator::finish)
                    .unwrap_or_default();
                (pos, averages)
            })
            .collect();

        Self { by_position }
    }

    /// Build directly from known values (tests and callers with precomputed
    /// aggregates).
    pub fn from_values(values: impl IntoIterator<Item = (Position, GradeAverages)>) -> Self {
        Self {
            by_position: values.into_iter().collect(),
        }
    }

    pub fn for_position(&self, position: Position) -> GradeAverages {
        self.by_position
            .get(&position)
            .copied()
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Athletic testing (RAS) averages by draft bucket
// ---------------------------------------------------------------------------

/// Grouping of draft pick ranges used to condition athletic-score imputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DraftBucket {
    /// Picks 1-15.
    Elite,
    /// Picks 16-32.
    Day1,
    /// Picks 33-100.
    Day2,
    /// Picks 101 and later.
    Day3,
}

impl DraftBucket {
    pub const ALL: [DraftBucket; 4] = [
        DraftBucket::Elite,
        DraftBucket::Day1,
        DraftBucket::Day2,
        DraftBucket::Day3,
    ];

    pub fn from_pick(pick: u32) -> Self {
        match pick {
            0..=15 => DraftBucket::Elite,
            16..=32 => DraftBucket::Day1,
            33..=100 => DraftBucket::Day2,
            _ => DraftBucket::Day3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DraftBucket::Elite => "elite",
            DraftBucket::Day1 => "day1",
            DraftBucket::Day2 => "day2",
            DraftBucket::Day3 => "day3",
        }
    }
}

/// Used for an empty position/bucket cell.
pub const DEFAULT_BUCKET_RAS: f64 = 5.0;

/// Mean observed athletic testing score per position and draft bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasBucketAverages {
    by_bucket: HashMap<(Position, DraftBucket), f64>,
}

impl RasBucketAverages {
    /// Undrafted players with an observed score are pooled into `Day3`.
    pub fn compute(players: &[PlayerProfile]) -> Self {
        let mut accumulators: HashMap<(Position, DraftBucket), MeanAccumulator> = HashMap::new();
        for player in players {
            let (Some(pos), Some(ras)) = (player.parsed_position(), player.athletic_testing_score)
            else {
                continue;
            };
            let bucket = player
                .draft_cap
                .map(DraftBucket::from_pick)
                .unwrap_or(DraftBucket::Day3);
            accumulators.entry((pos, bucket)).or_default().push(ras);
        }

        let by_bucket = accumulators
            .into_iter()
            .filter_map(|(key, acc)| acc.mean().map(|mean| (key, mean)))
            .collect();

        Self { by_bucket }
    }

    pub fn from_values(values: impl IntoIterator<Item = ((Position, DraftBucket), f64)>) -> Self {
        Self {
            by_bucket: values.into_iter().collect(),
        }
    }

    pub fn average(&self, position: Position, bucket: DraftBucket) -> f64 {
        self.by_bucket
            .get(&(position, bucket))
            .copied()
            .unwrap_or(DEFAULT_BUCKET_RAS)
    }
}

// ---------------------------------------------------------------------------
// Scoring context
// ---------------------------------------------------------------------------

/// Everything computed once per batch and threaded read-only through every
/// per-player calculation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringContext {
    pub grades: GlobalAverages,
    pub ras: RasBucketAverages,
}

impl ScoringContext {
    pub fn build(players: &[PlayerProfile], seasons: &[SeasonRecord]) -> Self {
        let ctx = Self {
            grades: GlobalAverages::compute(players, seasons),
            ras: RasBucketAverages::compute(players),
        };

        for pos in Position::ALL {
            let g = ctx.grades.for_position(pos);
            info!(
                "{} grade averages: run={:.2} rec={:.2} yprr={:.3} tprr={:.3}",
                pos, g.run_grade, g.reception_grade, g.yards_per_route_run, g.targets_per_route_run
            );
            let buckets: Vec<String> = DraftBucket::ALL
                .iter()
                .map(|b| format!("{}={:.2}", b.label(), ctx.ras.average(pos, *b)))
                .collect();
            info!("{} RAS bucket averages: {}", pos, buckets.join(" "));
        }

        ctx
    }
}
