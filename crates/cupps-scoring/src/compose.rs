// Per-player composition: season aggregate -> production, size, and draft
// weight -> composite score.

use cupps_core::config::Config;
use cupps_core::model::{PlayerProfile, ScoreRecord, SeasonRecord};

use crate::averages::ScoringContext;
use crate::draft_capital::draft_capital_weight;
use crate::error::SkipReason;
use crate::imputation::resolve_measurables;
use crate::production::score_production;
use crate::season::SeasonAggregator;
use crate::size::size_score;

const PRODUCTION_WEIGHT: f64 = 2.25;
const SIZE_WEIGHT: f64 = 1.0;
const DRAFT_WEIGHT: f64 = 2.75;
/// Weighted sum that maps to a composite of 100.
const COMPOSITE_SCALE: f64 = 600.0;

/// Composite score, bounded to [0, 100].
pub fn compose_cupps(production: f64, size: f64, draft_weight: f64) -> f64 {
    let weighted = PRODUCTION_WEIGHT * production + SIZE_WEIGHT * size + DRAFT_WEIGHT * draft_weight;
    (weighted / COMPOSITE_SCALE * 100.0).clamp(0.0, 100.0)
}

/// The three sub-scores behind one composite, kept for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub production: f64,
    pub size: f64,
    pub draft_weight: f64,
    pub cupps: f64,
}

impl ScoreBreakdown {
    pub fn into_record(self, player_id: &str) -> ScoreRecord {
        ScoreRecord {
            player_id: player_id.to_string(),
            production_score: self.production,
            size_score: self.size,
            cupps_score: self.cupps,
        }
    }
}

/// Score one player from their own seasons (in year order).
pub fn score_player<'s, I>(
    player: &PlayerProfile,
    seasons: I,
    ctx: &ScoringContext,
    config: &Config,
) -> Result<ScoreBreakdown, SkipReason>
where
    I: IntoIterator<Item = &'s SeasonRecord>,
{
    let position = player
        .parsed_position()
        .ok_or_else(|| SkipReason::UnsupportedPosition(player.position.clone()))?;
    let grades = ctx.grades.for_position(position);

    let aggregate = SeasonAggregator::new(position, &grades, &config.thresholds)
        .with_birth_date(player.birth_date, config.scoring.derive_age_from_birth_date)
        .aggregate(seasons)?;

    let production = score_production(position, &aggregate, &grades);

    let (height, weight) = resolve_measurables(
        player.height,
        player.weight,
        config.scoring.impute_measurables,
    );
    let mut size = size_score(
        position,
        height,
        weight,
        player.athletic_testing_score,
        player.draft_cap,
        &ctx.ras,
    );
    if config.scoring.clamp_size_score {
        size = size.clamp(0.0, 100.0);
    }

    let draft_weight = draft_capital_weight(player.draft_cap, position);

    Ok(ScoreBreakdown {
        production,
        size,
        draft_weight,
        cupps: compose_cupps(production, size, draft_weight),
    })
}
