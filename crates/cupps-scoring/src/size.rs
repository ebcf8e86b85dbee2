// Size and athleticism score.

use cupps_core::model::Position;

use crate::averages::RasBucketAverages;
use crate::imputation::resolve_ras;

/// Each of the height and weight sub-scores starts here.
const SUBSCORE_BASE: f64 = 50.0;
const HEIGHT_PENALTY_PER_INCH: f64 = 6.0;
const WEIGHT_PENALTY_PER_POUND: f64 = 3.0;

const RAS_WEIGHT: f64 = 0.8;
const FRAME_WEIGHT: f64 = 0.2;

/// Minimum (height in inches, weight in pounds) before penalties apply.
pub fn size_minimums(position: Position) -> (f64, f64) {
    match position {
        Position::RunningBack => (67.0, 190.0),
        Position::WideReceiver => (70.0, 190.0),
        Position::TightEnd => (75.0, 240.0),
    }
}

fn penalized(value: f64, minimum: f64, per_unit: f64) -> f64 {
    let deficit = (minimum - value).max(0.0);
    (SUBSCORE_BASE - deficit * per_unit).max(0.0)
}

/// Height sub-score plus weight sub-score, 0-100.
pub fn size_subscore(position: Position, height: f64, weight: f64) -> f64 {
    let (min_height, min_weight) = size_minimums(position);
    penalized(height, min_height, HEIGHT_PENALTY_PER_INCH)
        + penalized(weight, min_weight, WEIGHT_PENALTY_PER_POUND)
}

/// `0.8 * ras * 10 + 0.2 * size_sub`. Missing height or weight yields 0.
///
/// The result is not clamped; an athletic score above 10 can push it past
/// 100. Callers clamp when configured to.
pub fn size_score(
    position: Position,
    height: Option<f64>,
    weight: Option<f64>,
    athletic_testing_score: Option<f64>,
    draft_cap: Option<u32>,
    buckets: &RasBucketAverages,
) -> f64 {
    let (Some(height), Some(weight)) = (height, weight) else {
        return 0.0;
    };
    let ras = resolve_ras(position, athletic_testing_score, draft_cap, buckets);
    RAS_WEIGHT * (ras * 10.0) + FRAME_WEIGHT * size_subscore(position, height, weight)
}
