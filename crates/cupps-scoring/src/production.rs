// Position-specific production formulas over a season aggregate.

use cupps_core::model::Position;

use crate::averages::GradeAverages;
use crate::season::SeasonAggregate;
use crate::stats::{percentile_75, scale_to_100};

/// Peak-season yardage above which a breakout season earns a bonus.
const BIG_SEASON_YARDS: f64 = 1100.0;

/// Peak age at or below which a breakout season earns the early-career rate.
const EARLY_BREAKOUT_AGE: u32 = 20;

/// Upper-quartile values of the four gated metric samples. An empty sample
/// falls back to the position's global average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentiles {
    pub run_grade: f64,
    pub reception_grade: f64,
    pub yards_per_route_run: f64,
    pub targets_per_route_run: f64,
}

pub fn metric_percentiles(agg: &SeasonAggregate, grades: &GradeAverages) -> Percentiles {
    let samples = &agg.samples;
    Percentiles {
        run_grade: percentile_75(&samples.run_grade, grades.run_grade),
        reception_grade: percentile_75(&samples.reception_grade, grades.reception_grade),
        yards_per_route_run: percentile_75(
            &samples.yards_per_route_run,
            grades.yards_per_route_run,
        ),
        targets_per_route_run: percentile_75(
            &samples.targets_per_route_run,
            grades.targets_per_route_run,
        ),
    }
}

/// Raw score that maps to 100 for each position.
pub fn production_ceiling(position: Position) -> f64 {
    match position {
        Position::RunningBack => 2800.0,
        Position::WideReceiver => 2500.0,
        Position::TightEnd => 1200.0,
    }
}

/// Bonus for peak-season yards beyond [`BIG_SEASON_YARDS`], paid at
/// `early_rate` when the peak came at age 20 or younger.
pub fn big_season_boost(peak_yards: f64, peak_age: u32, early_rate: f64, late_rate: f64) -> f64 {
    if peak_yards <= BIG_SEASON_YARDS {
        return 0.0;
    }
    let rate = if peak_age <= EARLY_BREAKOUT_AGE {
        early_rate
    } else {
        late_rate
    };
    (peak_yards - BIG_SEASON_YARDS) * rate
}

/// Unscaled production for one position.
pub fn raw_production(position: Position, agg: &SeasonAggregate, p75: &Percentiles) -> f64 {
    match position {
        Position::RunningBack => {
            let boost = big_season_boost(agg.peak_scrimmage_yards, agg.peak_age(), 0.6, 0.2);
            2.0 * agg.avg_scrimmage_ypg()
                + 10.0 * agg.avg_fppg()
                + 8.0 * agg.peak_fppg
                + 1.5 * p75.run_grade
                + 1.5 * p75.reception_grade
                + 1.5 * agg.peak_run_grade
                + 1.5 * agg.peak_reception_grade
                + 30.0 * p75.yards_per_route_run
                + p75.targets_per_route_run / 0.002
                + boost
        }
        Position::WideReceiver => {
            let boost = big_season_boost(agg.peak_receiving_yards, agg.peak_age(), 0.75, 0.2);
            agg.avg_scrimmage_ypg()
                + 5.0 * agg.avg_fppg()
                + 5.0 * agg.peak_fppg
                + 2.0 * p75.reception_grade
                + 4.0 * agg.peak_reception_grade
                + 30.0 * p75.yards_per_route_run
                + 60.0 * agg.peak_yards_per_route_run
                + p75.targets_per_route_run / 0.005
                + agg.peak_targets_per_route_run / 0.001
                + 150.0 * agg.peak_market_share
                + boost
        }
        Position::TightEnd => {
            10.0 * agg.avg_fppg()
                + 10.0 * agg.peak_fppg
                + 0.1 * agg.peak_receiving_yards
                + 3.0 * agg.avg_scrimmage_ypg()
                + 350.0 * agg.peak_market_share
                + 350.0 * agg.avg_market_share()
        }
    }
}

/// Production score in [.., 100]: raw production over the position ceiling.
pub fn score_production(position: Position, agg: &SeasonAggregate, grades: &GradeAverages) -> f64 {
    let p75 = metric_percentiles(agg, grades);
    scale_to_100(raw_production(position, agg, &p75), production_ceiling(position))
}
