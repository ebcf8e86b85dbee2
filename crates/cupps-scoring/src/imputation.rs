// Fallback chains for nullable inputs.
//
// Each resolver is a pure function over one field so every tier can be
// exercised on its own: observed value, then global or bucket average, then a
// fixed constant.

use chrono::{Datelike, NaiveDate};

use cupps_core::model::{Position, SeasonRecord};

use crate::averages::{DraftBucket, GradeAverages, RasBucketAverages};

/// Athletic score assumed for a player with neither a score nor a draft pick.
pub const UNKNOWN_PICK_RAS: f64 = 7.0;

/// League-typical measurables used when measurable imputation is enabled.
pub const DEFAULT_HEIGHT: f64 = 72.0;
pub const DEFAULT_WEIGHT: f64 = 210.0;

/// Observed value, or the fallback.
pub fn resolve_metric(observed: Option<f64>, fallback: f64) -> f64 {
    observed.unwrap_or(fallback)
}

/// The four grade metrics of one season with nulls filled in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedGrades {
    pub run_grade: f64,
    pub reception_grade: f64,
    pub yards_per_route_run: f64,
    pub targets_per_route_run: f64,
}

pub fn resolve_grades(season: &SeasonRecord, averages: &GradeAverages) -> ResolvedGrades {
    ResolvedGrades {
        run_grade: resolve_metric(season.run_grade, averages.run_grade),
        reception_grade: resolve_metric(season.reception_grade, averages.reception_grade),
        yards_per_route_run: resolve_metric(
            season.yards_per_route_run,
            averages.yards_per_route_run,
        ),
        targets_per_route_run: resolve_metric(
            season.targets_per_route_run,
            averages.targets_per_route_run,
        ),
    }
}

/// Observed athletic score, else the position/bucket average for the draft
/// pick, else [`UNKNOWN_PICK_RAS`] for undrafted players.
pub fn resolve_ras(
    position: Position,
    observed: Option<f64>,
    draft_cap: Option<u32>,
    buckets: &RasBucketAverages,
) -> f64 {
    match (observed, draft_cap) {
        (Some(ras), _) => ras,
        (None, Some(pick)) => buckets.average(position, DraftBucket::from_pick(pick)),
        (None, None) => UNKNOWN_PICK_RAS,
    }
}

/// Whole years between `birth_date` and September 1 of `season_year`.
///
/// `None` when the date cannot be built or the player would not yet be born.
pub fn age_on_sept_1(birth_date: NaiveDate, season_year: u16) -> Option<u32> {
    let reference = NaiveDate::from_ymd_opt(i32::from(season_year), 9, 1)?;
    reference.years_since(birth_date)
}

/// Stored season age, else (when allowed) the age derived from the birth date.
pub fn resolve_season_age(
    season: &SeasonRecord,
    birth_date: Option<NaiveDate>,
    derive_from_birth_date: bool,
) -> Option<u32> {
    season.season_age.or_else(|| {
        if !derive_from_birth_date {
            return None;
        }
        birth_date.and_then(|dob| age_on_sept_1(dob, season.year))
    })
}

/// Height and weight for the size score. Without imputation a missing value
/// stays missing, which zeroes the size score downstream.
pub fn resolve_measurables(
    height: Option<f64>,
    weight: Option<f64>,
    impute: bool,
) -> (Option<f64>, Option<f64>) {
    if impute {
        (
            Some(height.unwrap_or(DEFAULT_HEIGHT)),
            Some(weight.unwrap_or(DEFAULT_WEIGHT)),
        )
    } else {
        (height, weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::averages::DEFAULT_GRADE_AVERAGES;

    const EPS: f64 = 1e-9;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn metric_prefers_observed_including_zero() {
        assert_eq!(resolve_metric(Some(0.0), 60.0), 0.0);
        assert_eq!(resolve_metric(Some(74.2), 60.0), 74.2);
        assert_eq!(resolve_metric(None, 60.0), 60.0);
    }

    #[test]
    fn grades_fill_only_missing_fields() {
        let season = SeasonRecord {
            run_grade: Some(81.0),
            yards_per_route_run: Some(2.4),
            ..SeasonRecord::new("p1", 2020)
        };
        let resolved = resolve_grades(&season, &DEFAULT_GRADE_AVERAGES);
        assert_eq!(resolved.run_grade, 81.0);
        assert_eq!(resolved.reception_grade, 60.0);
        assert_eq!(resolved.yards_per_route_run, 2.4);
        assert_eq!(resolved.targets_per_route_run, 0.1);
    }

    #[test]
    fn ras_fallback_tiers() {
        let buckets = RasBucketAverages::from_values([
            ((Position::WideReceiver, DraftBucket::Day2), 6.25),
        ]);

        // Observed wins regardless of pick.
        assert_eq!(resolve_ras(Position::WideReceiver, Some(9.1), Some(50), &buckets), 9.1);
        // Bucket average for the pick.
        assert!((resolve_ras(Position::WideReceiver, None, Some(50), &buckets) - 6.25).abs() < EPS);
        // Empty bucket.
        assert!((resolve_ras(Position::WideReceiver, None, Some(3), &buckets) - 5.0).abs() < EPS);
        // Undrafted.
        assert!((resolve_ras(Position::WideReceiver, None, None, &buckets) - 7.0).abs() < EPS);
    }

    #[test]
    fn age_on_sept_1_counts_whole_years() {
        // Birthday before the reference date.
        assert_eq!(age_on_sept_1(date(2000, 3, 15), 2019), Some(19));
        // Birthday after the reference date.
        assert_eq!(age_on_sept_1(date(2000, 10, 2), 2019), Some(18));
        // Birthday on the reference date.
        assert_eq!(age_on_sept_1(date(2000, 9, 1), 2019), Some(19));
        // Not yet born.
        assert_eq!(age_on_sept_1(date(2021, 1, 1), 2019), None);
    }

    #[test]
    fn season_age_chain() {
        let dob = Some(date(2001, 1, 20));
        let mut season = SeasonRecord::new("p1", 2021);

        assert_eq!(resolve_season_age(&season, dob, true), Some(20));
        assert_eq!(resolve_season_age(&season, dob, false), None);
        assert_eq!(resolve_season_age(&season, None, true), None);

        season.season_age = Some(22);
        assert_eq!(resolve_season_age(&season, dob, true), Some(22));
        assert_eq!(resolve_season_age(&season, dob, false), Some(22));
    }

    #[test]
    fn measurables_only_imputed_when_enabled() {
        assert_eq!(resolve_measurables(None, Some(200.0), false), (None, Some(200.0)));
        assert_eq!(
            resolve_measurables(None, Some(200.0), true),
            (Some(72.0), Some(200.0))
        );
        assert_eq!(
            resolve_measurables(Some(74.0), None, true),
            (Some(74.0), Some(210.0))
        );
    }
}
