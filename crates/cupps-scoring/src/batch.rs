// Batch driver: select eligible players, score them all in memory, then write
// every score in one call.

use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use cupps_core::config::Config;
use cupps_core::db::ProspectStore;
use cupps_core::model::{PlayerProfile, Position, ScoreRecord, SeasonRecord};

use crate::averages::ScoringContext;
use crate::compose::score_player;
use crate::error::SkipReason;

/// Outcome of one batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Players read from the store.
    pub loaded: usize,
    /// Players passing eligibility and the position filter.
    pub eligible: usize,
    pub scored: usize,
    pub skipped_position: usize,
    pub skipped_no_seasons: usize,
    /// The rows written (or to be written) back to the store.
    pub records: Vec<ScoreRecord>,
}

/// A player is in scope when they have at least one college season and were
/// either drafted in or after `min_year` or first played professionally in or
/// after `min_year`.
pub fn is_eligible(
    player: &PlayerProfile,
    has_seasons: bool,
    first_pro_season: Option<u16>,
    min_year: u16,
) -> bool {
    if !has_seasons {
        return false;
    }
    let drafted_recently = player.draft_cap.is_some()
        && player.draft_year.is_some_and(|year| year >= min_year);
    let turned_pro_recently = first_pro_season.is_some_and(|year| year >= min_year);
    drafted_recently || turned_pro_recently
}

/// `None` accepts every player. With a filter, only players whose stored
/// position parses to one of the listed positions pass.
fn passes_position_filter(player: &PlayerProfile, positions: Option<&[Position]>) -> bool {
    match positions {
        None => true,
        Some(wanted) => player
            .parsed_position()
            .is_some_and(|pos| wanted.contains(&pos)),
    }
}

/// Group seasons by player, each group in year order.
fn seasons_by_player(seasons: &[SeasonRecord]) -> HashMap<&str, Vec<&SeasonRecord>> {
    let mut grouped: HashMap<&str, Vec<&SeasonRecord>> = HashMap::new();
    for season in seasons {
        grouped
            .entry(season.player_id.as_str())
            .or_default()
            .push(season);
    }
    for group in grouped.values_mut() {
        group.sort_by_key(|s| s.year);
    }
    grouped
}

/// Score every eligible player. Pure: reads only its arguments.
pub fn compute_scores(
    players: &[PlayerProfile],
    seasons: &[SeasonRecord],
    first_pro_seasons: &HashMap<String, u16>,
    config: &Config,
    positions: Option<&[Position]>,
) -> BatchReport {
    let ctx = ScoringContext::build(players, seasons);
    let grouped = seasons_by_player(seasons);
    let empty: Vec<&SeasonRecord> = Vec::new();

    let mut report = BatchReport {
        loaded: players.len(),
        ..Default::default()
    };

    for player in players {
        let player_seasons = grouped.get(player.player_id.as_str()).unwrap_or(&empty);
        let first_pro = first_pro_seasons.get(&player.player_id).copied();

        if !passes_position_filter(player, positions)
            || !is_eligible(
                player,
                !player_seasons.is_empty(),
                first_pro,
                config.eligibility.min_year,
            )
        {
            continue;
        }
        report.eligible += 1;

        match score_player(player, player_seasons.iter().copied(), &ctx, config) {
            Ok(breakdown) => {
                debug!(
                    "{} ({}): production={:.2} size={:.2} draft={:.2} cupps={:.2}",
                    player.player_id,
                    player.position,
                    breakdown.production,
                    breakdown.size,
                    breakdown.draft_weight,
                    breakdown.cupps
                );
                report.records.push(breakdown.into_record(&player.player_id));
                report.scored += 1;
            }
            Err(reason) => {
                warn!("skipping {}: {}", player.player_id, reason);
                match reason {
                    SkipReason::UnsupportedPosition(_) => report.skipped_position += 1,
                    SkipReason::NoValidSeasons => report.skipped_no_seasons += 1,
                }
            }
        }
    }

    report
}

/// Read everything from `store`, score, and write all scores in one batch.
///
/// Any storage error aborts the run; nothing is written unless every score
/// was computed.
pub fn run_batch<S: ProspectStore + ?Sized>(
    store: &S,
    config: &Config,
    positions: Option<&[Position]>,
) -> Result<BatchReport> {
    let players = store.load_players().context("failed to load players")?;
    let seasons = store.load_seasons().context("failed to load college seasons")?;
    let first_pro = store
        .first_pro_seasons()
        .context("failed to load professional seasons")?;

    let filter_label = positions
        .map(|ps| {
            ps.iter()
                .map(Position::code)
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_else(|| "all".to_string());
    info!(
        "Scoring batch: {} players, {} seasons, positions={}",
        players.len(),
        seasons.len(),
        filter_label
    );

    let report = compute_scores(&players, &seasons, &first_pro, config, positions);

    store
        .write_scores(&report.records)
        .context("failed to write scores")?;

    info!(
        "Scoring batch complete: {} eligible, {} scored, {} skipped (position), {} skipped (no valid seasons), {} written",
        report.eligible,
        report.scored,
        report.skipped_position,
        report.skipped_no_seasons,
        report.records.len()
    );

    Ok(report)
}
