// End-to-end batch tests.
//
// Each test seeds an in-memory SQLite store through the public upsert API,
// runs the batch driver against it, and checks both the returned report and
// what was persisted onto the player rows.

use cupps_core::config::Config;
use cupps_core::db::{Database, ProspectStore};
use cupps_core::model::{PlayerProfile, Position, SeasonRecord, TeamYear};
use cupps_scoring::run_batch;

// ===========================================================================
// Test helpers
// ===========================================================================

const EPS: f64 = 1e-6;

fn store() -> Database {
    Database::open(":memory:").expect("in-memory db")
}

fn drafted(id: &str, pos: &str, pick: u32, year: u16) -> PlayerProfile {
    PlayerProfile {
        name: format!("Player {id}"),
        height: Some(73.0),
        weight: Some(215.0),
        draft_cap: Some(pick),
        draft_year: Some(year),
        ..PlayerProfile::new(id, pos)
    }
}

fn receiving_season(id: &str, year: u16) -> SeasonRecord {
    SeasonRecord {
        games_played: Some(12),
        receptions: Some(55),
        receiving_yards: Some(800.0),
        scrimmage_yards_per_game: Some(66.0),
        fantasy_points_per_game: Some(15.0),
        team_yardage_market_share: Some(0.25),
        season_age: Some(20),
        ..SeasonRecord::new(id, year)
    }
}

fn seed(db: &Database, players: &[PlayerProfile], seasons: &[SeasonRecord]) {
    for p in players {
        db.upsert_player(p).unwrap();
    }
    for s in seasons {
        db.upsert_season(s).unwrap();
    }
}

fn score_of(db: &Database, player_id: &str) -> Option<(f64, f64, f64)> {
    db.load_scores(None, 1000)
        .unwrap()
        .into_iter()
        .find(|r| r.player_id == player_id)
        .map(|r| (r.production_score, r.size_score, r.cupps_score))
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[test]
fn young_first_round_back_with_imputed_grades() {
    let db = store();
    let rb = PlayerProfile {
        height: Some(70.0),
        weight: Some(215.0),
        ..drafted("rb1", "RB", 5, 2020)
    };
    let season = SeasonRecord {
        games_played: Some(12),
        rush_attempts: Some(250),
        scrimmage_yards_per_game: Some(120.0),
        fantasy_points_per_game: Some(18.0),
        season_age: Some(19),
        ..SeasonRecord::new("rb1", 2019)
    };
    seed(&db, &[rb], &[season]);

    let report = run_batch(&db, &Config::default(), None).unwrap();
    assert_eq!(report.scored, 1);

    let (production, size, cupps) = score_of(&db, "rb1").expect("rb1 scored");

    // Weighted by the 19-year-old RB multiplier (1.30) with default grades:
    // 2*156 + 10*23.4 + 8*23.4 + 1.5*60*3 + 30*1.5 + 0.1/0.002 = 1098.2
    assert!((production - 1098.2 / 2800.0 * 100.0).abs() < EPS);
    // No athletic score anywhere: elite bucket default 5.0, full frame marks.
    assert!((size - 60.0).abs() < EPS);
    // Pick 5 carries full draft weight.
    let expected = (2.25 * production + size + 2.75 * 100.0) / 600.0 * 100.0;
    assert!((cupps - expected).abs() < EPS);
    assert!(production > 0.0 && size > 0.0 && cupps > 0.0);
}

#[test]
fn undrafted_receiver_without_games_is_not_written() {
    let db = store();
    let wr = PlayerProfile::new("wr_none", "WR");
    let seasons: Vec<SeasonRecord> = [2018, 2019]
        .into_iter()
        .map(|year| SeasonRecord {
            games_played: Some(0),
            ..receiving_season("wr_none", year)
        })
        .collect();
    seed(&db, &[wr], &seasons);
    db.record_pro_season("wr_none", 2020).unwrap();

    let report = run_batch(&db, &Config::default(), None).unwrap();
    assert_eq!(report.eligible, 1);
    assert_eq!(report.skipped_no_seasons, 1);
    assert!(report.records.is_empty());
    assert!(score_of(&db, "wr_none").is_none());
}

#[test]
fn tight_end_without_measurables_still_scores() {
    let db = store();
    let te = PlayerProfile {
        height: None,
        weight: None,
        ..drafted("te1", "TE", 45, 2021)
    };
    seed(
        &db,
        &[te],
        &[receiving_season("te1", 2019), receiving_season("te1", 2020)],
    );

    run_batch(&db, &Config::default(), None).unwrap();
    let (production, size, cupps) = score_of(&db, "te1").expect("te1 scored");
    assert_eq!(size, 0.0);
    assert!(production > 0.0);
    assert!(cupps > 0.0);
}

#[test]
fn rerunning_on_unchanged_store_is_stable() {
    let db = store();
    let players = vec![
        drafted("wr1", "WR", 12, 2019),
        drafted("wr2", "WR", 140, 2022),
        drafted("te1", "TE", 70, 2018),
        drafted("rb1", "RB", 33, 2017),
    ];
    let mut seasons = Vec::new();
    for p in &players {
        seasons.push(receiving_season(&p.player_id, 2016));
        let mut second = receiving_season(&p.player_id, 2017);
        second.rush_attempts = Some(180);
        second.rush_yards = Some(950.0);
        second.run_grade = Some(74.0);
        seasons.push(second);
    }
    seed(&db, &players, &seasons);

    let first = run_batch(&db, &Config::default(), None).unwrap();
    let stored_first = db.load_scores(None, 100).unwrap();
    let second = run_batch(&db, &Config::default(), None).unwrap();
    let stored_second = db.load_scores(None, 100).unwrap();

    assert_eq!(first, second);
    assert_eq!(stored_first, stored_second);
    assert_eq!(stored_first.len(), 4);
    for row in &stored_first {
        assert!((0.0..=100.0).contains(&row.cupps_score));
    }
}

#[test]
fn position_filter_only_touches_requested_positions() {
    let db = store();
    let players = vec![drafted("wr1", "WR", 20, 2020), drafted("te1", "TE", 20, 2020)];
    seed(
        &db,
        &players,
        &[receiving_season("wr1", 2019), receiving_season("te1", 2019)],
    );

    let report = run_batch(&db, &Config::default(), Some(&[Position::TightEnd][..])).unwrap();
    assert_eq!(report.eligible, 1);
    assert!(score_of(&db, "te1").is_some());
    assert!(score_of(&db, "wr1").is_none());

    let ranked_te = db.load_scores(Some("TE"), 10).unwrap();
    assert_eq!(ranked_te.len(), 1);
}

#[test]
fn eligibility_uses_draft_year_or_first_pro_season() {
    let db = store();
    let players = vec![
        drafted("recent", "WR", 30, 2014),
        drafted("veteran", "WR", 30, 2011),
        drafted("late_bloomer", "WR", 30, 2011),
        PlayerProfile::new("undrafted", "WR"),
        PlayerProfile::new("no_college", "WR"),
    ];
    let seasons = vec![
        receiving_season("recent", 2013),
        receiving_season("veteran", 2010),
        receiving_season("late_bloomer", 2010),
        receiving_season("undrafted", 2017),
    ];
    seed(&db, &players, &seasons);
    db.record_pro_season("veteran", 2011).unwrap();
    db.record_pro_season("late_bloomer", 2013).unwrap();
    db.record_pro_season("late_bloomer", 2012).unwrap();
    db.record_pro_season("undrafted", 2018).unwrap();
    db.record_pro_season("no_college", 2018).unwrap();

    let report = run_batch(&db, &Config::default(), None).unwrap();
    let mut scored: Vec<&str> = report.records.iter().map(|r| r.player_id.as_str()).collect();
    scored.sort_unstable();
    assert_eq!(scored, vec!["recent", "undrafted"]);
    assert_eq!(report.loaded, 5);
}

#[test]
fn unsupported_positions_are_skipped_and_not_written() {
    let db = store();
    let players = vec![drafted("qb1", "QB", 3, 2020), drafted("wr1", "WR", 3, 2020)];
    seed(
        &db,
        &players,
        &[receiving_season("qb1", 2019), receiving_season("wr1", 2019)],
    );

    let report = run_batch(&db, &Config::default(), None).unwrap();
    assert_eq!(report.skipped_position, 1);
    assert_eq!(report.scored, 1);
    assert!(score_of(&db, "qb1").is_none());
}

#[test]
fn schedule_strength_is_joined_from_team_years() {
    let db = store();
    let players = vec![drafted("easy", "WR", 50, 2020), drafted("hard", "WR", 50, 2020)];
    let mut easy = receiving_season("easy", 2019);
    easy.team_id = Some("SMALL".into());
    let mut hard = receiving_season("hard", 2019);
    hard.team_id = Some("POWER".into());
    seed(&db, &players, &[easy, hard]);
    db.upsert_team_year(&TeamYear {
        team_id: "SMALL".into(),
        year: 2019,
        strength_of_schedule: Some(-6.0),
        simple_rating: Some(-10.0),
    })
    .unwrap();
    db.upsert_team_year(&TeamYear {
        team_id: "POWER".into(),
        year: 2019,
        strength_of_schedule: Some(9.0),
        simple_rating: Some(15.0),
    })
    .unwrap();

    let loaded = db.load_seasons().unwrap();
    assert!(loaded.iter().all(|s| s.team_strength_of_schedule.is_some()));

    run_batch(&db, &Config::default(), None).unwrap();
    let (easy_prod, _, _) = score_of(&db, "easy").unwrap();
    let (hard_prod, _, _) = score_of(&db, "hard").unwrap();
    assert!(hard_prod > easy_prod);
}

#[test]
fn global_averages_fill_missing_grades_from_peers() {
    let db = store();
    // A graded peer lifts the WR reception-grade fallback above the default.
    let mut peer_season = receiving_season("peer", 2019);
    peer_season.reception_grade = Some(90.0);
    peer_season.yards_per_route_run = Some(3.0);
    peer_season.targets_per_route_run = Some(0.3);
    let players = vec![drafted("peer", "WR", 80, 2020), drafted("blank", "WR", 80, 2020)];
    seed(&db, &players, &[peer_season, receiving_season("blank", 2019)]);

    run_batch(&db, &Config::default(), None).unwrap();
    let (peer, _, _) = score_of(&db, "peer").unwrap();
    let (blank, _, _) = score_of(&db, "blank").unwrap();
    // Identical inputs once the blank player's grades are imputed from the peer.
    assert!((peer - blank).abs() < EPS);
}
