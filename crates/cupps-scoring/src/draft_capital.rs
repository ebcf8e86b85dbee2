// Draft-capital weight: a position-specific piecewise-linear decay over the
// overall pick number.

use cupps_core::model::Position;

/// Shared tail for picks after 200.
fn late_round_weight(pick: f64) -> f64 {
    (10.0 - (pick - 200.0) * 0.4).max(5.0)
}

fn rb_weight(p: f64) -> f64 {
    match p {
        p if p <= 10.0 => 100.0,
        p if p <= 32.0 => 90.0 - (p - 10.0) * 1.5,
        p if p <= 64.0 => 85.0 - (p - 32.0) * 1.2,
        p if p <= 100.0 => 70.0 - (p - 60.0) * 1.0,
        p if p <= 150.0 => 40.0 - (p - 100.0) * 0.8,
        p if p <= 200.0 => 20.0 - (p - 150.0) * 0.6,
        p => late_round_weight(p),
    }
}

fn wr_weight(p: f64) -> f64 {
    match p {
        p if p <= 5.0 => 100.0,
        p if p <= 15.0 => 90.0 - (p - 10.0) * 1.5,
        p if p <= 32.0 => 85.0 - (p - 32.0) * 1.25,
        p if p <= 64.0 => 70.0 - (p - 60.0) * 1.0,
        p if p <= 100.0 => 40.0 - (p - 100.0) * 0.8,
        p if p <= 200.0 => 20.0 - (p - 150.0) * 0.6,
        p => late_round_weight(p),
    }
}

fn te_weight(p: f64) -> f64 {
    match p {
        p if p <= 15.0 => 100.0,
        p if p <= 32.0 => 95.0 - (p - 10.0) * 1.2,
        p if p <= 64.0 => 90.0 - (p - 32.0) * 0.75,
        p if p <= 100.0 => 80.0 - (p - 60.0) * 0.65,
        p if p <= 150.0 => 60.0 - (p - 100.0) * 0.55,
        p if p <= 200.0 => 40.0 - (p - 150.0) * 0.45,
        p => late_round_weight(p),
    }
}

/// Weight for a draft pick. Undrafted players get 0.
///
/// The tiers are not continuous at every breakpoint. WR picks 16-31 exceed
/// 100 and RB picks 184-200 go negative; the composite score bounds the final
/// result instead.
pub fn draft_capital_weight(draft_cap: Option<u32>, position: Position) -> f64 {
    let Some(pick) = draft_cap else {
        return 0.0;
    };
    let p = f64::from(pick);
    match position {
        Position::RunningBack => rb_weight(p),
        Position::WideReceiver => wr_weight(p),
        Position::TightEnd => te_weight(p),
    }
}
