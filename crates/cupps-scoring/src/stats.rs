// Small numeric helpers shared by the calculators.

/// Scale `value` onto a 0-100 range where `max_expected` maps to 100.
///
/// Values at or above `max_expected` are capped at 100. The lower end is not
/// floored; callers that need a floor apply it themselves.
pub fn scale_to_100(value: f64, max_expected: f64) -> f64 {
    (value / max_expected * 100.0).min(100.0)
}

/// 75th percentile of `values` using linear interpolation between closest
/// ranks. Returns `default` for an empty sample.
pub fn percentile_75(values: &[f64], default: f64) -> f64 {
    percentile(values, 0.75).unwrap_or(default)
}

/// Linear-interpolation percentile, `q` in [0, 1]. `None` for an empty sample.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Running mean that tolerates an empty input.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn push_opt(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.push(v);
        }
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}
