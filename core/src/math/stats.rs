pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    /// Rounds to `decimals` places with ties going away from zero.
    pub fn round_to(value: f64, decimals: u32) -> f64 {
        let factor = 10f64.powi(decimals as i32);
        (value * factor).round() / factor
    }

    /// Ratio rounded to two decimals, zero when the denominator is empty.
    pub fn per_unit(total: usize, units: usize) -> f64 {
        if units == 0 {
            return 0.0;
        }
        Self::round_to(total as f64 / units as f64, 2)
    }
}
