use std::ops::Div;

/// Summary statistics of a sample
#[derive(Debug, Clone, Copy)]
pub struct Stat {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub num_points: f64,
}

impl Stat {
    /// population statistics, NaNs are skipped
    pub fn from_values(values: &[f64]) -> Stat {
        let mut stat = Stat::default();

        for &v in values.iter().filter(|v| !v.is_nan()) {
            stat.min = stat.min.min(v);
            stat.max = stat.max.max(v);
            stat.mean += v;
            stat.num_points += 1.;
        }
        if stat.num_points == 0. {
            return Stat::default();
        }
        stat.mean /= stat.num_points;

        stat.std_dev = values
            .iter()
            .filter(|v| !v.is_nan())
            .fold(0., |acc, v| acc + (v - stat.mean).powi(2))
            .div(stat.num_points)
            .sqrt();

        stat
    }
}

impl Default for Stat {
    fn default() -> Self {
        Self {
            min: f64::MAX,
            max: f64::MIN,
            mean: 0.,
            std_dev: 0.,
            num_points: 0.,
        }
    }
}

/// lower-middle element of the sorted values, None if empty
pub fn lower_median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    Some(values[(values.len() - 1) / 2])
}
