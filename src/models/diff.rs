//! Ordinary and seasonal differencing with their inverse transforms.

/// Difference a series `d` times at lag 1.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Difference a series `d` times at the seasonal lag `period`.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return Vec::new();
        }
        result = (period..result.len())
            .map(|t| result[t] - result[t - period])
            .collect();
    }
    result
}

/// Undo lag-1 differencing on forecast steps, anchored on the history the
/// differences continue from.
pub fn integrate(forecast: &[f64], history: &[f64], d: usize) -> Vec<f64> {
    let mut result = forecast.to_vec();
    for level in (0..d).rev() {
        let base = difference(history, level);
        let mut acc = base.last().copied().unwrap_or(0.0);
        for value in &mut result {
            acc += *value;
            *value = acc;
        }
    }
    result
}

/// Undo seasonal differencing on forecast steps.
///
/// Each forecast step is added to the value one seasonal period earlier,
/// taken from the tail of the partially-differenced history for the first
/// `period` steps and from the already-integrated forecast afterwards.
pub fn seasonal_integrate(forecast: &[f64], history: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return forecast.to_vec();
    }
    let mut result = forecast.to_vec();
    for level in (0..d).rev() {
        let base = seasonal_difference(history, level, period);
        let mut integrated: Vec<f64> = Vec::with_capacity(result.len());
        for (t, &value) in result.iter().enumerate() {
            let prior = if t < period {
                base.len()
                    .checked_sub(period - t)
                    .and_then(|i| base.get(i))
                    .copied()
                    .unwrap_or(0.0)
            } else {
                integrated[t - period]
            };
            integrated.push(value + prior);
        }
        result = integrated;
    }
    result
}
