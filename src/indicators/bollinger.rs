// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ).  σ is the population standard deviation
// (divide by `period`, not `period - 1`) of the same trailing window.

use super::sma::rolling;

/// One row of Bollinger Bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBand {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Calculate Bollinger Bands for every row of `closes`.
///
/// Element `i` is `Some` once a full window of `period` closes ends at `i`:
/// - `upper`  = SMA + `num_std` * σ
/// - `middle` = SMA
/// - `lower`  = SMA - `num_std` * σ
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> Vec<Option<BollingerBand>> {
    let middles = rolling(closes, period, |w| w.iter().sum::<f64>() / w.len() as f64);
    let deviations = rolling(closes, period, population_std_dev);

    middles
        .into_iter()
        .zip(deviations)
        .map(|(middle, std_dev)| {
            let middle = middle?;
            let std_dev = std_dev?;
            Some(BollingerBand {
                upper: middle + num_std * std_dev,
                middle,
                lower: middle - num_std * std_dev,
            })
        })
        .collect()
}

fn population_std_dev(window: &[f64]) -> f64 {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let bands = calculate_bollinger(&closes, 20, 2.0);
        assert!(bands[..19].iter().all(Option::is_none));
        let bb = bands[19].unwrap();
        assert!(bb.upper > bb.middle);
        assert!(bb.lower < bb.middle);
        assert!((bb.middle - 10.5).abs() < 1e-12);
    }

    #[test]
    fn bollinger_uses_population_std_dev() {
        // 1..=20: population variance = (n^2 - 1) / 12 = 399 / 12
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let bb = calculate_bollinger(&closes, 20, 2.0)[19].unwrap();
        let sigma = (399.0_f64 / 12.0).sqrt();
        assert!((bb.upper - (10.5 + 2.0 * sigma)).abs() < 1e-10);
        assert!((bb.lower - (10.5 - 2.0 * sigma)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_insufficient_data() {
        let closes = vec![1.0, 2.0, 3.0];
        assert!(calculate_bollinger(&closes, 20, 2.0).iter().all(Option::is_none));
    }

    #[test]
    fn bollinger_flat() {
        let closes = vec![100.0; 20];
        let bb = calculate_bollinger(&closes, 20, 2.0)[19].unwrap();
        assert!((bb.upper - 100.0).abs() < 1e-10);
        assert!((bb.lower - 100.0).abs() < 1e-10);
    }
}
