// =============================================================================
// MACD (Moving Average Convergence Divergence)
// =============================================================================
//
//   macd   = EMA(fast) - EMA(slow)
//   signal = EMA(signal_period) of macd, seeded by the first defined macd
//   diff   = macd - signal
//
// `macd` is `None` for the first `slow - 1` rows; `signal` and `diff` need a
// further `signal_period - 1` macd values.

use super::ema::{calculate_ema, ema_of};

/// One row of MACD output.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MacdPoint {
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub diff: Option<f64>,
}

pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal_period: usize) -> Vec<MacdPoint> {
    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);

    let macd: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = ema_of(&macd, signal_period);

    macd.into_iter()
        .zip(signal)
        .map(|(macd, signal)| MacdPoint {
            macd,
            signal,
            diff: macd.zip(signal).map(|(m, s)| m - s),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn macd_warm_up_boundaries() {
        let points = calculate_macd(&wave(60), 12, 26, 9);
        assert_eq!(points.len(), 60);
        assert!(points[..25].iter().all(|p| p.macd.is_none()));
        assert!(points[25..].iter().all(|p| p.macd.is_some()));
        assert!(points[..33].iter().all(|p| p.signal.is_none() && p.diff.is_none()));
        assert!(points[33..].iter().all(|p| p.signal.is_some() && p.diff.is_some()));
    }

    #[test]
    fn macd_short_series_is_all_none() {
        let points = calculate_macd(&wave(25), 12, 26, 9);
        assert!(points.iter().all(|p| *p == MacdPoint::default()));
    }

    #[test]
    fn macd_matches_reference_recurrence() {
        let closes = wave(50);
        let points = calculate_macd(&closes, 12, 26, 9);

        let (af, as_, ag) = (2.0 / 13.0, 2.0 / 27.0, 2.0 / 10.0);
        let (mut ef, mut es) = (closes[0], closes[0]);
        let mut sig: Option<f64> = None;
        for (i, &c) in closes.iter().enumerate() {
            if i > 0 {
                ef += af * (c - ef);
                es += as_ * (c - es);
            }
            if i >= 25 {
                let m = ef - es;
                sig = Some(match sig {
                    None => m,
                    Some(s) => s + ag * (m - s),
                });
                let p = points[i];
                assert!((p.macd.unwrap() - m).abs() < 1e-10);
                if i >= 33 {
                    let s = sig.unwrap();
                    assert!((p.signal.unwrap() - s).abs() < 1e-10);
                    assert!((p.diff.unwrap() - (m - s)).abs() < 1e-10);
                }
            }
        }
    }

    #[test]
    fn rising_series_has_positive_macd() {
        let closes: Vec<f64> = (1..=80).map(|x| x as f64).collect();
        let last = *calculate_macd(&closes, 12, 26, 9).last().unwrap();
        assert!(last.macd.unwrap() > 0.0);
    }
}
