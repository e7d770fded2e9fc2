//! Loudness measurement and RMS normalization.

/// Tracks quieter than this RMS are left unscaled.
pub const RMS_EPSILON: f64 = 1e-6;

/// Root-mean-square amplitude of a signal. Empty signals have RMS 0.
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Scales every signal so its RMS equals the mean RMS of the whole set.
///
/// Signals with RMS below [`RMS_EPSILON`] are left untouched.
///
/// # Arguments
/// * `signals` - All tracks of one mix (foregrounds and backgrounds together)
///
/// # Returns
/// The target RMS that was applied
pub fn normalize_to_mean_rms(signals: &mut [Vec<f64>]) -> f64 {
    if signals.is_empty() {
        return 0.0;
    }
    let levels: Vec<f64> = signals.iter().map(|s| rms(s)).collect();
    let target = levels.iter().sum::<f64>() / levels.len() as f64;

    for (signal, level) in signals.iter_mut().zip(levels) {
        if level > RMS_EPSILON {
            let gain = target / level;
            for sample in signal.iter_mut() {
                *sample *= gain;
            }
        }
    }

    target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_of_constant() {
        assert!((rms(&[0.5; 100]) - 0.5).abs() < 1e-12);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn test_normalize_matches_mean_target() {
        let mut signals = vec![vec![0.1; 50], vec![0.3; 80], vec![-0.8; 20]];
        let target = normalize_to_mean_rms(&mut signals);
        assert!((target - 0.4).abs() < 1e-12);
        for signal in &signals {
            assert!((rms(signal) - target).abs() < 1e-9);
        }
    }

    #[test]
    fn test_silent_signal_untouched() {
        let mut signals = vec![vec![0.0; 10], vec![0.4; 10]];
        let target = normalize_to_mean_rms(&mut signals);
        assert!((target - 0.2).abs() < 1e-12);
        assert_eq!(signals[0], vec![0.0; 10]);
        assert!((rms(&signals[1]) - 0.2).abs() < 1e-12);
    }
}
