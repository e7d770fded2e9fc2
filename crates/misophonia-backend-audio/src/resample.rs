//! Sample rate conversion using rubato.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::debug;

use crate::error::{AudioError, AudioResult};

/// Resamples a mono signal.
///
/// The output length is `round(len * to / from)`, so a given input always
/// yields the same number of samples.
///
/// # Arguments
/// * `samples` - Input samples
/// * `from` - Input sample rate in Hz
/// * `to` - Output sample rate in Hz
pub fn resample_mono(samples: &[f64], from: u32, to: u32) -> AudioResult<Vec<f64>> {
    if from == 0 {
        return Err(AudioError::InvalidSampleRate { rate: from });
    }
    if to == 0 {
        return Err(AudioError::InvalidSampleRate { rate: to });
    }
    if from == to || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = to as f64 / from as f64;
    let expected = (samples.len() as f64 * ratio).round() as usize;
    debug!(
        "Resampling {} samples from {}Hz to {}Hz",
        samples.len(),
        from,
        to
    );

    let mut resampler = FastFixedIn::<f64>::new(
        ratio,
        1.0,
        PolynomialDegree::Septic,
        samples.len(),
        1,
    )
    .map_err(|e| AudioError::Resample {
        message: format!("failed to create resampler: {}", e),
    })?;

    let mut output = resampler
        .process(&[samples], None)
        .map_err(|e| AudioError::Resample {
            message: e.to_string(),
        })?
        .into_iter()
        .next()
        .unwrap_or_default();

    output.resize(expected, 0.0);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_rate_is_copy() {
        let input = vec![0.1, 0.2, 0.3];
        assert_eq!(resample_mono(&input, 44100, 44100).unwrap(), input);
    }

    #[test]
    fn test_output_length_follows_ratio() {
        let input: Vec<f64> = (0..22050).map(|i| (i as f64 * 0.01).sin()).collect();
        let up = resample_mono(&input, 22050, 44100).unwrap();
        assert_eq!(up.len(), 44100);

        let down = resample_mono(&input, 44100, 16000).unwrap();
        assert_eq!(down.len(), 8000);
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(matches!(
            resample_mono(&[0.0], 0, 44100),
            Err(AudioError::InvalidSampleRate { rate: 0 })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(resample_mono(&[], 22050, 44100).unwrap().is_empty());
    }
}
