//! Determinism checks for generated audio.
//!
//! Saved files get fresh uuids and are written in completion order, so
//! determinism is checked on content: each item's mix and ground truth PCM,
//! hashed in index order.

use std::fmt;
use std::fs;

use misophonia_backend_audio::wav::{extract_pcm_data, waveform_to_pcm};
use misophonia_backend_audio::DEFAULT_BITS_PER_SAMPLE;
use misophonia_dataset::DatasetSplitView;
use misophonia_spec::AudioData;

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical output.
    pub is_deterministic: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// Size of the output in bytes.
    pub output_size: usize,
    /// BLAKE3 hash of the first run's output.
    pub hash: String,
    /// If non-deterministic, the first difference found.
    pub diff_info: Option<DiffInfo>,
}

/// The first byte difference found between runs.
#[derive(Debug, Clone)]
pub struct DiffInfo {
    /// Byte offset of the difference.
    pub offset: usize,
    /// Value from the first run, if it has a byte there.
    pub expected: Option<u8>,
    /// Value from the differing run, if it has a byte there.
    pub actual: Option<u8>,
    /// Which run (0-indexed) differed.
    pub run_index: usize,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |b: Option<u8>| b.map_or_else(|| "end".to_string(), |b| format!("0x{:02X}", b));
        write!(
            f,
            "Difference at byte {}: expected {}, got {} (run {})",
            self.offset,
            show(self.expected),
            show(self.actual),
            self.run_index
        )
    }
}

impl DeterminismResult {
    /// Panic with a detailed message if not deterministic.
    pub fn assert_deterministic(&self) {
        if let Some(diff) = &self.diff_info {
            panic!(
                "Non-deterministic output detected!\n\
                 Runs: {}\n\
                 Output size: {} bytes\n\
                 Hash: {}\n\
                 {}",
                self.runs, self.output_size, self.hash, diff
            );
        }
    }
}

/// Run generation N times and verify all outputs are identical.
///
/// # Arguments
///
/// * `generate_fn` - A function that generates output data
/// * `runs` - Number of times to run the generation (minimum 2)
pub fn verify_determinism<F, O>(generate_fn: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = generate_fn();
    let reference = reference.as_ref();
    let hash = compute_hash(reference);

    for run_index in 1..runs {
        let output = generate_fn();
        if let Some(diff) = first_difference(reference, output.as_ref(), run_index) {
            return DeterminismResult {
                is_deterministic: false,
                runs,
                output_size: reference.len(),
                hash,
                diff_info: Some(diff),
            };
        }
    }

    DeterminismResult {
        is_deterministic: true,
        runs,
        output_size: reference.len(),
        hash,
        diff_info: None,
    }
}

fn first_difference(expected: &[u8], actual: &[u8], run_index: usize) -> Option<DiffInfo> {
    let offset = expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))?;
    Some(DiffInfo {
        offset,
        expected: expected.get(offset).copied(),
        actual: actual.get(offset).copied(),
        run_index,
    })
}

/// Compare hashes from several runs.
pub fn verify_hash_determinism(hashes: &[String]) -> bool {
    hashes.windows(2).all(|w| w[0] == w[1])
}

/// Compute BLAKE3 hash of data.
pub fn compute_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Panics unless `generate_fn` returns the same bytes on every run.
pub fn assert_deterministic<F>(runs: usize, generate_fn: F)
where
    F: Fn() -> Vec<u8>,
{
    verify_determinism(&generate_fn, runs).assert_deterministic();
}

/// PCM bytes of one audio field, whether in memory or on disk.
fn audio_bytes(audio: &AudioData) -> Vec<u8> {
    match audio {
        AudioData::Waveform(waveform) => {
            waveform_to_pcm(waveform, DEFAULT_BITS_PER_SAMPLE).expect("Failed to encode PCM")
        }
        AudioData::Path(path) => {
            let data = fs::read(path).expect("Failed to read audio file");
            extract_pcm_data(&data)
                .expect("Audio file has no PCM data")
                .to_vec()
        }
    }
}

/// Content bytes of a split: per item in index order, the trigger flag,
/// mix PCM, and ground truth PCM.
pub fn split_bytes(view: &DatasetSplitView) -> Vec<u8> {
    let mut out = Vec::new();
    for item in view.iter() {
        let item = item.expect("Failed to generate item");
        out.push(u8::from(item.is_trigger()));
        out.extend(audio_bytes(item.mix()));
        if let Some(ground_truth) = item.ground_truth() {
            out.extend(audio_bytes(ground_truth));
        }
    }
    out
}

/// BLAKE3 hash of [`split_bytes`].
pub fn hash_split(view: &DatasetSplitView) -> String {
    compute_hash(&split_bytes(view))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_runs_pass() {
        let result = verify_determinism(|| vec![1u8, 2, 3], 3);
        assert!(result.is_deterministic);
        assert_eq!(result.output_size, 3);
        assert_eq!(result.hash, compute_hash(&[1, 2, 3]));
    }

    #[test]
    fn test_difference_is_located() {
        let counter = std::cell::Cell::new(0u8);
        let result = verify_determinism(
            || {
                counter.set(counter.get() + 1);
                vec![0, counter.get()]
            },
            2,
        );
        assert!(!result.is_deterministic);
        let diff = result.diff_info.unwrap();
        assert_eq!(diff.offset, 1);
        assert_eq!(diff.expected, Some(1));
        assert_eq!(diff.actual, Some(2));
    }

    #[test]
    fn test_length_difference_is_located() {
        let diff = first_difference(&[1, 2], &[1, 2, 3], 1).unwrap();
        assert_eq!(diff.offset, 2);
        assert_eq!(diff.expected, None);
        assert_eq!(diff.actual, Some(3));
        assert!(first_difference(&[1], &[1], 1).is_none());
    }

    #[test]
    fn test_hash_comparison() {
        assert!(verify_hash_determinism(&[]));
        assert!(verify_hash_determinism(&["a".into(), "a".into()]));
        assert!(!verify_hash_determinism(&["a".into(), "b".into()]));
    }
}
