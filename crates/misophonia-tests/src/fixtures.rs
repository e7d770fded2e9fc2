//! Test fixture utilities for creating synthetic source datasets.

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use misophonia_backend_audio::rng::create_rng;
use misophonia_spec::{LabelType, SourceDataItem, Split};
use rand::Rng;
use serde_json::json;
use tempfile::TempDir;

/// Manifest file name inside the fixture root.
pub const MANIFEST_FILE: &str = "manifest.jsonl";

/// Source configuration file name inside the fixture root.
pub const CONFIG_FILE: &str = "sources.json";

/// Signal written into a synthetic WAV file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// Sine tone at the given frequency in Hz.
    Sine(f64),
    /// Uniform white noise from the given seed.
    Noise(u32),
    /// All zeros.
    Silence,
}

impl Signal {
    fn render(&self, frames: usize, sample_rate: u32, amplitude: f64) -> Vec<f64> {
        match *self {
            Signal::Sine(freq) => (0..frames)
                .map(|i| {
                    let t = i as f64 / sample_rate as f64;
                    amplitude * (2.0 * std::f64::consts::PI * freq * t).sin()
                })
                .collect(),
            Signal::Noise(seed) => {
                let mut rng = create_rng(seed);
                (0..frames)
                    .map(|_| amplitude * rng.gen_range(-1.0..=1.0))
                    .collect()
            }
            Signal::Silence => vec![0.0; frames],
        }
    }
}

/// A source dataset of synthetic WAV files in a temporary directory.
///
/// Files go under `audio/`; [`write_manifest`](Self::write_manifest) and
/// [`write_config`](Self::write_config) make the fixture loadable through a
/// source configuration.
pub struct SyntheticSourceFixture {
    pub root: TempDir,
    name: String,
    sample_rate: u32,
    items: Vec<SourceDataItem>,
}

impl SyntheticSourceFixture {
    /// Create a new empty fixture whose items belong to source dataset `name`.
    pub fn new(name: &str) -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(root.path().join("audio")).expect("Failed to create audio dir");
        Self {
            root,
            name: name.to_string(),
            sample_rate: 44100,
            items: Vec::new(),
        }
    }

    /// The pool from the small worked example: triggers A and B, controls
    /// C and D, background E, all in `split`.
    pub fn small_pool(split: Split) -> Self {
        let mut fixture = Self::new("synth");
        fixture.add_named(split, LabelType::Trigger, "chewing", "A", Signal::Sine(330.0), 0.10);
        fixture.add_named(split, LabelType::Trigger, "slurping", "B", Signal::Noise(1), 0.08);
        fixture.add_named(split, LabelType::Control, "birds", "C", Signal::Sine(880.0), 0.12);
        fixture.add_named(split, LabelType::Control, "rain", "D", Signal::Noise(2), 0.06);
        fixture.add_named(split, LabelType::Background, "cafe", "E", Signal::Noise(3), 0.20);
        fixture
    }

    /// Sample rate of files written from now on.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Get the fixture root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Items added so far.
    pub fn items(&self) -> &[SourceDataItem] {
        &self.items
    }

    /// Add a sound named after its label and position.
    ///
    /// # Arguments
    /// * `split` - Split of the item
    /// * `label_type` - Trigger, control, or background
    /// * `label` - Category label
    /// * `signal` - Content of the file
    /// * `seconds` - Duration
    pub fn add_sound(
        &mut self,
        split: Split,
        label_type: LabelType,
        label: &str,
        signal: Signal,
        seconds: f64,
    ) -> PathBuf {
        let stem = format!("{}_{}", label, self.items.len());
        self.add_named(split, label_type, label, &stem, signal, seconds)
    }

    /// Add a trigger sound marked as validated by a study.
    pub fn add_validated_trigger(
        &mut self,
        split: Split,
        label: &str,
        signal: Signal,
        seconds: f64,
    ) -> PathBuf {
        let path = self.add_sound(split, LabelType::Trigger, label, signal, seconds);
        if let Some(item) = self.items.last_mut() {
            item.validated_by = Some(vec!["fixture study".to_string()]);
        }
        path
    }

    fn add_named(
        &mut self,
        split: Split,
        label_type: LabelType,
        label: &str,
        stem: &str,
        signal: Signal,
        seconds: f64,
    ) -> PathBuf {
        let relative = PathBuf::from("audio").join(format!("{}.wav", stem));
        let path = self.path().join(&relative);
        let frames = (seconds * self.sample_rate as f64).round() as usize;
        write_mono_wav(&path, &signal.render(frames, self.sample_rate, 0.5), self.sample_rate);

        let item = SourceDataItem::builder(split, self.name.as_str(), relative, label_type)
            .label(label)
            .build()
            .expect("Failed to build source item");
        self.items.push(item);
        path
    }

    /// Write all items as a JSON Lines manifest.
    pub fn write_manifest(&self) -> PathBuf {
        let path = self.path().join(MANIFEST_FILE);
        let lines: Vec<String> = self
            .items
            .iter()
            .map(|item| serde_json::to_string(item).expect("Failed to serialize item"))
            .collect();
        fs::write(&path, lines.join("\n") + "\n").expect("Failed to write manifest");
        path
    }

    /// Write the manifest and a source configuration pointing at it.
    pub fn write_config(&self) -> PathBuf {
        self.write_manifest();
        let config = json!({
            "sources": [
                { "kind": "manifest", "name": self.name, "path": MANIFEST_FILE }
            ]
        });
        let path = self.path().join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(&config).expect("Failed to serialize config"))
            .expect("Failed to write config");
        path
    }
}

/// Write 16-bit mono PCM.
pub fn write_mono_wav(path: &Path, samples: &[f64], sample_rate: u32) {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).expect("Failed to create WAV");
    for &s in samples {
        writer
            .write_sample((s.clamp(-1.0, 1.0) * 32767.0).round() as i16)
            .expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize WAV");
}

#[cfg(test)]
mod tests {
    use super::*;
    use misophonia_dataset::{ManifestSource, SourceConfig, SourceData};

    #[test]
    fn test_small_pool_is_loadable() {
        let fixture = SyntheticSourceFixture::small_pool(Split::Train);
        let manifest = fixture.write_manifest();
        let items = ManifestSource::new("synth", manifest).get_metadata().unwrap();
        assert_eq!(items.len(), 5);
        for item in &items {
            assert!(item.file_path.is_file(), "{} missing", item.file_path.display());
        }
        assert_eq!(items[0].stem(), "A");
    }

    #[test]
    fn test_config_points_at_manifest() {
        let mut fixture = SyntheticSourceFixture::new("synth").with_sample_rate(22050);
        fixture.add_validated_trigger(Split::Test, "chewing", Signal::Sine(200.0), 0.05);
        let config = SourceConfig::load(&fixture.write_config()).unwrap();
        assert_eq!(config.names(), vec!["synth"]);
        let sources = config.build(&[]).unwrap();
        let items = sources[0].get_metadata().unwrap();
        assert!(items[0].is_validated());

        let reader = hound::WavReader::open(&items[0].file_path).unwrap();
        assert_eq!(reader.spec().sample_rate, 22050);
        assert_eq!(reader.duration(), 1103);
    }
}
