//! Generation and persistence through the public API, with in-memory sources.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use misophonia_backend_audio::{AudioError, AudioLoader, AudioResult, StereoPanRenderer};
use misophonia_dataset::{
    DatasetError, DatasetResult, GenerateOptions, GeneratedMisophoniaDataset, IfExists,
    PremadeMisophoniaDataset, SaveOptions, SourceData,
};
use misophonia_spec::{AudioData, LabelType, MisophoniaItem, SourceDataItem, Split};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct MemorySource {
    items: Vec<SourceDataItem>,
}

impl SourceData for MemorySource {
    fn name(&self) -> &str {
        "mem"
    }

    fn is_downloaded(&self) -> bool {
        true
    }

    fn download_data(&self) -> DatasetResult<()> {
        Ok(())
    }

    fn get_metadata(&self) -> DatasetResult<Vec<SourceDataItem>> {
        Ok(self.items.clone())
    }
}

struct MemoryLoader(HashMap<PathBuf, Vec<f64>>);

impl AudioLoader for MemoryLoader {
    fn load_mono(&self, path: &Path, _sample_rate: u32) -> AudioResult<Vec<f64>> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| AudioError::decode(path.display().to_string(), "not found"))
    }
}

fn tone(len: usize, freq: f64, amp: f64) -> Vec<f64> {
    (0..len)
        .map(|i| amp * (2.0 * std::f64::consts::PI * freq * i as f64 / 44100.0).sin())
        .collect()
}

/// Triggers A, B; controls C, D; background E; plus a val-split trigger.
fn dataset() -> GeneratedMisophoniaDataset {
    let specs = [
        ("A", LabelType::Trigger, "chewing", Split::Train, 400),
        ("B", LabelType::Trigger, "sniffing", Split::Train, 300),
        ("C", LabelType::Control, "birds", Split::Train, 350),
        ("D", LabelType::Control, "rain", Split::Train, 500),
        ("E", LabelType::Background, "cafe", Split::Train, 600),
        ("V", LabelType::Trigger, "chewing", Split::Val, 200),
    ];
    let mut items = Vec::new();
    let mut audio = HashMap::new();
    for (i, (name, label_type, label, split, len)) in specs.into_iter().enumerate() {
        let path = PathBuf::from(format!("{}.wav", name));
        audio.insert(path.clone(), tone(len, 220.0 * (i + 1) as f64, 0.3));
        items.push(
            SourceDataItem::builder(split, "mem", path, label_type)
                .label(label)
                .build()
                .unwrap(),
        );
    }
    let mut dataset = GeneratedMisophoniaDataset::new(vec![Box::new(MemorySource { items })])
        .with_loader(Arc::new(MemoryLoader(audio)))
        .with_renderer(Arc::new(StereoPanRenderer));
    dataset.prepare().unwrap();
    dataset
}

fn example_options() -> GenerateOptions {
    GenerateOptions::new(4)
        .with_foregrounds(1, 1)
        .with_backgrounds(1, 1)
        .with_ratio(0.5)
        .with_seed(1)
}

fn stem(item: &MisophoniaItem, fg: bool) -> String {
    let tracks = if fg { item.foregrounds() } else { item.backgrounds() };
    tracks[0].source_item.stem()
}

#[test]
fn test_small_pool_example() {
    let view = dataset().get_split(Split::Train, &example_options()).unwrap();
    assert_eq!(view.len(), 4);

    for item in view.iter() {
        let item = item.unwrap();
        assert_eq!(item.foregrounds().len(), 1);
        assert_eq!(item.backgrounds().len(), 1);
        assert_eq!(stem(&item, false), "E");
        let fg = stem(&item, true);
        if item.is_trigger() {
            assert!(fg == "A" || fg == "B", "trigger item with foreground {}", fg);
            assert!(item.ground_truth().is_some());
        } else {
            assert!(fg == "C" || fg == "D", "control item with foreground {}", fg);
            assert!(item.ground_truth().is_none());
        }
        let mix = item.mix().as_waveform().unwrap();
        assert_eq!(mix.shape(), (2, item.length()));
    }
}

#[test]
fn test_generation_is_repeatable() {
    let first = dataset().get_split(Split::Train, &example_options()).unwrap();
    let second = dataset().get_split(Split::Train, &example_options()).unwrap();
    for i in 0..4 {
        let a = first.get(i).unwrap();
        let b = second.get(i).unwrap();
        assert_eq!(a.is_trigger(), b.is_trigger());
        assert_eq!(a.foregrounds(), b.foregrounds());
        assert_eq!(a.global_mixing_params(), b.global_mixing_params());
        assert_eq!(a.mix(), b.mix());
    }
    // Out-of-order access gives the same item.
    assert_eq!(first.get(3).unwrap(), first.get(-1).unwrap());
}

#[test]
fn test_get_split_requires_prepare() {
    let unprepared = GeneratedMisophoniaDataset::new(Vec::new());
    assert!(matches!(
        unprepared.get_split(Split::Train, &GenerateOptions::new(1)),
        Err(DatasetError::NotPrepared)
    ));
}

#[test]
fn test_val_split_without_background_is_rejected() {
    let err = dataset()
        .get_split(Split::Val, &GenerateOptions::new(2))
        .unwrap_err();
    assert!(matches!(err, DatasetError::EmptyPool { pool: "background" }));
}

#[test]
fn test_save_generated_split_and_reload() {
    let tmp = TempDir::new().unwrap();
    let view = dataset()
        .get_split(Split::Train, &example_options().with_backgrounds(1, 1))
        .unwrap();
    let premade = PremadeMisophoniaDataset::new("example", tmp.path());
    let summary = premade
        .save_split(
            &view,
            IfExists::Error,
            &SaveOptions {
                workers: Some(3),
                show_progress: false,
            },
        )
        .unwrap();
    assert_eq!(summary.uuids.len(), 4);

    let loaded = premade.get_split(Split::Train).unwrap();
    assert_eq!(loaded.len(), 4);

    let originals: Vec<MisophoniaItem> = view.iter().collect::<DatasetResult<_>>().unwrap();
    let reloaded: Vec<MisophoniaItem> = loaded.iter().collect::<DatasetResult<_>>().unwrap();
    for original in &originals {
        let stored = reloaded
            .iter()
            .find(|s| {
                s.foregrounds() == original.foregrounds()
                    && s.backgrounds() == original.backgrounds()
            })
            .unwrap();
        assert_eq!(original.is_trigger(), stored.is_trigger());
        assert_eq!(original.foreground_categories(), stored.foreground_categories());
        assert_eq!(original.global_mixing_params(), stored.global_mixing_params());
        assert_eq!(original.length(), stored.length());
        assert!(matches!(stored.mix(), AudioData::Path(p) if p.is_file()));
    }

    let again = premade.save_split(&view, IfExists::Error, &SaveOptions::default());
    assert!(matches!(again, Err(DatasetError::DirectoryExists { .. })));
}
