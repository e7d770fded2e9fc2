//! Experimental pairing on a saved test split built from WAV sources.

use misophonia_backend_audio::{RendererKind, WavFileLoader};
use misophonia_dataset::{
    add_experimental_pairs_to_dataset, DatasetError, DatasetResult, GenerateOptions,
    GeneratedMisophoniaDataset, IfExists, PairSummary, PremadeMisophoniaDataset, SaveOptions,
    SourceConfig,
};
use misophonia_spec::{LabelType, MisophoniaItem, Split};
use misophonia_tests::{Signal, SyntheticSourceFixture};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Chewing has a validated and a plain trigger; sniffing only a validated one.
fn fixture(controls: usize) -> SyntheticSourceFixture {
    let mut fixture = SyntheticSourceFixture::new("synth");
    fixture.add_validated_trigger(Split::Test, "chewing", Signal::Sine(300.0), 0.08);
    fixture.add_sound(Split::Test, LabelType::Trigger, "chewing", Signal::Noise(7), 0.07);
    fixture.add_validated_trigger(Split::Test, "sniffing", Signal::Noise(8), 0.09);
    for i in 0..controls {
        fixture.add_sound(
            Split::Test,
            LabelType::Control,
            "birds",
            Signal::Sine(600.0 + 100.0 * i as f64),
            0.05 + 0.02 * i as f64,
        );
    }
    fixture.add_sound(Split::Test, LabelType::Background, "cafe", Signal::Noise(9), 0.15);
    fixture
}

/// Saves every trigger once, then (appending) every control once.
fn saved(
    fixture: &SyntheticSourceFixture,
    controls: usize,
    tmp: &TempDir,
) -> PremadeMisophoniaDataset {
    let config = SourceConfig::load(&fixture.write_config()).unwrap();
    let mut generated = GeneratedMisophoniaDataset::new(config.build(&[]).unwrap());
    generated.prepare().unwrap();

    let dataset = PremadeMisophoniaDataset::new("pairs", tmp.path());
    let save = SaveOptions {
        workers: Some(2),
        show_progress: false,
    };
    let triggers = GenerateOptions::new(3)
        .with_ratio(1.0)
        .with_backgrounds(1, 1)
        .with_seed(2);
    let view = generated.get_split(Split::Test, &triggers).unwrap();
    dataset.save_split(&view, IfExists::Error, &save).unwrap();
    if controls > 0 {
        let controls = GenerateOptions::new(controls)
            .with_ratio(0.0)
            .with_backgrounds(1, 1)
            .with_seed(3);
        let view = generated.get_split(Split::Test, &controls).unwrap();
        dataset.save_split(&view, IfExists::Append, &save).unwrap();
    }
    dataset
}

fn pair(dataset: &PremadeMisophoniaDataset, kind: RendererKind) -> DatasetResult<PairSummary> {
    let renderer = kind.create();
    add_experimental_pairs_to_dataset(
        dataset,
        Split::Test,
        42,
        &WavFileLoader,
        renderer.as_ref(),
    )
}

#[test]
fn test_pairs_match_their_triggers() {
    let fixture = fixture(3);
    let tmp = TempDir::new().unwrap();
    let dataset = saved(&fixture, 3, &tmp);
    let summary = pair(&dataset, RendererKind::Binaural).unwrap();
    assert_eq!(summary.categories, vec!["chewing".to_string()]);
    assert_eq!(summary.skipped_categories, vec!["sniffing".to_string()]);
    assert_eq!(summary.len(), 2);

    let items = dataset.load_split_items(Split::Test).unwrap();
    assert_eq!(items.len(), 8);
    let derived: Vec<&MisophoniaItem> = items
        .iter()
        .filter(|i| i.paired_uuid().is_some())
        .collect();
    assert_eq!(derived.len(), 2);

    for item in &derived {
        let trigger = items
            .iter()
            .find(|t| t.uuid() == item.paired_uuid())
            .expect("paired trigger exists");
        assert!(trigger.is_trigger());
        assert_eq!(trigger.foreground_categories(), ["chewing".to_string()]);
        assert!(!item.is_trigger());
        assert!(item.ground_truth().is_none());
        assert_eq!(item.backgrounds(), trigger.backgrounds());
        assert_eq!(item.global_mixing_params(), trigger.global_mixing_params());

        let fg = &item.foregrounds()[0];
        let original = &trigger.foregrounds()[0];
        assert_eq!(fg.source_item.label_type, LabelType::Control);
        assert_eq!(fg.start, original.start);
        assert_eq!((fg.azimuth, fg.elevation), (original.azimuth, original.elevation));
        assert_eq!((fg.level, fg.reverb), (original.level, original.reverb));
        assert!(item.length() >= fg.end);
    }
    assert_ne!(
        derived[0].foregrounds()[0].source_item.file_path,
        derived[1].foregrounds()[0].source_item.file_path
    );
}

#[test]
fn test_too_few_controls_writes_nothing() {
    let fixture = fixture(1);
    let tmp = TempDir::new().unwrap();
    let dataset = saved(&fixture, 1, &tmp);
    let err = pair(&dataset, RendererKind::StereoPan).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::InsufficientControls {
            needed: 2,
            available: 1
        }
    ));
    assert_eq!(dataset.load_split_items(Split::Test).unwrap().len(), 4);
}
