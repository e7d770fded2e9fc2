use super::*;
use crate::error::ErrorCode;
use crate::source::{LabelType, SourceDataItem};
use crate::track::TrackOptions;
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn track(split: Split, label_type: LabelType, label: &str) -> SourceTrack {
    let item = SourceDataItem::builder(split, "d", format!("{}.wav", label), label_type)
        .label(label)
        .build()
        .unwrap();
    let mut rng = Pcg32::seed_from_u64(5);
    SourceTrack::new(item, 0, 4, &TrackOptions::default(), &mut rng).unwrap()
}

fn stereo(n: usize) -> Waveform {
    Waveform::silence(2, n)
}

fn codes(err: SpecError) -> Vec<ErrorCode> {
    match err {
        SpecError::ValidationFailed(errors) => errors.into_iter().map(|e| e.code).collect(),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_trigger_without_ground_truth_fails() {
    let err = MisophoniaItem::builder(Split::Train, stereo(4), GlobalMixingParams::default())
        .trigger(true)
        .build()
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::TriggerWithoutGroundTruth]);
}

#[test]
fn test_control_with_ground_truth_fails() {
    let err = MisophoniaItem::builder(Split::Train, stereo(4), GlobalMixingParams::default())
        .trigger(false)
        .ground_truth(Some(stereo(4).into()))
        .build()
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::GroundTruthWithoutTrigger]);
}

#[test]
fn test_track_split_mismatch_fails() {
    let err = MisophoniaItem::builder(Split::Test, stereo(4), GlobalMixingParams::default())
        .foregrounds(vec![track(Split::Train, LabelType::Control, "typing")])
        .build()
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::TrackSplitMismatch]);
}

#[test]
fn test_length_mismatch_fails() {
    let err = MisophoniaItem::builder(Split::Val, stereo(4), GlobalMixingParams::default())
        .length(5)
        .build()
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::LengthMismatch]);
}

#[test]
fn test_rating_out_of_range_fails() {
    let err = MisophoniaItem::builder(Split::Val, stereo(4), GlobalMixingParams::default())
        .discomfort_rating(5.5)
        .build()
        .unwrap_err();
    assert_eq!(codes(err), vec![ErrorCode::RatingOutOfRange]);
}

#[test]
fn test_length_and_categories_are_derived() {
    let item = MisophoniaItem::builder(Split::Train, stereo(4), GlobalMixingParams::default())
        .trigger(true)
        .ground_truth(Some(stereo(4).into()))
        .foregrounds(vec![
            track(Split::Train, LabelType::Trigger, "slurping"),
            track(Split::Train, LabelType::Trigger, "chewing"),
        ])
        .backgrounds(vec![track(Split::Train, LabelType::Background, "rain")])
        .build()
        .unwrap();

    assert_eq!(item.length(), 4);
    assert_eq!(
        item.foreground_categories(),
        &["chewing".to_string(), "slurping".to_string()]
    );
    assert_eq!(item.background_categories(), &["rain".to_string()]);
    assert_eq!(item.mix_licensing(), default_mix_licensing().as_slice());
    assert!(item.uuid().is_none());
}

#[test]
fn test_with_uuid_returns_new_copy() {
    let item = MisophoniaItem::builder(Split::Train, stereo(2), GlobalMixingParams::default())
        .build()
        .unwrap();
    let id = Uuid::new_v4();
    let with_id = item.with_uuid(id);
    assert!(item.uuid().is_none());
    assert_eq!(with_id.uuid(), Some(id));
}

#[test]
fn test_to_record_requires_paths() {
    let item = MisophoniaItem::builder(Split::Train, stereo(2), GlobalMixingParams::default())
        .build()
        .unwrap();
    assert!(matches!(
        item.to_record(),
        Err(SpecError::AudioRepresentation { field: "mix", .. })
    ));
}

#[test]
fn test_record_roundtrip_resolves_paths() {
    let id = Uuid::new_v4();
    let item = MisophoniaItem::builder(Split::Test, stereo(3), GlobalMixingParams::default())
        .trigger(true)
        .ground_truth(Some(stereo(3).into()))
        .foregrounds(vec![track(Split::Test, LabelType::Trigger, "chewing")])
        .build()
        .unwrap()
        .with_uuid(id)
        .with_audio_paths(
            PathBuf::from(format!("mixes/{}.wav", id)),
            Some(PathBuf::from(format!("ground_truths/{}.wav", id))),
        )
        .unwrap();

    let record = item.to_record().unwrap();
    let line = serde_json::to_string(&record).unwrap();
    let parsed: MisophoniaRecord = serde_json::from_str(&line).unwrap();
    assert_eq!(parsed, record);

    let loaded = MisophoniaItem::from_record(parsed, Path::new("/data/set/test")).unwrap();
    assert_eq!(
        loaded.mix().as_path(),
        Some(Path::new(&format!("/data/set/test/mixes/{}.wav", id)))
    );
    assert_eq!(loaded.length(), 3);
    assert_eq!(loaded.foregrounds(), item.foregrounds());
}

#[test]
fn test_from_record_rejects_trigger_mismatch() {
    let item = MisophoniaItem::builder(Split::Train, stereo(2), GlobalMixingParams::default())
        .build()
        .unwrap()
        .with_audio_paths(PathBuf::from("mixes/a.wav"), None)
        .unwrap();
    let mut record = item.to_record().unwrap();
    record.is_trigger = true;
    assert!(MisophoniaItem::from_record(record, Path::new("/x")).is_err());
}
