use super::*;
use misophonia_spec::Waveform;

fn stereo(left: Vec<f64>, right: Vec<f64>) -> Waveform {
    Waveform::from_channels(vec![left, right]).unwrap()
}

#[test]
fn test_header_layout_24bit() {
    let format = WavFormat::stereo(44100);
    let pcm = waveform_to_pcm(&stereo(vec![0.0; 4], vec![0.0; 4]), 24).unwrap();
    let wav = write_wav_to_vec(&format, &pcm);

    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");
    assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 2);
    assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), 44100);
    assert_eq!(u16::from_le_bytes([wav[32], wav[33]]), 6);
    assert_eq!(u16::from_le_bytes([wav[34], wav[35]]), 24);
    assert_eq!(pcm.len(), 4 * 2 * 3);
}

#[test]
fn test_24bit_full_scale_and_interleaving() {
    let pcm = waveform_to_pcm(&stereo(vec![1.0], vec![-1.0]), 24).unwrap();
    assert_eq!(&pcm[0..3], &[0xFF, 0xFF, 0x7F]);
    assert_eq!(&pcm[3..6], &[0x01, 0x00, 0x80]);
}

#[test]
fn test_16bit_clipping() {
    let pcm = waveform_to_pcm(&Waveform::mono(vec![2.0, -2.0]), 16).unwrap();
    assert_eq!(i16::from_le_bytes([pcm[0], pcm[1]]), 32767);
    assert_eq!(i16::from_le_bytes([pcm[2], pcm[3]]), -32767);
}

#[test]
fn test_unsupported_bit_depth() {
    assert!(waveform_to_pcm(&Waveform::mono(vec![0.0]), 8).is_err());
    assert!(WavFormat::new(2, 44100, 32).is_err());
    assert!(WavFormat::new(2, 0, 24).is_err());
}

#[test]
fn test_pcm_hash_ignores_header() {
    let pcm = waveform_to_pcm(&Waveform::mono(vec![0.25, -0.5]), 24).unwrap();
    let a = write_wav_to_vec(&WavFormat::new(1, 44100, 24).unwrap(), &pcm);
    let b = write_wav_to_vec(&WavFormat::new(1, 48000, 24).unwrap(), &pcm);
    assert_ne!(a, b);
    assert_eq!(compute_pcm_hash(&a), compute_pcm_hash(&b));
    assert_eq!(extract_pcm_data(&a), Some(pcm.as_slice()));
}

#[test]
fn test_write_wav_file_readable_by_hound() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("mix.wav");
    let waveform = stereo(vec![0.5, 0.0, -0.5], vec![0.1, 0.2, 0.3]);
    write_wav_file(&path, &waveform, 22050, 24).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 22050);
    assert_eq!(spec.bits_per_sample, 24);
    assert_eq!(reader.duration(), 3);
}
