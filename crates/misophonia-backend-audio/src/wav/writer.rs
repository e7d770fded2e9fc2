//! Core WAV writing and PCM conversion functions.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use misophonia_spec::Waveform;

use super::format::WavFormat;
use crate::error::{AudioError, AudioResult};

/// Writes a complete WAV file to a writer.
///
/// # Arguments
/// * `writer` - Output writer
/// * `format` - WAV format parameters
/// * `pcm_data` - Raw interleaved PCM samples as bytes
pub fn write_wav<W: Write>(writer: &mut W, format: &WavFormat, pcm_data: &[u8]) -> io::Result<()> {
    let data_size = pcm_data.len() as u32;
    let pad = data_size % 2;
    let file_size = 36 + data_size + pad; // Total file size minus 8 bytes for RIFF header

    // RIFF header
    writer.write_all(b"RIFF")?;
    writer.write_all(&file_size.to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    // fmt chunk
    writer.write_all(b"fmt ")?;
    writer.write_all(&16u32.to_le_bytes())?;
    writer.write_all(&1u16.to_le_bytes())?; // PCM
    writer.write_all(&format.channels.to_le_bytes())?;
    writer.write_all(&format.sample_rate.to_le_bytes())?;
    writer.write_all(&format.byte_rate().to_le_bytes())?;
    writer.write_all(&format.block_align().to_le_bytes())?;
    writer.write_all(&format.bits_per_sample.to_le_bytes())?;

    // data chunk
    writer.write_all(b"data")?;
    writer.write_all(&data_size.to_le_bytes())?;
    writer.write_all(pcm_data)?;
    if pad == 1 {
        writer.write_all(&[0])?;
    }

    Ok(())
}

/// Writes a WAV file to a byte vector.
pub fn write_wav_to_vec(format: &WavFormat, pcm_data: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(45 + pcm_data.len());
    write_wav(&mut buffer, format, pcm_data).expect("writing to Vec should not fail");
    buffer
}

/// Converts a planar waveform to interleaved little-endian PCM bytes.
///
/// Samples are clipped to [-1.0, 1.0].
///
/// # Arguments
/// * `waveform` - Planar samples
/// * `bits_per_sample` - 16 or 24
pub fn waveform_to_pcm(waveform: &Waveform, bits_per_sample: u16) -> AudioResult<Vec<u8>> {
    let bytes = match bits_per_sample {
        16 => 2,
        24 => 3,
        other => {
            return Err(AudioError::invalid_param(
                "bits_per_sample",
                format!("must be 16 or 24, got {}", other),
            ))
        }
    };
    let (channels, samples) = waveform.shape();
    let mut pcm = Vec::with_capacity(channels * samples * bytes);

    for i in 0..samples {
        for channel in waveform.channels() {
            let clipped = channel[i].clamp(-1.0, 1.0);
            if bytes == 2 {
                let value = (clipped * 32767.0).round() as i16;
                pcm.extend_from_slice(&value.to_le_bytes());
            } else {
                let value = (clipped * 8_388_607.0).round() as i32;
                pcm.extend_from_slice(&value.to_le_bytes()[0..3]);
            }
        }
    }

    Ok(pcm)
}

/// Writes a waveform to a WAV file, creating parent directories as needed.
///
/// # Arguments
/// * `path` - Output file
/// * `waveform` - Planar samples
/// * `sample_rate` - Sample rate in Hz
/// * `bits_per_sample` - 16 or 24
pub fn write_wav_file(
    path: &Path,
    waveform: &Waveform,
    sample_rate: u32,
    bits_per_sample: u16,
) -> AudioResult<()> {
    let channels = u16::try_from(waveform.num_channels())
        .map_err(|_| AudioError::invalid_param("channels", "too many channels"))?;
    let format = WavFormat::new(channels, sample_rate, bits_per_sample)?;
    let pcm = waveform_to_pcm(waveform, bits_per_sample)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_wav(&mut writer, &format, &pcm)?;
    writer.flush()?;
    Ok(())
}
