//! Locating the sample payload of a RIFF/WAVE buffer.

/// Returns the body of the `data` chunk, skipping any other chunks.
///
/// Saved mixes and the WAV sources read back by tests are compared on this
/// payload so header differences never count as audio differences.
pub fn extract_pcm_data(wav_data: &[u8]) -> Option<&[u8]> {
    if wav_data.get(0..4)? != b"RIFF" || wav_data.get(8..12)? != b"WAVE" {
        return None;
    }

    let mut rest = wav_data.get(12..)?;
    while rest.len() >= 8 {
        let (header, body) = rest.split_at(8);
        let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
        let chunk = body.get(..size)?;
        if &header[..4] == b"data" {
            return Some(chunk);
        }
        // Odd-sized chunks carry one pad byte.
        let padded = size + (size & 1);
        rest = body.get(padded..).unwrap_or(&[]);
    }
    None
}

/// BLAKE3 hex digest of the `data` chunk, if there is one.
pub fn compute_pcm_hash(wav_data: &[u8]) -> Option<String> {
    extract_pcm_data(wav_data).map(|pcm| blake3::hash(pcm).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend((body.len() as u32).to_le_bytes());
        out.extend(body);
        if body.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = b"RIFF".to_vec();
        out.extend(((body.len() + 4) as u32).to_le_bytes());
        out.extend(b"WAVE");
        out.extend(body);
        out
    }

    #[test]
    fn test_data_chunk_after_odd_sized_chunk() {
        let wav = riff(&[chunk(b"LIST", &[1, 2, 3]), chunk(b"data", &[9, 8, 7, 6])]);
        assert_eq!(extract_pcm_data(&wav), Some(&[9u8, 8, 7, 6][..]));
    }

    #[test]
    fn test_truncated_or_foreign_buffers() {
        let mut wav = riff(&[chunk(b"data", &[1, 2, 3, 4])]);
        wav.truncate(wav.len() - 2);
        assert_eq!(extract_pcm_data(&wav), None);
        assert_eq!(extract_pcm_data(b"RIFX0000WAVE"), None);
        assert_eq!(compute_pcm_hash(&[]), None);
    }
}
