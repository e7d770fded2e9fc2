//! Freeverb room simulation used as the binaural renderer's reverb bus.
//!
//! Eight parallel damped comb filters feed four serial allpass filters per
//! ear. The bus is wet-only: the dry signal is rendered separately and the
//! room output is added on top.

// Tunings in samples at 44.1kHz.
const COMB_TUNINGS: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];
const ALLPASS_TUNINGS: [usize; 4] = [556, 441, 341, 225];
const STEREO_SPREAD: usize = 23;

const FIXED_GAIN: f64 = 0.015;
const SCALE_WET: f64 = 3.0;
const SCALE_DAMPING: f64 = 0.4;
const SCALE_ROOM: f64 = 0.28;
const OFFSET_ROOM: f64 = 0.7;

/// Default high-frequency absorption.
pub const DEFAULT_DAMPING: f64 = 0.5;

/// Room size in [0, 1] for a reverb type identifier.
///
/// Type "1" is a mid-sized room, type "2" a larger, more reverberant one.
pub fn room_size_for(reverb_type: &str) -> f64 {
    match reverb_type {
        "2" => 0.85,
        _ => 0.5,
    }
}

struct CombFilter {
    buffer: Vec<f64>,
    buffer_index: usize,
    filter_store: f64,
    damp1: f64,
    damp2: f64,
    feedback: f64,
}

impl CombFilter {
    fn new(size: usize, feedback: f64, damping: f64) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)],
            buffer_index: 0,
            filter_store: 0.0,
            damp1: damping,
            damp2: 1.0 - damping,
            feedback,
        }
    }

    fn process(&mut self, input: f64) -> f64 {
        let output = self.buffer[self.buffer_index];
        self.filter_store = (output * self.damp2) + (self.filter_store * self.damp1);
        self.buffer[self.buffer_index] = input + (self.filter_store * self.feedback);

        self.buffer_index += 1;
        if self.buffer_index >= self.buffer.len() {
            self.buffer_index = 0;
        }
        output
    }
}

struct AllpassFilter {
    buffer: Vec<f64>,
    buffer_index: usize,
}

impl AllpassFilter {
    fn new(size: usize) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)],
            buffer_index: 0,
        }
    }

    fn process(&mut self, input: f64) -> f64 {
        let buf_out = self.buffer[self.buffer_index];
        let output = buf_out - input;
        self.buffer[self.buffer_index] = input + (buf_out * 0.5);

        self.buffer_index += 1;
        if self.buffer_index >= self.buffer.len() {
            self.buffer_index = 0;
        }
        output
    }
}

/// A stereo Freeverb tank fed by a mono send.
pub(crate) struct Room {
    combs_left: Vec<CombFilter>,
    combs_right: Vec<CombFilter>,
    allpasses_left: Vec<AllpassFilter>,
    allpasses_right: Vec<AllpassFilter>,
    wet: f64,
}

impl Room {
    /// Creates a room tank for the given sample rate.
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz; delay tunings scale with it
    /// * `room_size` - Size in [0, 1]
    /// * `damping` - High-frequency absorption in [0, 1]
    pub(crate) fn new(sample_rate: f64, room_size: f64, damping: f64) -> Self {
        let scale = sample_rate / 44100.0;
        let feedback = room_size.clamp(0.0, 1.0) * SCALE_ROOM + OFFSET_ROOM;
        let damp = damping.clamp(0.0, 1.0) * SCALE_DAMPING;
        let scaled = |size: usize| (size as f64 * scale) as usize;

        Self {
            combs_left: COMB_TUNINGS
                .iter()
                .map(|&size| CombFilter::new(scaled(size), feedback, damp))
                .collect(),
            combs_right: COMB_TUNINGS
                .iter()
                .map(|&size| CombFilter::new(scaled(size + STEREO_SPREAD), feedback, damp))
                .collect(),
            allpasses_left: ALLPASS_TUNINGS
                .iter()
                .map(|&size| AllpassFilter::new(scaled(size)))
                .collect(),
            allpasses_right: ALLPASS_TUNINGS
                .iter()
                .map(|&size| AllpassFilter::new(scaled(size + STEREO_SPREAD)))
                .collect(),
            wet: SCALE_WET,
        }
    }

    /// Feeds one send sample and returns the wet left/right output.
    pub(crate) fn process(&mut self, send: f64) -> (f64, f64) {
        let input = send * FIXED_GAIN;

        let mut out_left = 0.0;
        for comb in &mut self.combs_left {
            out_left += comb.process(input);
        }
        let mut out_right = 0.0;
        for comb in &mut self.combs_right {
            out_right += comb.process(input);
        }

        for allpass in &mut self.allpasses_left {
            out_left = allpass.process(out_left);
        }
        for allpass in &mut self.allpasses_right {
            out_right = allpass.process(out_right);
        }

        (out_left * self.wet, out_right * self.wet)
    }

    /// Runs a whole send buffer through the room.
    pub(crate) fn process_buffer(&mut self, send: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut left = Vec::with_capacity(send.len());
        let mut right = Vec::with_capacity(send.len());
        for &sample in send {
            let (l, r) = self.process(sample);
            left.push(l);
            right.push(r);
        }
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse(len: usize) -> Vec<f64> {
        let mut buf = vec![0.0; len];
        buf[0] = 1.0;
        buf
    }

    fn energy(buf: &[f64]) -> f64 {
        buf.iter().map(|s| s * s).sum()
    }

    #[test]
    fn test_silence_in_silence_out() {
        let mut room = Room::new(44100.0, 0.5, DEFAULT_DAMPING);
        let (l, r) = room.process_buffer(&vec![0.0; 4000]);
        assert!(l.iter().chain(&r).all(|&s| s == 0.0));
    }

    #[test]
    fn test_impulse_produces_tail() {
        let mut room = Room::new(44100.0, 0.5, DEFAULT_DAMPING);
        let (l, r) = room.process_buffer(&impulse(8000));
        // Nothing arrives before the shortest comb delay.
        assert!(l[..200].iter().all(|&s| s == 0.0));
        assert!(energy(&l[1000..]) > 0.0);
        assert!(energy(&r[1000..]) > 0.0);
        assert_ne!(l, r);
    }

    #[test]
    fn test_larger_room_rings_longer() {
        let len = 44100;
        let mut small = Room::new(44100.0, room_size_for("1"), DEFAULT_DAMPING);
        let mut large = Room::new(44100.0, room_size_for("2"), DEFAULT_DAMPING);
        let (ls, _) = small.process_buffer(&impulse(len));
        let (ll, _) = large.process_buffer(&impulse(len));
        let tail = len / 2..len;
        assert!(energy(&ll[tail.clone()]) > energy(&ls[tail]));
    }

    #[test]
    fn test_room_size_lookup() {
        assert_eq!(room_size_for("1"), 0.5);
        assert_eq!(room_size_for("2"), 0.85);
    }
}
