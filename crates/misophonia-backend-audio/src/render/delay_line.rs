//! Ring-buffer delay line used for interaural time differences.

/// A ring buffer holding the most recent samples of a signal.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f64>,
    write_pos: usize,
}

impl DelayLine {
    /// Creates a delay line able to look back `max_samples` samples.
    pub fn new(max_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_samples.max(4) + 2],
            write_pos: 0,
        }
    }

    /// Largest delay that can be read back.
    pub fn capacity(&self) -> usize {
        self.buffer.len() - 2
    }

    /// Writes a sample and advances the write position.
    pub fn write(&mut self, sample: f64) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Reads the sample written `delay_samples` writes ago (1 = most recent).
    pub fn read(&self, delay_samples: usize) -> f64 {
        let delay = delay_samples.min(self.buffer.len());
        let read_pos = (self.write_pos + self.buffer.len() - delay) % self.buffer.len();
        self.buffer[read_pos]
    }

    /// Reads at a fractional delay with linear interpolation.
    pub fn read_interpolated(&self, delay_samples: f64) -> f64 {
        let delay_samples = delay_samples.max(0.0);
        let delay_int = delay_samples.floor() as usize;
        let delay_frac = delay_samples - delay_int as f64;

        let sample1 = self.read(delay_int);
        let sample2 = self.read(delay_int + 1);
        sample1 * (1.0 - delay_frac) + sample2 * delay_frac
    }

    /// Writes `input` and returns the signal delayed by `delay_samples`.
    ///
    /// A delay of zero returns `input` itself.
    pub fn process(&mut self, input: f64, delay_samples: f64, interpolate: bool) -> f64 {
        self.write(input);
        // After the write, the current input sits at read(1).
        if interpolate {
            self.read_interpolated(delay_samples + 1.0)
        } else {
            self.read(delay_samples.max(0.0).round() as usize + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_line_basic() {
        let mut dl = DelayLine::new(10);
        for i in 0..5 {
            dl.write(i as f64);
        }
        assert!((dl.read(1) - 4.0).abs() < 1e-10);
        assert!((dl.read(5) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_delay_line_interpolation() {
        let mut dl = DelayLine::new(10);
        dl.write(0.0);
        dl.write(1.0);
        dl.write(2.0);
        // Halfway between read(1) = 2.0 and read(2) = 1.0.
        let val = dl.read_interpolated(1.5);
        assert!((val - 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_process_zero_delay_passes_through() {
        let mut dl = DelayLine::new(8);
        for i in 1..6 {
            assert_eq!(dl.process(i as f64, 0.0, true), i as f64);
            assert_eq!(dl.process(i as f64 * 10.0, 0.0, false), i as f64 * 10.0);
        }
    }

    #[test]
    fn test_process_integer_delay() {
        let mut dl = DelayLine::new(8);
        let out: Vec<f64> = (1..=6).map(|i| dl.process(i as f64, 2.0, false)).collect();
        assert_eq!(out, vec![0.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_process_nearest_rounds_fractional_delay() {
        let mut a = DelayLine::new(8);
        let mut b = DelayLine::new(8);
        for i in 0..8 {
            let x = (i as f64).sin();
            assert_eq!(a.process(x, 1.6, false), b.process(x, 2.0, false));
        }
    }

    #[test]
    fn test_delay_line_wrap_around() {
        let mut dl = DelayLine::new(4);
        for i in 0..10 {
            dl.write(i as f64);
        }
        assert!((dl.read(1) - 9.0).abs() < 1e-10);
        assert!((dl.read(4) - 6.0).abs() < 1e-10);
        assert_eq!(dl.capacity(), 4);
    }
}
