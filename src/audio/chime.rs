use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;
const TONE_SECS: f32 = 0.18;

/// Short synthesized two-tone chime. Tones are generated rather than loaded
/// from disk so the crate ships no audio assets.
pub struct Chime {
    freqs: [f32; 2],
    num_sample: usize,
    samples_per_tone: usize,
}

impl Chime {
    /// Rising cue played when a session opens.
    pub fn start() -> Self {
        Self::new([523.25, 659.25])
    }

    /// Brighter cue played when a work session completes.
    pub fn complete() -> Self {
        Self::new([659.25, 987.77])
    }

    fn new(freqs: [f32; 2]) -> Self {
        Self {
            freqs,
            num_sample: 0,
            samples_per_tone: (SAMPLE_RATE as f32 * TONE_SECS) as usize,
        }
    }
}

impl Iterator for Chime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let tone = self.num_sample / self.samples_per_tone;
        if tone >= self.freqs.len() {
            return None;
        }
        let within = self.num_sample % self.samples_per_tone;
        let t = self.num_sample as f32 / SAMPLE_RATE as f32;
        // Linear fade-out per tone keeps the transitions click-free.
        let envelope = 1.0 - within as f32 / self.samples_per_tone as f32;
        let sample = (2.0 * PI * self.freqs[tone] * t).sin() * 0.2 * envelope;

        self.num_sample += 1;
        Some(sample)
    }
}

impl Source for Chime {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(TONE_SECS * self.freqs.len() as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chime_is_finite_and_bounded() {
        let samples: Vec<f32> = Chime::complete().collect();
        let expected = 2 * (SAMPLE_RATE as f32 * TONE_SECS) as usize;
        assert_eq!(samples.len(), expected);
        assert!(samples.iter().all(|s| s.abs() <= 0.2));
    }
}
