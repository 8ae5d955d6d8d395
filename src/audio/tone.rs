use std::time::Duration;

use crate::distribution::bits::hamming_weight;
use crate::sampling::Draw;
use crate::utils::consts::*;

/// A request to the audio collaborator: play one tone at `offset` from the
/// start of the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneRequest {
    pub frequency_hz: f32,
    /// 0.0..=1.0
    pub velocity: f32,
    /// -1.0 (left) ..= 1.0 (right)
    pub pan: f32,
    pub offset: Duration,
    pub duration: Duration,
}

/// Turns draws into tones.
///
/// - pitch: the draw's integer value picks a degree of a pentatonic scale,
///   wrapping after four octaves
/// - velocity: the draw's probability, floored so rare outcomes stay audible
/// - pan: share of '1' bits, from hard left (all zeros) to hard right
#[derive(Debug, Clone)]
pub struct Voicing {
    root_hz: f32,
    steps: Vec<u32>,
    octaves: u32,
    tone_duration: Duration,
    min_velocity: f32,
}

impl Default for Voicing {
    fn default() -> Self {
        Self {
            root_hz: SCALE_ROOT_HZ,
            steps: PENTATONIC_STEPS.to_vec(),
            octaves: 4,
            tone_duration: Duration::from_millis(TONE_DURATION_MS),
            min_velocity: MIN_VELOCITY,
        }
    }
}

impl Voicing {
    pub fn new(root_hz: f32, steps: Vec<u32>, tone_duration: Duration) -> Self {
        Self {
            root_hz,
            steps: if steps.is_empty() { vec![0] } else { steps },
            tone_duration,
            ..Self::default()
        }
    }

    pub fn tone_duration(&self) -> Duration {
        self.tone_duration
    }

    pub fn frequency_for(&self, degree: u64) -> f32 {
        let len = self.steps.len() as u64;
        let degree = degree % (len * self.octaves as u64);
        let octave = (degree / len) as u32;
        let semitones = 12 * octave + self.steps[(degree % len) as usize];
        self.root_hz * 2f32.powf(semitones as f32 / 12.0)
    }

    pub fn voice(&self, draw: &Draw, offset: Duration) -> ToneRequest {
        let degree = draw.value().unwrap_or(0);
        let velocity = self.min_velocity
            + (1.0 - self.min_velocity) * draw.probability() as f32;
        let pan = if draw.width() == 0 {
            0.0
        } else {
            2.0 * hamming_weight(&draw.bitstring) as f32 / draw.width() as f32 - 1.0
        };
        ToneRequest {
            frequency_hz: self.frequency_for(degree),
            velocity: velocity.clamp(0.0, 1.0),
            pan,
            offset,
            duration: self.tone_duration,
        }
    }
}
