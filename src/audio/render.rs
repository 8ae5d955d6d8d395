// Offline rendering of a tone schedule to interleaved stereo

use std::f32::consts::{FRAC_PI_4, PI};
use std::path::Path;

use tracing::info;

use super::tone::ToneRequest;
use crate::error::Result;
use crate::utils::consts::TONE_RAMP_MS;

/// Mix every tone into one interleaved stereo buffer (L, R, L, R, ...).
/// Sine partials with a linear attack/release and equal-power panning.
pub fn render_tones(tones: &[ToneRequest], sample_rate: u32) -> Vec<f32> {
    let sr = sample_rate as f32;
    let frames = tones
        .iter()
        .map(|t| ((t.offset + t.duration).as_secs_f32() * sr).round() as usize)
        .max()
        .unwrap_or(0);
    let mut out = vec![0.0f32; frames * 2];
    let ramp = ((TONE_RAMP_MS as f32 / 1000.0) * sr) as usize;

    for tone in tones {
        let start = (tone.offset.as_secs_f32() * sr).round() as usize;
        let len = (tone.duration.as_secs_f32() * sr).round() as usize;
        let ramp = ramp.min(len / 2).max(1);
        let angle = (tone.pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
        let (gain_l, gain_r) = (angle.cos(), angle.sin());

        for n in 0..len {
            let frame = start + n;
            if frame >= frames {
                break;
            }
            let envelope = if n < ramp {
                n as f32 / ramp as f32
            } else if n >= len - ramp {
                (len - n) as f32 / ramp as f32
            } else {
                1.0
            };
            let t = n as f32 / sr;
            let s = (2.0 * PI * tone.frequency_hz * t).sin() * tone.velocity * envelope;
            out[frame * 2] += s * gain_l;
            out[frame * 2 + 1] += s * gain_r;
        }
    }

    let peak = out
        .iter()
        .fold(0.0f32, |m, s| m.max(s.abs()));
    if peak > 1.0 {
        for s in &mut out {
            *s /= peak;
        }
    }
    out
}

/// Write interleaved stereo samples as a 16-bit WAV
pub fn write_wav(stereo: &[f32], sample_rate: u32, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    let amplitude = i16::MAX as f32;
    for &sample in stereo {
        writer.write_sample((sample.clamp(-1.0, 1.0) * amplitude) as i16)?;
    }
    writer.finalize()?;
    info!(
        "Wrote {} frames to {}",
        stereo.len() / 2,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn tone(offset_ms: u64, pan: f32) -> ToneRequest {
        ToneRequest {
            frequency_hz: 440.0,
            velocity: 0.8,
            pan,
            offset: Duration::from_millis(offset_ms),
            duration: Duration::from_millis(100),
        }
    }

    #[test]
    fn test_silence_outside_tones() {
        let sr = 8000;
        let out = render_tones(&[tone(200, 0.0)], sr);
        // 300 ms of stereo frames
        assert_eq!(out.len(), 2400 * 2);
        assert!(out[..1600 * 2].iter().all(|&s| s == 0.0));
        assert!(out[1600 * 2..].iter().any(|&s| s.abs() > 0.1));
    }

    #[test]
    fn test_hard_pan_left() {
        let out = render_tones(&[tone(0, -1.0)], 8000);
        let right_peak = out
            .iter()
            .skip(1)
            .step_by(2)
            .fold(0.0f32, |m, s| m.max(s.abs()));
        let left_peak = out
            .iter()
            .step_by(2)
            .fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(right_peak < 1e-6);
        assert!(left_peak > 0.5);
    }

    #[test]
    fn test_write_wav() {
        let path = std::env::temp_dir().join("measureplay_render_test.wav");
        let out = render_tones(&[tone(0, 0.5)], 8000);
        write_wav(&out, 8000, &path).unwrap();
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.len() as usize, out.len());
        let _ = std::fs::remove_file(&path);
    }
}
