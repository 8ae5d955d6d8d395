/// Default number of draws per playback
pub const DEFAULT_SAMPLE_COUNT: usize = 12;

/// Default inter-event interval (ms)
pub const DEFAULT_INTERVAL_MS: u64 = 600;

/// Trailing grace period after the last event before a plan completes (ms)
pub const COMPLETION_GRACE_MS: u64 = 250;

/// Default gallery size for without-replacement review
pub const DEFAULT_REVIEW_SIZE: usize = 8;

/// Log level (overridden by RUST_LOG)
pub const LOG_LEVEL: &str = "info";

/// Progress refresh interval for the terminal UI (ms)
pub const PROGRESS_UPDATE_INTERVAL_MS: u64 = 50;

// ============================================================================
// Audio
// ============================================================================

/// Sample rate used for offline tone rendering (Hz)
pub const AUDIO_SAMPLE_RATE: u32 = 44100;

/// Duration of a single voiced draw (ms)
pub const TONE_DURATION_MS: u64 = 400;

/// Attack / release ramp of a tone (ms)
pub const TONE_RAMP_MS: u64 = 20;

/// Lowest velocity assigned to a voiced draw, so rare outcomes stay audible
pub const MIN_VELOCITY: f32 = 0.2;

/// Base frequency of the voicing scale (A3)
pub const SCALE_ROOT_HZ: f32 = 220.0;

/// Major pentatonic steps in semitones
pub const PENTATONIC_STEPS: [u32; 5] = [0, 2, 4, 7, 9];

/// Widest bit group a decoder accepts
pub const MAX_GROUP_WIDTH: usize = 16;
