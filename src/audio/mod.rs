//! Sonification: draws become timestamped tone requests for an external
//! audio device, or an offline stereo render.

pub mod render;
pub mod sink;
pub mod tone;

pub use render::{render_tones, write_wav};
pub use sink::{AudioSink, AudioSubscriber, RecordingSink};
pub use tone::{ToneRequest, Voicing};
