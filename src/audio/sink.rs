use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, trace};

use super::tone::ToneRequest;
use crate::playback::{PlaybackState, PlaybackSubscriber, ScheduledEvent};

/// The audio collaborator. Implementations own the actual device; the
/// engine only hands them timestamped tone requests.
pub trait AudioSink: Send + Sync {
    fn schedule(&self, tone: &ToneRequest);

    /// Stop everything that is sounding or queued
    fn silence(&self);
}

/// Keeps every request instead of playing it. Backs offline WAV rendering
/// and tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    tones: Mutex<Vec<ToneRequest>>,
    silenced: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tones(&self) -> Vec<ToneRequest> {
        self.tones
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    pub fn silence_count(&self) -> usize {
        self.silenced.load(Ordering::SeqCst)
    }
}

impl AudioSink for RecordingSink {
    fn schedule(&self, tone: &ToneRequest) {
        if let Ok(mut tones) = self.tones.lock() {
            tones.push(tone.clone());
        }
    }

    fn silence(&self) {
        self.silenced.fetch_add(1, Ordering::SeqCst);
    }
}

/// Voices every fired event on a sink, and silences it on every stop.
pub struct AudioSubscriber<S> {
    sink: S,
}

impl<S: AudioSink> AudioSubscriber<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<T, S: AudioSink> PlaybackSubscriber<T> for AudioSubscriber<S> {
    fn on_event(&self, event: &ScheduledEvent<T>) {
        trace!(
            "Tone {:.1} Hz vel {:.2} pan {:+.2}",
            event.tone.frequency_hz, event.tone.velocity, event.tone.pan
        );
        self.sink.schedule(&event.tone);
    }

    fn on_state(&self, plan_id: u64, state: PlaybackState) {
        if state == PlaybackState::Cancelled {
            debug!("Plan {} cancelled", plan_id);
        }
    }

    fn on_stop(&self) {
        debug!("Silencing audio");
        self.sink.silence();
    }
}

impl<S: AudioSink + ?Sized> AudioSink for std::sync::Arc<S> {
    fn schedule(&self, tone: &ToneRequest) {
        (**self).schedule(tone);
    }

    fn silence(&self) {
        (**self).silence();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Voicing;
    use crate::sampling::Draw;
    use std::sync::Arc;
    use std::time::Duration;

    fn event(index: usize) -> ScheduledEvent<()> {
        let draw = Draw::new("0110", 3, 10);
        let offset = Duration::from_millis(100 * index as u64);
        ScheduledEvent {
            plan_id: 1,
            index,
            offset,
            tone: Voicing::default().voice(&draw, offset),
            draw,
            values: Vec::new(),
        }
    }

    #[test]
    fn test_subscriber_schedules_and_silences_on_stop() {
        let sink = Arc::new(RecordingSink::new());
        let subscriber = AudioSubscriber::new(sink.clone());

        subscriber.on_event(&event(0));
        subscriber.on_event(&event(1));
        PlaybackSubscriber::<()>::on_state(&subscriber, 1, PlaybackState::Completed);
        PlaybackSubscriber::<()>::on_state(&subscriber, 1, PlaybackState::Cancelled);
        assert_eq!(sink.silence_count(), 0);
        PlaybackSubscriber::<()>::on_stop(&subscriber);

        let tones = sink.tones();
        assert_eq!(tones.len(), 2);
        assert_eq!(tones[1].offset, Duration::from_millis(100));
        assert_eq!(sink.silence_count(), 1);
    }
}
