use crossbeam_channel::{Receiver, Sender};

use super::plan::ScheduledEvent;
use super::state::PlaybackState;

/// Receives every event and state change of the controller it is attached
/// to. Called synchronously from the playback worker, in event order.
pub trait PlaybackSubscriber<T>: Send + Sync {
    fn on_event(&self, event: &ScheduledEvent<T>);

    fn on_state(&self, _plan_id: u64, _state: PlaybackState) {}

    /// Called by every `stop()`, whatever the controller's state, after the
    /// worker is gone. Tones of a completed plan may still be sounding.
    fn on_stop(&self) {}
}

#[derive(Debug, Clone)]
pub enum PlaybackMessage<T> {
    Event(ScheduledEvent<T>),
    State { plan_id: u64, state: PlaybackState },
}

/// Forwards everything onto a channel, for consumers that live on another
/// thread (the CLI's render loop, tests).
pub struct ChannelSubscriber<T> {
    tx: Sender<PlaybackMessage<T>>,
}

impl<T> ChannelSubscriber<T> {
    pub fn new() -> (Self, Receiver<PlaybackMessage<T>>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl<T: Clone + Send> PlaybackSubscriber<T> for ChannelSubscriber<T> {
    fn on_event(&self, event: &ScheduledEvent<T>) {
        // A dropped receiver just means nobody is listening any more
        let _ = self
            .tx
            .send(PlaybackMessage::Event(event.clone()));
    }

    fn on_state(&self, plan_id: u64, state: PlaybackState) {
        let _ = self
            .tx
            .send(PlaybackMessage::State { plan_id, state });
    }
}
