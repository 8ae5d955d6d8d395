//! Realtime playback of sampled draws.
//!
//! A [`PlaybackController`] owns the single active plan. `start` draws and
//! decodes every event up front, then a worker thread fires them in order at
//! `index * interval`, racing each deadline against a cancel signal. `stop`
//! joins that worker before returning.

pub mod plan;
pub mod scheduler;
pub mod state;
pub mod subscriber;

pub use plan::{PlanCursor, PlaybackPlan, PlaybackRequest, ScheduledEvent};
pub use scheduler::PlaybackController;
pub use state::{PlaybackState, Progress};
pub use subscriber::{ChannelSubscriber, PlaybackMessage, PlaybackSubscriber};
