use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::audio::{ToneRequest, Voicing};
use crate::decoder::Decoder;
use crate::error::{EngineError, Result};
use crate::sampling::{Draw, RandomSource, Sampler};

/// What the caller asks the controller to play
#[derive(Clone)]
pub struct PlaybackRequest<T> {
    pub sampler: Arc<dyn Sampler>,
    pub decoder: Option<Arc<Decoder<T>>>,
    pub count: usize,
    pub interval: Duration,
    /// Fixed seed for a reproducible plan
    pub seed: Option<u64>,
}

impl<T> PlaybackRequest<T> {
    pub fn new(sampler: Arc<dyn Sampler>, count: usize, interval: Duration) -> Self {
        Self {
            sampler,
            decoder: None,
            count,
            interval,
            seed: None,
        }
    }

    pub fn with_decoder(mut self, decoder: Arc<Decoder<T>>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// One draw, already decoded and voiced, with its fire time
#[derive(Debug, Clone)]
pub struct ScheduledEvent<T> {
    pub plan_id: u64,
    pub index: usize,
    pub offset: Duration,
    pub draw: Draw,
    pub values: Vec<T>,
    pub tone: ToneRequest,
}

#[derive(Debug, Clone)]
pub struct PlaybackPlan<T> {
    id: u64,
    events: Vec<ScheduledEvent<T>>,
    interval: Duration,
    grace: Duration,
}

impl<T: Clone> PlaybackPlan<T> {
    /// Draw and decode every event up front, so the tone and the displayed
    /// values of an event always come from the same draw.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        id: u64,
        sampler: &dyn Sampler,
        decoder: Option<&Decoder<T>>,
        count: usize,
        interval: Duration,
        grace: Duration,
        voicing: &Voicing,
        rng: &mut dyn RandomSource,
    ) -> Result<Self> {
        if let Some(decoder) = decoder {
            if decoder.width() != sampler.width() {
                return Err(EngineError::InvalidGroupSpec(format!(
                    "decoder expects {} bits, sampler produces {}",
                    decoder.width(),
                    sampler.width()
                )));
            }
        }

        let mut events = Vec::with_capacity(count);
        for index in 0..count {
            let offset = interval * index as u32;
            let draw = sampler.sample(rng);
            let values = match decoder {
                Some(decoder) => decoder.decode_draw(&draw)?,
                None => Vec::new(),
            };
            let tone = voicing.voice(&draw, offset);
            trace!("Plan {} event {}: {} at {:?}", id, index, draw.bitstring, offset);
            events.push(ScheduledEvent {
                plan_id: id,
                index,
                offset,
                draw,
                values,
                tone,
            });
        }

        Ok(Self {
            id,
            events,
            interval,
            grace,
        })
    }
}

impl<T> PlaybackPlan<T> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn events(&self) -> &[ScheduledEvent<T>] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Time from start until the plan completes: one interval per event,
    /// then the grace period
    pub fn duration(&self) -> Duration {
        self.interval * self.events.len() as u32 + self.grace
    }

    pub fn tones(&self) -> Vec<ToneRequest> {
        self.events
            .iter()
            .map(|e| e.tone.clone())
            .collect()
    }
}

/// Clock-free walk over a plan: which events are due at a given elapsed
/// time and when the plan is finished.
#[derive(Debug, Clone)]
pub struct PlanCursor {
    offsets: Vec<Duration>,
    next: usize,
    completes_at: Duration,
}

impl PlanCursor {
    pub fn new<T>(plan: &PlaybackPlan<T>) -> Self {
        Self {
            offsets: plan
                .events()
                .iter()
                .map(|e| e.offset)
                .collect(),
            next: 0,
            completes_at: plan.duration(),
        }
    }

    /// Indices of events whose offsets are at or before `now` and that have
    /// not been returned yet, in order
    pub fn due(&mut self, now: Duration) -> Range<usize> {
        let start = self.next;
        while self.next < self.offsets.len() && self.offsets[self.next] <= now {
            self.next += 1;
        }
        start..self.next
    }

    /// Offset of the next event, or the completion time once all have fired
    pub fn next_deadline(&self) -> Duration {
        self.offsets
            .get(self.next)
            .copied()
            .unwrap_or(self.completes_at)
    }

    pub fn fired(&self) -> usize {
        self.next
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        self.next == self.offsets.len() && now >= self.completes_at
    }
}
