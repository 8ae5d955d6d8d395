use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, after, select};
use tracing::{debug, error, info};

use super::plan::{PlanCursor, PlaybackPlan, PlaybackRequest};
use super::state::{PlaybackState, Progress};
use super::subscriber::PlaybackSubscriber;
use crate::audio::Voicing;
use crate::error::{EngineError, Result};
use crate::sampling::seeded_source;
use crate::utils::consts::COMPLETION_GRACE_MS;

type Subscribers<T> = Vec<Arc<dyn PlaybackSubscriber<T>>>;

/// The single active-plan slot. Written by the controller, and by its worker
/// only while `plan_id` still names the worker's plan.
#[derive(Debug)]
struct Slot {
    plan_id: Option<u64>,
    state: PlaybackState,
    started_at: Option<Instant>,
    total: Duration,
    fired: usize,
    events: usize,
}

impl Slot {
    fn new() -> Self {
        Self {
            plan_id: None,
            state: PlaybackState::Idle,
            started_at: None,
            total: Duration::ZERO,
            fired: 0,
            events: 0,
        }
    }

    fn reset(&mut self, state: PlaybackState) {
        *self = Self::new();
        self.state = state;
    }
}

struct ActivePlan {
    id: u64,
    cancel_tx: Sender<()>,
    /// Cleared by `stop()`; the worker only emits while it holds this lock
    /// and the flag is still set.
    live: Arc<Mutex<bool>>,
    handle: JoinHandle<()>,
}

/// Runs one playback plan at a time and fans its events out to subscribers.
pub struct PlaybackController<T> {
    subscribers: Subscribers<T>,
    slot: Arc<Mutex<Slot>>,
    active: Option<ActivePlan>,
    next_id: u64,
    grace: Duration,
    voicing: Voicing,
}

impl<T> PlaybackController<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            slot: Arc::new(Mutex::new(Slot::new())),
            active: None,
            next_id: 1,
            grace: Duration::from_millis(COMPLETION_GRACE_MS),
            voicing: Voicing::default(),
        }
    }

    /// Wait after the last event before completing. Never shorter than the
    /// voicing's tone duration in practice.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn with_voicing(mut self, voicing: Voicing) -> Self {
        self.voicing = voicing;
        self
    }

    pub fn subscribe(&mut self, subscriber: Arc<dyn PlaybackSubscriber<T>>) {
        self.subscribers.push(subscriber);
    }

    /// Build a fresh plan and start firing it. An active plan is stopped
    /// first; two plans never run at once.
    pub fn start(&mut self, request: PlaybackRequest<T>) -> Result<u64> {
        if let Some(active_id) = self.active_plan_id() {
            let busy = EngineError::SchedulerBusy(active_id);
            debug!("{}, superseding it", busy);
            self.stop();
        }
        self.reap();

        let id = self.next_id;
        self.next_id += 1;
        self.set_slot(|slot| {
            slot.reset(PlaybackState::Scheduling);
            slot.plan_id = Some(id);
        });
        self.emit_state(id, PlaybackState::Scheduling);

        // Completion waits for the last tone to ring out
        let grace = self.grace.max(self.voicing.tone_duration());
        let mut rng = seeded_source(request.seed);
        let plan = match PlaybackPlan::build(
            id,
            request.sampler.as_ref(),
            request.decoder.as_deref(),
            request.count,
            request.interval,
            grace,
            &self.voicing,
            &mut rng,
        ) {
            Ok(plan) => plan,
            Err(err) => {
                error!("Failed to schedule plan {}: {}", id, err);
                self.set_slot(|slot| slot.reset(PlaybackState::Idle));
                self.emit_state(id, PlaybackState::Idle);
                return Err(err);
            }
        };

        info!(
            "Plan {} ({}): {} draws every {:?}, {:?} total",
            id,
            request.sampler.label(),
            plan.len(),
            plan.interval(),
            plan.duration()
        );

        let started_at = Instant::now();
        self.set_slot(|slot| {
            slot.state = PlaybackState::Running;
            slot.started_at = Some(started_at);
            slot.total = plan.duration();
            slot.events = plan.len();
        });
        self.emit_state(id, PlaybackState::Running);

        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded(1);
        let live = Arc::new(Mutex::new(true));
        let worker = Worker {
            plan,
            subscribers: self.subscribers.clone(),
            slot: self.slot.clone(),
            live: live.clone(),
            cancel_rx,
            started_at,
        };
        let handle = match thread::Builder::new()
            .name(format!("playback-{}", id))
            .spawn(move || worker.run())
        {
            Ok(handle) => handle,
            Err(err) => {
                error!("Failed to spawn playback worker: {}", err);
                self.set_slot(|slot| slot.reset(PlaybackState::Idle));
                self.emit_state(id, PlaybackState::Idle);
                return Err(err.into());
            }
        };

        self.active = Some(ActivePlan {
            id,
            cancel_tx,
            live,
            handle,
        });
        Ok(id)
    }

    /// Cancel pending events and in-flight audio. Always leaves the
    /// controller `Cancelled` and always tells subscribers to silence,
    /// even when the last plan already completed. No event of the stopped
    /// plan fires after this returns.
    pub fn stop(&mut self) {
        let cancelled = self.active.take().map(|active| {
            if let Ok(mut live) = active.live.lock() {
                *live = false;
            }
            let _ = active.cancel_tx.try_send(());
            if active.handle.join().is_err() {
                error!("Playback worker for plan {} panicked", active.id);
            }
            active.id
        });

        let was_running = self
            .slot
            .lock()
            .map(|slot| slot.plan_id.is_some() && slot.state.is_active())
            .unwrap_or(false);
        self.set_slot(|slot| slot.reset(PlaybackState::Cancelled));

        if let (Some(id), true) = (cancelled, was_running) {
            info!("Plan {} cancelled", id);
            self.emit_state(id, PlaybackState::Cancelled);
        }
        for subscriber in &self.subscribers {
            subscriber.on_stop();
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.slot
            .lock()
            .map(|slot| slot.state)
            .unwrap_or(PlaybackState::Idle)
    }

    pub fn is_running(&self) -> bool {
        self.state().is_active()
    }

    pub fn active_plan_id(&self) -> Option<u64> {
        self.slot
            .lock()
            .ok()
            .and_then(|slot| slot.plan_id)
    }

    pub fn progress(&self) -> Progress {
        let Ok(slot) = self.slot.lock() else {
            return Progress::default();
        };
        match (slot.state, slot.started_at) {
            (PlaybackState::Running, Some(started_at)) => Progress {
                elapsed: started_at.elapsed().min(slot.total),
                total: slot.total,
                fired: slot.fired,
                events: slot.events,
            },
            _ => Progress::default(),
        }
    }

    /// Join a worker that already finished on its own
    fn reap(&mut self) {
        if let Some(active) = self.active.take() {
            if active.handle.join().is_err() {
                error!("Playback worker for plan {} panicked", active.id);
            }
        }
    }

    fn set_slot(&self, f: impl FnOnce(&mut Slot)) {
        match self.slot.lock() {
            Ok(mut slot) => f(&mut slot),
            Err(err) => error!("Playback slot poisoned: {}", err),
        }
    }

    fn emit_state(&self, plan_id: u64, state: PlaybackState) {
        for subscriber in &self.subscribers {
            subscriber.on_state(plan_id, state);
        }
    }
}

impl<T> Default for PlaybackController<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for PlaybackController<T> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            if let Ok(mut live) = active.live.lock() {
                *live = false;
            }
            let _ = active.cancel_tx.try_send(());
            let _ = active.handle.join();
        }
    }
}

struct Worker<T> {
    plan: PlaybackPlan<T>,
    subscribers: Subscribers<T>,
    slot: Arc<Mutex<Slot>>,
    live: Arc<Mutex<bool>>,
    cancel_rx: Receiver<()>,
    started_at: Instant,
}

impl<T> Worker<T> {
    fn run(self) {
        let id = self.plan.id();
        let mut cursor = PlanCursor::new(&self.plan);

        loop {
            let now = self.started_at.elapsed();
            if cursor.is_finished(now) {
                break;
            }

            let deadline = cursor.next_deadline();
            if deadline > now {
                select! {
                    recv(self.cancel_rx) -> _ => {
                        debug!("Plan {} worker cancelled", id);
                        return;
                    }
                    recv(after(deadline - now)) -> _ => {}
                }
                continue;
            }

            for index in cursor.due(now) {
                let Ok(live) = self.live.lock() else { return };
                if !*live {
                    return;
                }
                let event = &self.plan.events()[index];
                debug!(
                    "Plan {} event {}: {} (p = {:.3})",
                    id,
                    index,
                    event.draw.bitstring,
                    event.draw.probability()
                );
                for subscriber in &self.subscribers {
                    subscriber.on_event(event);
                }
                self.update_slot(|slot| slot.fired = index + 1);
            }
        }

        let Ok(mut live) = self.live.lock() else { return };
        if !*live {
            return;
        }
        self.update_slot(|slot| slot.state = PlaybackState::Completed);
        for subscriber in &self.subscribers {
            subscriber.on_state(id, PlaybackState::Completed);
        }
        self.update_slot(|slot| slot.reset(PlaybackState::Idle));
        for subscriber in &self.subscribers {
            subscriber.on_state(id, PlaybackState::Idle);
        }
        *live = false;
        info!("Plan {} completed", id);
    }

    fn update_slot(&self, f: impl FnOnce(&mut Slot)) {
        if let Ok(mut slot) = self.slot.lock() {
            if slot.plan_id == Some(self.plan.id()) {
                f(&mut slot);
            }
        }
    }
}
