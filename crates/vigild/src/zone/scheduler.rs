//! Delayed-activation timer.
//!
//! At most one pending timer per zone. Arming replaces any pending timer;
//! arming with zero seconds is the cancellation form. Cancellation is
//! race-free against a timer that already fired: the spawned task
//! re-checks its generation under the zone lock before committing, so a
//! replaced or cancelled timer is a no-op even when its sleep already
//! elapsed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

use super::controller::ZoneController;

pub(crate) struct ActivationScheduler {
    /// Bumped on every arm/cancel; a timer task only commits while its
    /// generation is still current.
    generation: AtomicU64,
    /// Delay of the pending activation, 0 = none. Status reporting only.
    pending_secs: AtomicU64,
}

impl ActivationScheduler {
    pub(crate) fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            pending_secs: AtomicU64::new(0),
        }
    }

    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub(crate) fn pending(&self) -> Option<u64> {
        match self.pending_secs.load(Ordering::SeqCst) {
            0 => None,
            secs => Some(secs),
        }
    }
}

impl ZoneController {
    /// Cancels any pending delayed activation. Idempotent.
    pub(crate) fn cancel_activation_timer(&self) {
        self.scheduler.bump();
        self.scheduler.pending_secs.store(0, Ordering::SeqCst);
    }

    /// Schedules the delayed-activation commit, replacing any pending
    /// timer. `delay_secs == 0` cancels instead.
    pub(crate) fn arm_activation_timer(&self, delay_secs: u64) {
        if delay_secs == 0 {
            self.cancel_activation_timer();
            return;
        }
        let generation = self.scheduler.bump();
        self.scheduler.pending_secs.store(delay_secs, Ordering::SeqCst);
        let Some(zone) = self.self_ref.upgrade() else {
            return;
        };
        debug!(delay_secs, "delayed activation scheduled");
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(delay_secs)).await;
            let mut inner = zone.inner.lock().await;
            if !zone.scheduler.is_current(generation) {
                debug!("stale activation timer ignored");
                return;
            }
            zone.start_activation_locked(&mut inner).await;
        });
    }
}
