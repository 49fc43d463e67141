//! Press-and-hold rotation with accelerating speed tiers.
//!
//! The controller never schedules anything itself. The host drives it from its
//! frame or timer callback with a monotonic timestamp and the [`TickHandle`]
//! returned by [`RotationController::press`]; a tick carrying a stale handle is
//! reported as [`TickOutcome::Stopped`] and mutates nothing, so a loop that
//! outlives its gesture stops on its next callback.

use std::time::Duration;

use crate::viewport::{ViewId, ViewportStore};

/// Step applied immediately on press, before any tier kicks in.
pub const TAP_STEP_DEG: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationTier {
    pub level: u8,
    pub step_deg: f64,
    pub interval: Duration,
}

const HOLD_DELAY: Duration = Duration::from_millis(400);

const TIERS: [(Duration, RotationTier); 3] = [
    (
        Duration::from_millis(1000),
        RotationTier {
            level: 1,
            step_deg: 0.1,
            interval: Duration::from_millis(100),
        },
    ),
    (
        Duration::from_millis(2000),
        RotationTier {
            level: 2,
            step_deg: 1.0,
            interval: Duration::from_millis(50),
        },
    ),
    (
        Duration::MAX,
        RotationTier {
            level: 3,
            step_deg: 5.0,
            interval: Duration::from_millis(25),
        },
    ),
];

/// Speed tier for a hold of `elapsed`; `None` while still inside the initial delay.
pub fn tier_for_elapsed(elapsed: Duration) -> Option<RotationTier> {
    if elapsed <= HOLD_DELAY {
        return None;
    }
    TIERS
        .iter()
        .find(|(upper, _)| elapsed <= *upper)
        .map(|(_, tier)| *tier)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    CounterClockwise,
    Clockwise,
}

impl RotationDirection {
    pub const fn sign(self) -> f64 {
        match self {
            Self::CounterClockwise => -1.0,
            Self::Clockwise => 1.0,
        }
    }
}

/// Identifies one press-and-hold gesture's tick loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationState {
    Idle,
    Ramping {
        view: ViewId,
        direction: RotationDirection,
        handle: TickHandle,
        started_at: Duration,
        last_step_at: Duration,
        tier_level: u8,
    },
}

#[derive(Debug)]
pub struct RotationController {
    state: RotationState,
    next_handle: u64,
}

impl Default for RotationController {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationController {
    pub const fn new() -> Self {
        Self {
            state: RotationState::Idle,
            next_handle: 0,
        }
    }

    pub const fn state(&self) -> RotationState {
        self.state
    }

    pub const fn is_active(&self) -> bool {
        matches!(self.state, RotationState::Ramping { .. })
    }

    /// Starts a gesture: rotates one tap step right away and returns the handle
    /// the host must pass to every [`tick`](Self::tick) of this gesture.
    pub fn press(
        &mut self,
        store: &mut ViewportStore,
        view: ViewId,
        direction: RotationDirection,
        now: Duration,
    ) -> TickHandle {
        if self.is_active() {
            self.release();
        }
        self.next_handle = self.next_handle.wrapping_add(1);
        let handle = TickHandle(self.next_handle);
        let rotation = store.rotate_by(view, TAP_STEP_DEG * direction.sign());
        tracing::debug!(%view, ?direction, rotation, "rotation press");

        self.state = RotationState::Ramping {
            view,
            direction,
            handle,
            started_at: now,
            last_step_at: now,
            tier_level: 0,
        };
        handle
    }

    pub fn tick(
        &mut self,
        store: &mut ViewportStore,
        handle: TickHandle,
        now: Duration,
    ) -> TickOutcome {
        let RotationState::Ramping {
            view,
            direction,
            handle: active,
            started_at,
            last_step_at,
            tier_level,
        } = self.state
        else {
            return TickOutcome::Stopped;
        };
        if active != handle {
            return TickOutcome::Stopped;
        }

        let Some(tier) = tier_for_elapsed(now.saturating_sub(started_at)) else {
            return TickOutcome::Continue;
        };
        if tier.level != tier_level {
            tracing::debug!(%view, level = tier.level, "rotation speed tier changed");
        }

        let mut next_step_at = last_step_at;
        if now.saturating_sub(last_step_at) > tier.interval {
            store.rotate_by(view, tier.step_deg * direction.sign());
            next_step_at = now;
        }

        self.state = RotationState::Ramping {
            view,
            direction,
            handle,
            started_at,
            last_step_at: next_step_at,
            tier_level: tier.level,
        };
        TickOutcome::Continue
    }

    /// Ends the gesture on pointer-up or pointer-leave. Returns whether one was active.
    pub fn release(&mut self) -> bool {
        let was_active = self.is_active();
        if let RotationState::Ramping { view, .. } = self.state {
            tracing::debug!(%view, "rotation released");
        }
        self.state = RotationState::Idle;
        was_active
    }
}
