// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-rail frame scheduling with debounce.
//!
//! The compositor exposes two distinct timing rails: the raw vsync signal
//! (where the frame callback fires) and the compositor-sync point (where the
//! animation tick must actually run, offset from vsync so surface commits
//! land inside the compositor's window). [`FrameScheduler`] debounces both:
//! at most one frame callback is armed at a time, and at most one tick is
//! pending at a time. A burst of frame requests collapses into a single
//! callback; a burst of callbacks collapses into a single tick carrying the
//! latest timestamp. This guarantees an animation never double-advances
//! within one frame.
//!
//! The scheduler is a pure state machine: every input goes through one
//! transition function ([`apply`](FrameScheduler::apply)) and effects are
//! returned as a [`ScheduleAction`] for the caller to dispatch, never
//! performed directly. The driver in `cadence_runtime` wires the actions to
//! the real vsync source; tests feed events and assert on the actions.

use crate::time::FrameTime;

/// Where the scheduler is in the frame-callback → tick pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchedulePhase {
    /// Nothing armed on either rail.
    Idle,
    /// A frame callback is registered with the vsync source.
    FrameCallbackPending,
    /// A tick is registered to run at the next compositor-sync point.
    TickPending,
}

/// An input to the scheduling state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScheduleEvent {
    /// Something needs an animation step on the next frame.
    FrameRequested,
    /// The vsync frame callback fired with this frame timestamp.
    FrameCallback(FrameTime),
}

/// An effect the caller must dispatch after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScheduleAction {
    /// Nothing to do.
    None,
    /// Register a frame callback with the vsync source.
    ArmFrameCallback,
    /// Register the tick to run at the next compositor-sync point, carrying
    /// the recorded frame timestamp.
    ArmTick(FrameTime),
}

/// Debounced scheduling state for the vsync and compositor-sync rails.
///
/// # Invariants
///
/// - At most one frame callback is armed at a time ([`ScheduleAction::ArmFrameCallback`]
///   is produced only on the `Idle → FrameCallbackPending` edge).
/// - At most one tick is pending at a time ([`ScheduleAction::ArmTick`] only on
///   `FrameCallbackPending → TickPending`).
/// - The pending frame timestamp is meaningful only in
///   [`SchedulePhase::TickPending`].
#[derive(Debug)]
pub struct FrameScheduler {
    phase: SchedulePhase,
    pending_frame_time: FrameTime,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: SchedulePhase::Idle,
            pending_frame_time: FrameTime::ZERO,
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> SchedulePhase {
        self.phase
    }

    /// Returns whether anything is armed on either rail.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        !matches!(self.phase, SchedulePhase::Idle)
    }

    /// Returns the recorded frame timestamp while a tick is pending.
    #[must_use]
    pub const fn pending_frame_time(&self) -> Option<FrameTime> {
        match self.phase {
            SchedulePhase::TickPending => Some(self.pending_frame_time),
            _ => None,
        }
    }

    /// The transition function. Consumes one event, updates the phase, and
    /// returns the effect to dispatch.
    pub fn apply(&mut self, event: ScheduleEvent) -> ScheduleAction {
        match (self.phase, event) {
            (SchedulePhase::Idle, ScheduleEvent::FrameRequested) => {
                self.phase = SchedulePhase::FrameCallbackPending;
                ScheduleAction::ArmFrameCallback
            }
            // Already armed: idempotent.
            (SchedulePhase::FrameCallbackPending, ScheduleEvent::FrameRequested) => {
                ScheduleAction::None
            }
            // A tick is about to run and steps every animation; it re-arms
            // at tick end if anything is still animating.
            (SchedulePhase::TickPending, ScheduleEvent::FrameRequested) => ScheduleAction::None,
            (SchedulePhase::FrameCallbackPending, ScheduleEvent::FrameCallback(t)) => {
                self.phase = SchedulePhase::TickPending;
                self.pending_frame_time = t;
                ScheduleAction::ArmTick(t)
            }
            // Collapse: the pending tick picks up the newest timestamp.
            (SchedulePhase::TickPending, ScheduleEvent::FrameCallback(t)) => {
                self.pending_frame_time = t;
                ScheduleAction::None
            }
            // Stale callback after the pipeline already drained.
            (SchedulePhase::Idle, ScheduleEvent::FrameCallback(_)) => ScheduleAction::None,
        }
    }

    /// Acknowledges tick execution: leaves [`SchedulePhase::TickPending`] and
    /// returns the recorded frame timestamp. Returns `None` (and stays put)
    /// in any other phase.
    pub fn begin_tick(&mut self) -> Option<FrameTime> {
        match self.phase {
            SchedulePhase::TickPending => {
                self.phase = SchedulePhase::Idle;
                Some(self.pending_frame_time)
            }
            _ => None,
        }
    }
}
