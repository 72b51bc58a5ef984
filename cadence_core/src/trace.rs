// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing for the animation tick.
//!
//! [`TraceSink`] receives one event per tick boundary plus edge-triggered
//! markers for the aggregate animating state: when the OR-aggregation flips
//! from idle to animating, exactly one [`on_animating_begin`] fires, and when
//! it flips back, exactly one [`on_animating_end`]. Sinks that chart frame
//! activity (see `cadence_debug`) turn those two into a span.
//!
//! All methods default to no-ops; implement only the events you care about.
//!
//! [`on_animating_begin`]: TraceSink::on_animating_begin
//! [`on_animating_end`]: TraceSink::on_animating_end

use crate::display::DisplayId;
use crate::flags::BulkUpdateFlags;
use crate::time::StepTime;

/// Emitted when a tick starts advancing animation state.
#[derive(Clone, Copy, Debug)]
pub struct TickBeginEvent {
    /// The step time every animation advances to in this tick.
    pub now: StepTime,
}

/// Emitted after a tick has finished, with its aggregate results.
#[derive(Clone, Copy, Debug)]
pub struct TickEndEvent {
    /// The tick's step time.
    pub now: StepTime,
    /// Whether anything is still animating after this tick.
    pub animating: bool,
    /// The bulk-update flags the tick produced.
    pub flags: BulkUpdateFlags,
}

/// Marks an edge of the aggregate animating state.
#[derive(Clone, Copy, Debug)]
pub struct AnimatingEvent {
    /// The step time of the tick at which the edge was observed.
    pub now: StepTime,
}

/// Emitted when a display's rotation animation completes naturally.
#[derive(Clone, Copy, Debug)]
pub struct RotationFinishedEvent {
    /// The display whose rotation animation finished.
    pub display: DisplayId,
    /// The step time of the completing tick.
    pub now: StepTime,
}

/// Receives trace events from the animation tick.
pub trait TraceSink {
    /// Called when a tick starts.
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        _ = e;
    }

    /// Called when a tick ends (not called for faulted ticks).
    fn on_tick_end(&mut self, e: &TickEndEvent) {
        _ = e;
    }

    /// Called when the aggregate animating state flips idle → animating.
    fn on_animating_begin(&mut self, e: &AnimatingEvent) {
        _ = e;
    }

    /// Called when the aggregate animating state flips animating → idle.
    fn on_animating_end(&mut self, e: &AnimatingEvent) {
        _ = e;
    }

    /// Called when a rotation animation completes naturally.
    fn on_rotation_finished(&mut self, e: &RotationFinishedEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}
