// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`ChromeTraceSink`] implements [`TraceSink`], accumulating events in
//! memory; [`export`](ChromeTraceSink::export) writes them as
//! [Chrome Trace Event Format][spec] JSON, suitable for loading into
//! `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
//!
//! Ticks become `B`/`E` duration events; the aggregate animating state
//! becomes an async `b`/`e` span; rotation completions become instants.
//! Timestamps are microseconds, converted from millisecond step times.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use cadence_core::time::StepTime;
use cadence_core::trace::{
    AnimatingEvent, RotationFinishedEvent, TickBeginEvent, TickEndEvent, TraceSink,
};

fn step_us(t: StepTime) -> u64 {
    t.as_millis() * 1_000
}

/// A [`TraceSink`] that accumulates Chrome trace events.
#[derive(Debug, Default)]
pub struct ChromeTraceSink {
    events: Vec<Value>,
}

impl ChromeTraceSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of accumulated events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns whether no events have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Writes the accumulated events as a Chrome trace JSON array.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn export(&self, writer: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *writer, &self.events)?;
        writer.flush()
    }
}

impl TraceSink for ChromeTraceSink {
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        self.events.push(json!({
            "ph": "B",
            "name": "tick",
            "cat": "Animator",
            "ts": step_us(e.now),
            "pid": 0,
            "tid": 0,
        }));
    }

    fn on_tick_end(&mut self, e: &TickEndEvent) {
        self.events.push(json!({
            "ph": "E",
            "name": "tick",
            "cat": "Animator",
            "ts": step_us(e.now),
            "pid": 0,
            "tid": 0,
            "args": {
                "animating": e.animating,
                "flags": format!("{}", e.flags),
            }
        }));
    }

    fn on_animating_begin(&mut self, e: &AnimatingEvent) {
        self.events.push(json!({
            "ph": "b",
            "id": 0,
            "name": "animating",
            "cat": "Animator",
            "ts": step_us(e.now),
            "pid": 0,
            "tid": 0,
        }));
    }

    fn on_animating_end(&mut self, e: &AnimatingEvent) {
        self.events.push(json!({
            "ph": "e",
            "id": 0,
            "name": "animating",
            "cat": "Animator",
            "ts": step_us(e.now),
            "pid": 0,
            "tid": 0,
        }));
    }

    fn on_rotation_finished(&mut self, e: &RotationFinishedEvent) {
        self.events.push(json!({
            "ph": "i",
            "name": "rotation_finished",
            "cat": "Animator",
            "ts": step_us(e.now),
            "pid": 0,
            "tid": 0,
            "s": "g",
            "args": {
                "display": e.display.0,
            }
        }));
    }
}
