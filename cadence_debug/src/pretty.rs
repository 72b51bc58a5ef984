// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use cadence_core::trace::{
    AnimatingEvent, RotationFinishedEvent, TickBeginEvent, TickEndEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_tick_begin(&mut self, e: &TickBeginEvent) {
        let _ = writeln!(self.writer, "[tick:begin] t={}", e.now);
    }

    fn on_tick_end(&mut self, e: &TickEndEvent) {
        let _ = writeln!(
            self.writer,
            "[tick:end] t={} animating={} flags=[{}]",
            e.now, e.animating, e.flags,
        );
    }

    fn on_animating_begin(&mut self, e: &AnimatingEvent) {
        let _ = writeln!(self.writer, "[animating:begin] t={}", e.now);
    }

    fn on_animating_end(&mut self, e: &AnimatingEvent) {
        let _ = writeln!(self.writer, "[animating:end] t={}", e.now);
    }

    fn on_rotation_finished(&mut self, e: &RotationFinishedEvent) {
        let _ = writeln!(
            self.writer,
            "[rotation:finished] display={} t={}",
            e.display, e.now,
        );
    }
}
