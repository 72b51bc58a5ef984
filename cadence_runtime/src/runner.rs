// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tick execution with fault containment.
//!
//! A collaborator panic during a tick must cost at most one dropped frame,
//! never the scheduler. [`run_tick`] wraps [`Animator::animate`] in
//! [`catch_unwind`](std::panic::catch_unwind): the transaction scope inside
//! the tick closes during unwinding, the fault is converted to a typed
//! [`TickFault`], logged at error severity, and swallowed. The animator and
//! window system stay usable — the session keeps whatever was aggregated
//! before the fault, and the next frame request proceeds normally.
//!
//! Requires the default `panic = "unwind"` strategy; under `panic = "abort"`
//! a collaborator panic takes the process down before containment can run.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use cadence_core::hooks::WindowSystem;
use cadence_core::tick::{Animator, StepReport};
use cadence_core::time::FrameTime;
use cadence_core::trace::TraceSink;
use thiserror::Error;

/// A fault contained at the tick boundary.
#[derive(Debug, Error)]
pub enum TickFault {
    /// A collaborator panicked mid-tick. Carries the panic message when one
    /// was provided.
    #[error("animation tick panicked: {0}")]
    Panicked(String),
}

/// The outcome of one contained tick.
#[derive(Debug)]
pub enum TickResult {
    /// The tick ran to completion.
    Completed(StepReport),
    /// The tick aborted mid-way; the transaction was still closed and the
    /// scheduler keeps running on the next frame.
    Faulted(TickFault),
}

impl TickResult {
    /// Returns the completed report, if the tick did not fault.
    #[must_use]
    pub fn report(&self) -> Option<&StepReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Faulted(_) => None,
        }
    }
}

/// Runs one animation tick, containing any collaborator panic.
///
/// Must be called with the global window-management lock held, like
/// [`Animator::animate`] itself.
pub fn run_tick<W: WindowSystem + ?Sized>(
    animator: &mut Animator,
    ws: &mut W,
    frame_time: FrameTime,
    tracer: &mut dyn TraceSink,
) -> TickResult {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| animator.animate(ws, frame_time, tracer)));
    match outcome {
        Ok(report) => TickResult::Completed(report),
        Err(payload) => {
            let fault = TickFault::Panicked(panic_message(payload.as_ref()));
            log::error!("{fault}; dropping this frame");
            TickResult::Faulted(fault)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("(non-string panic payload)")
    }
}
