// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Execution context for the cadence animation core.
//!
//! `cadence_core` is a passive state machine; this crate supplies the
//! threading, locking, and fault-containment around it:
//!
//! **[`thread`]** — [`AnimationThread`](thread::AnimationThread): one
//! dedicated background thread runs both the vsync-callback handler and the
//! tick, fed by a command channel and serialized against the rest of the
//! window manager by one shared [`parking_lot::Mutex`].
//!
//! **[`runner`]** — [`run_tick`](runner::run_tick): executes a tick with
//! collaborator panics contained at the tick boundary, typed as
//! [`TickFault`](runner::TickFault) and logged through the [`log`] facade.
//! Nothing propagates to the caller; a fault costs at most one frame.
//!
//! The division of labor mirrors the core/backend split: the core owns the
//! algorithm, this crate owns the platform-facing execution concerns.

pub mod runner;
pub mod thread;
