// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-synchronized animation scheduling core for multi-display
//! compositors.
//!
//! `cadence_core` decides *when* animation state advances — gated to the
//! display's vertical-sync signal — advances every display's animations in a
//! single transactional pass, and decides whether another frame must be
//! scheduled. It is `no_std` compatible (with `alloc`) and contains no
//! platform code.
//!
//! # Architecture
//!
//! The crate is organized around turning vsync callbacks into debounced
//! animation ticks:
//!
//! ```text
//!   vsync source ──► FrameScheduler (debounce, two rails)
//!                        │
//!                        ▼ compositor-sync point
//!   Animator::animate ──► DisplayRegistry (per display, in order)
//!                        │    └─► DisplayContent / RotationAnimation steps
//!                        ▼
//!   BulkUpdateFlags ──► layout traversal request
//! ```
//!
//! **[`schedule`]** — Two-rail debounce state machine: at most one armed
//! frame callback, at most one pending tick, effects returned as actions.
//!
//! **[`tick`]** — The [`Animator`](tick::Animator): the per-frame pass that
//! steps every display's animations inside one transaction scope and decides
//! whether to re-arm.
//!
//! **[`registry`]** — Per-display animator state, registration-ordered, with
//! guaranteed rotation-animation termination on removal.
//!
//! **[`hooks`]** — The window-system integration contract: trait seams for
//! display content, rotation animation, accessibility, drag, watermark, and
//! the transaction boundary.
//!
//! **[`flags`]** — Bulk-update flag accumulator consumed by the layout
//! subsystem after each tick.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) for tick boundaries and
//! edge-triggered animating spans.
//!
//! **[`time`]** / **[`display`]** — Timestamp and display-id newtypes.
//!
//! Threading, locking, and fault containment live in `cadence_runtime`;
//! human-readable and Chrome-trace diagnostics live in `cadence_debug`.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod display;
pub mod flags;
pub mod hooks;
pub mod registry;
pub mod schedule;
pub mod tick;
pub mod time;
pub mod trace;
