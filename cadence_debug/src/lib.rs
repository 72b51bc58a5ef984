// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics for the cadence animation tick.
//!
//! Two [`TraceSink`](cadence_core::trace::TraceSink) implementations:
//!
//! **[`pretty`]** — one human-readable line per event, for terminals and
//! log files.
//!
//! **[`chrome`]** — Chrome Trace Event Format export, for
//! `chrome://tracing` and Perfetto.

pub mod chrome;
pub mod pretty;
