// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The dedicated animation thread.
//!
//! One background thread runs both the vsync-callback handler and the tick;
//! all windowing-state mutation happens there, serialized by one
//! [`parking_lot::Mutex`] shared with the window-management side through
//! [`AnimationThread::lock`]. The thread never polls: it blocks on a command
//! channel that the external vsync driver and the window manager push into.
//!
//! # Wiring
//!
//! ```text
//!   window manager ── RequestFrame ──► channel ──► animator.request_frame()
//!                                                      │ ArmFrameCallback
//!   vsync driver   ◄──────────────────────────────────┘
//!   vsync driver   ── Vsync(t) ──────► channel ──► animator.frame_callback(t)
//!                                                      │ ArmTick
//!   vsync driver   ◄──────────────────────────────────┘
//!   vsync driver   ── CompositorSync ► channel ──► begin_tick + run_tick
//! ```
//!
//! The two `schedule_*` calls on [`VsyncDriver`] correspond to the two
//! timing rails: the raw vsync signal and the compositor-sync point offset
//! from it. The driver answers each by eventually pushing the matching
//! command back into the channel.
//!
//! Ticks execute strictly in the order their frame timestamps were observed:
//! the scheduler admits at most one pending tick, and this thread is the
//! only consumer.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{Receiver, Sender, unbounded};
use parking_lot::{Mutex, MutexGuard};

use cadence_core::hooks::WindowSystem;
use cadence_core::schedule::ScheduleAction;
use cadence_core::tick::Animator;
use cadence_core::time::FrameTime;
use cadence_core::trace::TraceSink;

use crate::runner::{self, TickResult};

/// Runtime tuning for the animation thread.
#[derive(Clone, Copy, Debug)]
pub struct RuntimeConfig {
    /// Log tick entry/exit at trace severity.
    pub log_ticks: bool,
}

impl RuntimeConfig {
    /// The default configuration: quiet ticks.
    #[must_use]
    pub const fn new() -> Self {
        Self { log_ticks: false }
    }

    /// Enables tick entry/exit logging.
    #[must_use]
    pub const fn with_tick_logging(mut self) -> Self {
        self.log_ticks = true;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The external compositor's two timing rails.
///
/// Implementations answer each `schedule_*` call by pushing the matching
/// command ([`Command::Vsync`] / [`Command::CompositorSync`]) into the
/// animation thread once the corresponding point in time arrives.
pub trait VsyncDriver: Send {
    /// Registers a one-shot frame callback with the vsync source.
    fn schedule_frame_callback(&mut self);

    /// Registers the pending tick to run at the next compositor-sync point.
    fn schedule_compositor_sync(&mut self);
}

/// A command processed by the animation thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Something needs an animation step on the next frame.
    RequestFrame,
    /// The vsync frame callback fired with this timestamp.
    Vsync(FrameTime),
    /// The compositor-sync point arrived; run the pending tick.
    CompositorSync,
    /// Drain and exit the thread.
    Shutdown,
}

/// The state guarded by the global window-management lock.
#[derive(Debug)]
pub struct Locked<W> {
    /// The animation scheduler.
    pub animator: Animator,
    /// The windowing system the ticks drive.
    pub system: W,
}

/// Handle to the dedicated animation thread.
///
/// Cloning the [`commands`](Self::commands) sender gives vsync drivers and
/// the window manager a way to push work; [`lock`](Self::lock) exposes the
/// shared state for window-management mutation under the same lock the ticks
/// use.
#[derive(Debug)]
pub struct AnimationThread<W> {
    state: Arc<Mutex<Locked<W>>>,
    sender: Sender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl<W: WindowSystem + Send + 'static> AnimationThread<W> {
    /// Spawns the animation thread around `system`.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn<D, T>(system: W, driver: D, tracer: T, config: RuntimeConfig) -> io::Result<Self>
    where
        D: VsyncDriver + 'static,
        T: TraceSink + Send + 'static,
    {
        let state = Arc::new(Mutex::new(Locked {
            animator: Animator::new(),
            system,
        }));
        let (sender, receiver) = unbounded();
        let loop_state = Arc::clone(&state);
        let handle = thread::Builder::new()
            .name(String::from("cadence-animation"))
            .spawn(move || run_loop(&loop_state, &receiver, driver, tracer, config))?;

        Ok(Self {
            state,
            sender,
            handle: Some(handle),
        })
    }

    /// Returns a sender for pushing commands into the thread.
    #[must_use]
    pub fn commands(&self) -> Sender<Command> {
        self.sender.clone()
    }

    /// Acquires the global lock shared between ticks and window management.
    pub fn lock(&self) -> MutexGuard<'_, Locked<W>> {
        self.state.lock()
    }

    /// Asks the thread to drain pending commands and exit, then joins it.
    pub fn shutdown(mut self) {
        let _ = self.sender.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_loop<W, D, T>(
    state: &Arc<Mutex<Locked<W>>>,
    receiver: &Receiver<Command>,
    mut driver: D,
    mut tracer: T,
    config: RuntimeConfig,
) where
    W: WindowSystem + Send + 'static,
    D: VsyncDriver + 'static,
    T: TraceSink + Send + 'static,
{
    for command in receiver.iter() {
        match command {
            Command::RequestFrame => {
                let action = state.lock().animator.request_frame();
                dispatch(&mut driver, action);
            }
            Command::Vsync(frame_time) => {
                let action = state.lock().animator.frame_callback(frame_time);
                dispatch(&mut driver, action);
            }
            Command::CompositorSync => {
                let mut guard = state.lock();
                let Some(frame_time) = guard.animator.begin_tick() else {
                    continue;
                };
                if config.log_ticks {
                    log::trace!("tick begin: {frame_time:?}");
                }
                let locked = &mut *guard;
                let result = runner::run_tick(
                    &mut locked.animator,
                    &mut locked.system,
                    frame_time,
                    &mut tracer,
                );
                let action = match &result {
                    TickResult::Completed(report) => {
                        if config.log_ticks {
                            log::trace!(
                                "tick end: animating={} flags=[{}]",
                                report.animating,
                                report.flags
                            );
                        }
                        report.schedule
                    }
                    TickResult::Faulted(_) => ScheduleAction::None,
                };
                drop(guard);
                dispatch(&mut driver, action);
            }
            Command::Shutdown => break,
        }
    }
}

fn dispatch(driver: &mut dyn VsyncDriver, action: ScheduleAction) {
    match action {
        ScheduleAction::None => {}
        ScheduleAction::ArmFrameCallback => driver.schedule_frame_callback(),
        ScheduleAction::ArmTick(_) => driver.schedule_compositor_sync(),
    }
}
