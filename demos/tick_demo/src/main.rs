// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated vsync loop that exercises the animation scheduler end to end.
//!
//! Drives 60 synthetic frames through the two-rail schedule (frame callback,
//! then compositor-sync tick) against a fake two-display window system: the
//! primary display runs a dim-layer fade for the first 20 frames, and the
//! secondary display finishes a rotation animation after 10 steps. Events go
//! to a [`ChromeTraceSink`] exported as `trace.json`; progress goes to the
//! `log` facade (`RUST_LOG=info` to see it).

use std::fs::File;
use std::io::BufWriter;

use cadence_core::display::DisplayId;
use cadence_core::flags::{BulkUpdateFlags, LayoutChanges};
use cadence_core::hooks::{DisplayContent, RotationAnimation, WindowSystem};
use cadence_core::schedule::ScheduleAction;
use cadence_core::tick::{AnimationSession, Animator};
use cadence_core::time::{FrameTime, StepTime};
use cadence_debug::chrome::ChromeTraceSink;
use cadence_runtime::runner::{self, TickResult};

const FRAME_COUNT: u64 = 60;
/// 16.6ms refresh interval in nanoseconds (≈60 Hz).
const REFRESH_INTERVAL_NS: u64 = 16_666_667;
/// The dim-layer fade on the primary display ends at this frame.
const DIM_FADE_FRAMES: u64 = 20;
/// The rotation animation on the secondary display ends after this many
/// steps.
const ROTATION_FRAMES: u32 = 10;

#[derive(Debug)]
struct SimRotation {
    frames_left: u32,
}

impl RotationAnimation for SimRotation {
    fn is_active(&self) -> bool {
        true
    }

    fn step(&mut self, _now: StepTime) -> bool {
        if self.frames_left == 0 {
            return false;
        }
        self.frames_left -= 1;
        true
    }

    fn terminate(&mut self) {
        log::info!("rotation animation terminated");
    }

    fn update_surfaces(&mut self) {}
}

struct SimDisplay {
    id: DisplayId,
    dim_frames_left: u64,
    pending: LayoutChanges,
}

impl DisplayContent for SimDisplay {
    fn step_app_animations(&mut self, _now: StepTime) {}

    fn update_window_animations(&mut self, _session: &mut AnimationSession) {}

    fn update_wallpaper_animation(&mut self, _session: &mut AnimationSession) {}

    fn prepare_surfaces(&mut self) {}

    fn check_ready_to_show(&mut self) {}

    fn animate_dim_layers(&mut self) -> bool {
        if self.dim_frames_left == 0 {
            return false;
        }
        self.dim_frames_left -= 1;
        true
    }

    fn animate_divider(&mut self, _now: StepTime) -> bool {
        false
    }

    fn has_pending_layout_changes(&self) -> bool {
        false
    }

    fn copy_flags_to_layout_params(&mut self, flags: BulkUpdateFlags) -> bool {
        self.pending.merge(LayoutChanges(flags.bits()));
        false
    }

    fn pending_layout_changes(&self) -> LayoutChanges {
        self.pending
    }

    fn or_pending_layout_changes(&mut self, changes: LayoutChanges) {
        self.pending.merge(changes);
    }

    fn is_primary(&self) -> bool {
        self.id == DisplayId::PRIMARY
    }
}

struct SimSystem {
    displays: Vec<SimDisplay>,
    traversals: u32,
}

impl WindowSystem for SimSystem {
    fn open_surface_transaction(&mut self) {}

    fn close_surface_transaction(&mut self) {}

    fn display_content(&mut self, id: DisplayId) -> Option<&mut dyn DisplayContent> {
        self.displays
            .iter_mut()
            .find(|display| display.id == id)
            .map(|display| display as &mut dyn DisplayContent)
    }

    fn request_traversal(&mut self) {
        self.traversals += 1;
    }

    fn purge_replaced_windows(&mut self) {}

    fn release_unused_surfaces(&mut self) {}
}

fn main() {
    env_logger::init();

    let mut ws = SimSystem {
        displays: vec![
            SimDisplay {
                id: DisplayId::PRIMARY,
                dim_frames_left: DIM_FADE_FRAMES,
                pending: LayoutChanges::NONE,
            },
            SimDisplay {
                id: DisplayId(1),
                dim_frames_left: 0,
                pending: LayoutChanges::NONE,
            },
        ],
        traversals: 0,
    };

    let mut animator = Animator::new();
    animator.add_display(DisplayId::PRIMARY);
    animator.add_display(DisplayId(1));
    animator.set_rotation_animation(
        DisplayId(1),
        Some(Box::new(SimRotation {
            frames_left: ROTATION_FRAMES,
        })),
    );

    let mut sink = ChromeTraceSink::new();

    // Simulated rails: one pending frame callback, one pending tick.
    let mut callback_armed = false;
    let mut tick_armed = false;
    let mut now_ns: u64 = 1_000_000_000;
    let mut ticks_run: u64 = 0;

    if animator.request_frame() == ScheduleAction::ArmFrameCallback {
        callback_armed = true;
    }

    for frame in 0..FRAME_COUNT {
        now_ns += REFRESH_INTERVAL_NS;

        // vsync-app rail.
        if callback_armed {
            callback_armed = false;
            if let ScheduleAction::ArmTick(_) = animator.frame_callback(FrameTime(now_ns)) {
                tick_armed = true;
            }
        }

        // vsync-sf rail, slightly later in the same frame interval.
        if tick_armed {
            tick_armed = false;
            let Some(frame_time) = animator.begin_tick() else {
                continue;
            };
            let result = runner::run_tick(&mut animator, &mut ws, frame_time, &mut sink);
            ticks_run += 1;
            match result {
                TickResult::Completed(report) => {
                    if report.schedule == ScheduleAction::ArmFrameCallback {
                        callback_armed = true;
                    } else {
                        log::info!("animation drained at frame {frame}");
                    }
                }
                TickResult::Faulted(fault) => log::warn!("{fault}"),
            }
        }
    }

    let mut dump = String::new();
    animator
        .dump(&mut dump)
        .expect("dump to a String cannot fail");
    print!("{dump}");
    println!(
        "ran {ticks_run} ticks over {FRAME_COUNT} frames, {} traversals",
        ws.traversals
    );

    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    sink.export(&mut writer).expect("failed to write trace");
    println!("Wrote {path}");
}
