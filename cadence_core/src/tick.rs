// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The animation tick.
//!
//! [`Animator`] owns the scheduling state machine, the per-display registry,
//! and the [`AnimationSession`], and advances the whole system one frame at a
//! time in [`animate`](Animator::animate):
//!
//! ```text
//!   vsync source ──► FrameScheduler ──► animate(frame_time)
//!                                           │ open transaction (scoped)
//!                                           │ pass 1: per-display step
//!                                           │ pass 2: dependent effects
//!                                           │ drag, re-arm, watermark
//!                                           │ close transaction (guaranteed)
//!                                           ▼
//!                                       layout traversal / trace edges
//! ```
//!
//! The two passes are split so that every display's primary animation state
//! is settled before dependent effects (ready-to-show checks, rotation
//! surface pushes, dim layers) run on any display. Displays are visited in
//! registration order in both passes.
//!
//! A collaborator panic unwinds out of `animate`; the transaction scope
//! closes on the way out, and the caller (see `cadence_runtime`) contains the
//! fault at the tick boundary. The [`AnimationSession`] keeps whatever was
//! aggregated before the fault.

use alloc::boxed::Box;
use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::display::DisplayId;
use crate::flags::{BulkUpdateFlags, LayoutChanges};
use crate::hooks::{RotationAnimation, WindowSystem};
use crate::registry::DisplayRegistry;
use crate::schedule::{FrameScheduler, ScheduleAction, ScheduleEvent};
use crate::time::{FrameTime, StepTime};
use crate::trace::{
    AnimatingEvent, RotationFinishedEvent, TickBeginEvent, TickEndEvent, TraceSink,
};

/// Aggregate state of one animation step.
///
/// Conceptually per-tick: every field except
/// [`transaction_sequence`](Self::transaction_sequence) is reset when a tick
/// starts. The struct lives on the [`Animator`] between ticks so that a
/// faulted tick leaves its partial aggregation observable and the dump can
/// render the most recent step.
#[derive(Debug)]
pub struct AnimationSession {
    /// The step time of the current (or most recent) tick.
    pub frame_time: StepTime,
    /// Bulk-update flags accumulated during the tick.
    pub flags: BulkUpdateFlags,
    /// Whether anything stepped in this tick is still animating.
    pub animating: bool,
    /// Whether any app window is still animating.
    pub app_animating: bool,
    /// Monotonic counter, incremented once per display per tick. Window
    /// state uses it to skip repeated per-tick initialization.
    pub transaction_sequence: u64,
}

impl AnimationSession {
    const fn new() -> Self {
        Self {
            frame_time: StepTime::ZERO,
            flags: BulkUpdateFlags::NONE,
            animating: false,
            app_animating: false,
            transaction_sequence: 0,
        }
    }

    /// ORs `animating` into the aggregate animating state.
    #[inline]
    pub const fn or_animating(&mut self, animating: bool) {
        self.animating = self.animating || animating;
    }

    /// ORs `animating` into the app-window animating state.
    #[inline]
    pub const fn or_app_animating(&mut self, animating: bool) {
        self.app_animating = self.app_animating || animating;
    }
}

/// The outcome of one [`Animator::animate`] call.
#[derive(Clone, Copy, Debug)]
pub struct StepReport {
    /// The tick ran before initialization and did nothing.
    pub skipped: bool,
    /// Whether anything is still animating after this tick.
    pub animating: bool,
    /// Whether any app window is still animating.
    pub app_animating: bool,
    /// The bulk-update flags the tick produced.
    pub flags: BulkUpdateFlags,
    /// Whether the tick requested a layout traversal.
    pub requested_traversal: bool,
    /// Scheduling effect for the caller to dispatch: arms the next frame
    /// callback while anything is still animating.
    pub schedule: ScheduleAction,
}

impl StepReport {
    const fn skipped() -> Self {
        Self {
            skipped: true,
            animating: false,
            app_animating: false,
            flags: BulkUpdateFlags::NONE,
            requested_traversal: false,
            schedule: ScheduleAction::None,
        }
    }
}

/// Scoped surface-transaction acquisition.
///
/// Opens on construction and closes in `Drop`, so the transaction is closed
/// on every exit path out of the tick, including unwinding.
struct TransactionScope<'a, W: WindowSystem + ?Sized> {
    ws: &'a mut W,
}

impl<'a, W: WindowSystem + ?Sized> TransactionScope<'a, W> {
    fn new(ws: &'a mut W) -> Self {
        ws.open_surface_transaction();
        Self { ws }
    }
}

impl<W: WindowSystem + ?Sized> Deref for TransactionScope<'_, W> {
    type Target = W;

    fn deref(&self) -> &W {
        self.ws
    }
}

impl<W: WindowSystem + ?Sized> DerefMut for TransactionScope<'_, W> {
    fn deref_mut(&mut self) -> &mut W {
        self.ws
    }
}

impl<W: WindowSystem + ?Sized> Drop for TransactionScope<'_, W> {
    fn drop(&mut self) {
        self.ws.close_surface_transaction();
    }
}

/// Frame-synchronized animation scheduler for a multi-display windowing
/// system.
///
/// Owned by the windowing-system root and constructed once. Displays are
/// registered as they appear; adding [`DisplayId::PRIMARY`] initializes the
/// animator, and ticks before that are no-ops. All methods expect to run
/// under the global window-management lock.
#[derive(Debug)]
pub struct Animator {
    registry: DisplayRegistry,
    scheduler: FrameScheduler,
    session: AnimationSession,
    initialized: bool,
    remove_replaced_windows: bool,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}

impl Animator {
    /// Creates an uninitialized animator with no displays.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            registry: DisplayRegistry::new(),
            scheduler: FrameScheduler::new(),
            session: AnimationSession::new(),
            initialized: false,
            remove_replaced_windows: false,
        }
    }

    // -- display lifecycle -------------------------------------------------

    /// Registers a display, creating its animator slot if absent. Adding the
    /// primary display marks the animator initialized. Invalid ids are
    /// ignored.
    pub fn add_display(&mut self, id: DisplayId) {
        self.registry.add(id);
        if id == DisplayId::PRIMARY && self.registry.contains(id) {
            self.initialized = true;
        }
    }

    /// Unregisters a display, terminating any owned rotation animation
    /// before the slot is deleted.
    pub fn remove_display(&mut self, id: DisplayId) {
        self.registry.remove(id);
    }

    /// Installs (or clears) the rotation animation for `id`. Invalid ids are
    /// ignored.
    pub fn set_rotation_animation(
        &mut self,
        id: DisplayId,
        animation: Option<Box<dyn RotationAnimation>>,
    ) {
        self.registry.set_rotation_animation(id, animation);
    }

    /// Returns the rotation animation for `id`, if one is installed.
    pub fn rotation_animation(&mut self, id: DisplayId) -> Option<&mut (dyn RotationAnimation + 'static)> {
        self.registry.rotation_animation(id)
    }

    /// Read access to the display registry.
    #[must_use]
    pub fn registry(&self) -> &DisplayRegistry {
        &self.registry
    }

    // -- state accessors ---------------------------------------------------

    /// Whether the primary display has been registered.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether the most recent tick left anything animating.
    #[must_use]
    pub const fn is_animating(&self) -> bool {
        self.session.animating
    }

    /// Whether a frame callback or tick is armed on either timing rail.
    #[must_use]
    pub const fn is_scheduled(&self) -> bool {
        self.scheduler.is_armed()
    }

    /// The aggregate state of the current (or most recent) tick.
    #[must_use]
    pub const fn session(&self) -> &AnimationSession {
        &self.session
    }

    /// Asks the next tick to purge windows that have been replaced by a
    /// newer instance.
    pub const fn request_removal_of_replaced_windows(&mut self) {
        self.remove_replaced_windows = true;
    }

    // -- scheduling --------------------------------------------------------

    /// Requests an animation step on the next frame. Idempotent while a
    /// callback is already armed; absorbed while a tick is pending.
    pub fn request_frame(&mut self) -> ScheduleAction {
        self.scheduler.apply(ScheduleEvent::FrameRequested)
    }

    /// Feeds a vsync frame callback. Arms the tick rail on the first
    /// callback; later callbacks refresh the pending timestamp.
    pub fn frame_callback(&mut self, frame_time: FrameTime) -> ScheduleAction {
        self.scheduler.apply(ScheduleEvent::FrameCallback(frame_time))
    }

    /// Claims the pending tick at the compositor-sync point, returning the
    /// frame timestamp to animate with. `None` when no tick is pending.
    pub fn begin_tick(&mut self) -> Option<FrameTime> {
        self.scheduler.begin_tick()
    }

    // -- layout-change accessors -------------------------------------------

    /// Reads a display's pending layout-change bits. Invalid or unknown ids
    /// read as empty.
    pub fn pending_layout_changes<W: WindowSystem + ?Sized>(
        &self,
        ws: &mut W,
        id: DisplayId,
    ) -> LayoutChanges {
        if !id.is_valid() {
            return LayoutChanges::NONE;
        }
        ws.display_content(id)
            .map_or(LayoutChanges::NONE, |content| {
                content.pending_layout_changes()
            })
    }

    /// ORs layout-change bits into a display's pending set. Invalid or
    /// unknown ids are ignored.
    pub fn or_pending_layout_changes<W: WindowSystem + ?Sized>(
        &self,
        ws: &mut W,
        id: DisplayId,
        changes: LayoutChanges,
    ) {
        if !id.is_valid() {
            return;
        }
        if let Some(content) = ws.display_content(id) {
            content.or_pending_layout_changes(changes);
        }
    }

    // -- the tick ----------------------------------------------------------

    /// Advances all animation state to `frame_time` in one transactional
    /// pass.
    ///
    /// No-op until the primary display has been registered. Runs under the
    /// global window-management lock; collaborators must not re-enter the
    /// animator.
    pub fn animate<W: WindowSystem + ?Sized>(
        &mut self,
        ws: &mut W,
        frame_time: FrameTime,
        tracer: &mut dyn TraceSink,
    ) -> StepReport {
        if !self.initialized {
            return StepReport::skipped();
        }

        let now = frame_time.to_step_time();
        self.session.frame_time = now;
        self.session.flags = BulkUpdateFlags::ORIENTATION_CHANGE_COMPLETE;
        let was_animating = self.session.animating;
        self.session.animating = false;
        self.session.app_animating = false;

        tracer.on_tick_begin(&TickBeginEvent { now });

        let schedule = {
            let mut scope = TransactionScope::new(ws);

            // First pass: advance every display's primary animation state.
            for index in 0..self.registry.slots.len() {
                let id = self.registry.slots[index].id;

                let mut primary = false;
                if let Some(content) = scope.display_content(id) {
                    content.step_app_animations(now);
                    primary = content.is_primary();
                }

                let rotation_finished = match self.registry.slots[index].rotation.as_deref_mut() {
                    Some(rotation) if rotation.is_active() => {
                        if rotation.step(now) {
                            self.session.animating = true;
                            false
                        } else {
                            true
                        }
                    }
                    _ => false,
                };
                if rotation_finished {
                    self.session.flags.insert(BulkUpdateFlags::UPDATE_ROTATION);
                    if let Some(mut rotation) = self.registry.slots[index].rotation.take() {
                        rotation.terminate();
                    }
                    tracer.on_rotation_finished(&RotationFinishedEvent { display: id, now });
                    if primary {
                        // The rotation was never announced up front; it
                        // landed just now.
                        if let Some(accessibility) = scope.accessibility() {
                            accessibility.on_rotation_changed();
                        }
                    }
                }

                self.session.transaction_sequence += 1;
                if let Some(content) = scope.display_content(id) {
                    content.update_window_animations(&mut self.session);
                    content.update_wallpaper_animation(&mut self.session);
                    content.prepare_surfaces();
                }
            }

            // Second pass: dependent effects, after every display's primary
            // animation state is settled.
            for index in 0..self.registry.slots.len() {
                let id = self.registry.slots[index].id;

                if let Some(content) = scope.display_content(id) {
                    content.check_ready_to_show();
                }

                if let Some(rotation) = self.registry.slots[index].rotation.as_deref_mut() {
                    rotation.update_surfaces();
                }

                let mut primary = false;
                if let Some(content) = scope.display_content(id) {
                    let dim = content.animate_dim_layers();
                    self.session.or_animating(dim);
                    let divider = content.animate_divider(now);
                    self.session.or_animating(divider);
                    primary = content.is_primary();
                }
                if primary {
                    if let Some(accessibility) = scope.accessibility() {
                        accessibility.draw_magnified_border_if_needed();
                    }
                }
            }

            if let Some(drag) = scope.drag_animation() {
                let still = drag.step(now);
                self.session.or_animating(still);
            }

            // Self-sustaining loop: anything still animating re-arms the
            // frame-callback rail. The action is dispatched by the caller.
            let schedule = if self.session.animating {
                self.scheduler.apply(ScheduleEvent::FrameRequested)
            } else {
                ScheduleAction::None
            };

            if let Some(watermark) = scope.watermark() {
                watermark.draw_if_needed();
            }

            schedule
            // scope drops here: transaction closes.
        };

        let mut has_pending = false;
        for index in 0..self.registry.slots.len() {
            let id = self.registry.slots[index].id;
            if let Some(content) = ws.display_content(id) {
                has_pending |= content.has_pending_layout_changes();
            }
        }

        let mut copy_requested = false;
        if !self.session.flags.is_empty() {
            for index in 0..self.registry.slots.len() {
                let id = self.registry.slots[index].id;
                if let Some(content) = ws.display_content(id) {
                    copy_requested |= content.copy_flags_to_layout_params(self.session.flags);
                }
            }
        }

        let mut requested_traversal = false;
        if has_pending || copy_requested {
            ws.request_traversal();
            requested_traversal = true;
        }

        if self.session.animating && !was_animating {
            tracer.on_animating_begin(&AnimatingEvent { now });
        }
        if !self.session.animating && was_animating {
            // One final layout pass so the finished animation's end state
            // lands on screen.
            ws.request_traversal();
            requested_traversal = true;
            tracer.on_animating_end(&AnimatingEvent { now });
        }

        if self.remove_replaced_windows {
            ws.purge_replaced_windows();
            self.remove_replaced_windows = false;
        }
        ws.release_unused_surfaces();

        tracer.on_tick_end(&TickEndEvent {
            now,
            animating: self.session.animating,
            flags: self.session.flags,
        });

        StepReport {
            skipped: false,
            animating: self.session.animating,
            app_animating: self.session.app_animating,
            flags: self.session.flags,
            requested_traversal,
            schedule,
        }
    }

    // -- diagnostics -------------------------------------------------------

    /// Renders per-display rotation state, the bulk-update flags, the
    /// transaction sequence, and the current step time. Human-oriented.
    pub fn dump(&self, w: &mut dyn fmt::Write) -> fmt::Result {
        for slot in &self.registry.slots {
            writeln!(w, "DisplayAnimator {}:", slot.id)?;
            match &slot.rotation {
                Some(rotation) => writeln!(w, "  rotation: {rotation:?}")?,
                None => writeln!(w, "  rotation: (none)")?,
            }
        }
        writeln!(
            w,
            "transaction_sequence={}",
            self.session.transaction_sequence
        )?;
        writeln!(w, "frame_time={}", self.session.frame_time)?;
        if !self.session.flags.is_empty() {
            writeln!(
                w,
                "bulk_update_flags={:#x} [{}]",
                self.session.flags.bits(),
                self.session.flags
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{AccessibilityHooks, DisplayContent, DragAnimation, Watermark};
    use crate::trace::NoopSink as NoopTracer;
    use alloc::format;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};
    use core::sync::atomic::{AtomicU32, Ordering};

    // -- test doubles ------------------------------------------------------

    #[derive(Default)]
    struct Counters {
        opens: Cell<u32>,
        closes: Cell<u32>,
        traversals: Cell<u32>,
        purges: Cell<u32>,
        releases: Cell<u32>,
        rotation_changed: Cell<u32>,
        borders_drawn: Cell<u32>,
        calls: RefCell<Vec<String>>,
    }

    impl Counters {
        fn record(&self, call: &str) {
            self.calls.borrow_mut().push(String::from(call));
        }

        fn call_position(&self, call: &str) -> Option<usize> {
            self.calls.borrow().iter().position(|c| c == call)
        }
    }

    struct TestDisplay {
        id: DisplayId,
        primary: bool,
        dim_animating: bool,
        divider_animating: bool,
        has_pending_layout: bool,
        copy_requests_traversal: bool,
        clear_orientation_baseline: bool,
        pending: LayoutChanges,
        counters: Rc<Counters>,
    }

    impl TestDisplay {
        fn new(id: DisplayId, counters: &Rc<Counters>) -> Self {
            Self {
                id,
                primary: id == DisplayId::PRIMARY,
                dim_animating: false,
                divider_animating: false,
                has_pending_layout: false,
                copy_requests_traversal: false,
                clear_orientation_baseline: false,
                pending: LayoutChanges::NONE,
                counters: Rc::clone(counters),
            }
        }
    }

    impl DisplayContent for TestDisplay {
        fn step_app_animations(&mut self, _now: StepTime) {
            self.counters.record(&format!("step_app:{}", self.id.0));
        }

        fn update_window_animations(&mut self, session: &mut AnimationSession) {
            self.counters
                .record(&format!("update_windows:{}", self.id.0));
            if self.clear_orientation_baseline {
                session
                    .flags
                    .remove(BulkUpdateFlags::ORIENTATION_CHANGE_COMPLETE);
            }
        }

        fn update_wallpaper_animation(&mut self, _session: &mut AnimationSession) {
            self.counters
                .record(&format!("update_wallpaper:{}", self.id.0));
        }

        fn prepare_surfaces(&mut self) {
            self.counters.record(&format!("prepare:{}", self.id.0));
        }

        fn check_ready_to_show(&mut self) {
            self.counters.record(&format!("check_ready:{}", self.id.0));
        }

        fn animate_dim_layers(&mut self) -> bool {
            self.dim_animating
        }

        fn animate_divider(&mut self, _now: StepTime) -> bool {
            self.divider_animating
        }

        fn has_pending_layout_changes(&self) -> bool {
            self.has_pending_layout
        }

        fn copy_flags_to_layout_params(&mut self, flags: BulkUpdateFlags) -> bool {
            self.pending.merge(LayoutChanges(flags.bits()));
            self.copy_requests_traversal
        }

        fn pending_layout_changes(&self) -> LayoutChanges {
            self.pending
        }

        fn or_pending_layout_changes(&mut self, changes: LayoutChanges) {
            self.pending.merge(changes);
        }

        fn is_primary(&self) -> bool {
            self.primary
        }
    }

    struct TestAccessibility {
        counters: Rc<Counters>,
    }

    impl AccessibilityHooks for TestAccessibility {
        fn on_rotation_changed(&mut self) {
            self.counters
                .rotation_changed
                .set(self.counters.rotation_changed.get() + 1);
        }

        fn draw_magnified_border_if_needed(&mut self) {
            self.counters
                .borders_drawn
                .set(self.counters.borders_drawn.get() + 1);
        }
    }

    struct TestDrag {
        animating: bool,
        steps: Cell<u32>,
    }

    impl DragAnimation for TestDrag {
        fn step(&mut self, _now: StepTime) -> bool {
            self.steps.set(self.steps.get() + 1);
            self.animating
        }
    }

    struct TestWatermark {
        draws: Cell<u32>,
    }

    impl Watermark for TestWatermark {
        fn draw_if_needed(&mut self) {
            self.draws.set(self.draws.get() + 1);
        }
    }

    struct TestSystem {
        displays: Vec<TestDisplay>,
        accessibility: Option<TestAccessibility>,
        drag: Option<TestDrag>,
        watermark: Option<TestWatermark>,
        counters: Rc<Counters>,
    }

    impl TestSystem {
        fn new() -> (Self, Rc<Counters>) {
            let counters = Rc::new(Counters::default());
            (
                Self {
                    displays: Vec::new(),
                    accessibility: None,
                    drag: None,
                    watermark: None,
                    counters: Rc::clone(&counters),
                },
                counters,
            )
        }

        fn with_display(mut self, display: TestDisplay) -> Self {
            self.displays.push(display);
            self
        }
    }

    impl WindowSystem for TestSystem {
        fn open_surface_transaction(&mut self) {
            self.counters.opens.set(self.counters.opens.get() + 1);
        }

        fn close_surface_transaction(&mut self) {
            self.counters.closes.set(self.counters.closes.get() + 1);
        }

        fn display_content(&mut self, id: DisplayId) -> Option<&mut dyn DisplayContent> {
            self.displays
                .iter_mut()
                .find(|display| display.id == id)
                .map(|display| display as &mut dyn DisplayContent)
        }

        fn accessibility(&mut self) -> Option<&mut dyn AccessibilityHooks> {
            self.accessibility
                .as_mut()
                .map(|hooks| hooks as &mut dyn AccessibilityHooks)
        }

        fn drag_animation(&mut self) -> Option<&mut dyn DragAnimation> {
            self.drag.as_mut().map(|drag| drag as &mut dyn DragAnimation)
        }

        fn watermark(&mut self) -> Option<&mut dyn Watermark> {
            self.watermark
                .as_mut()
                .map(|watermark| watermark as &mut dyn Watermark)
        }

        fn request_traversal(&mut self) {
            self.counters
                .traversals
                .set(self.counters.traversals.get() + 1);
        }

        fn purge_replaced_windows(&mut self) {
            self.counters.purges.set(self.counters.purges.get() + 1);
        }

        fn release_unused_surfaces(&mut self) {
            self.counters.releases.set(self.counters.releases.get() + 1);
        }
    }

    struct TestRotation {
        frames_left: u32,
        steps: Arc<AtomicU32>,
        terminations: Arc<AtomicU32>,
        surface_updates: Arc<AtomicU32>,
    }

    impl TestRotation {
        fn new(frames_left: u32) -> (Box<Self>, Arc<AtomicU32>, Arc<AtomicU32>, Arc<AtomicU32>) {
            let steps = Arc::new(AtomicU32::new(0));
            let terminations = Arc::new(AtomicU32::new(0));
            let surface_updates = Arc::new(AtomicU32::new(0));
            (
                Box::new(Self {
                    frames_left,
                    steps: Arc::clone(&steps),
                    terminations: Arc::clone(&terminations),
                    surface_updates: Arc::clone(&surface_updates),
                }),
                steps,
                terminations,
                surface_updates,
            )
        }
    }

    impl fmt::Debug for TestRotation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "TestRotation(frames_left={})", self.frames_left)
        }
    }

    impl RotationAnimation for TestRotation {
        fn is_active(&self) -> bool {
            true
        }

        fn step(&mut self, _now: StepTime) -> bool {
            let _ = self.steps.fetch_add(1, Ordering::Relaxed);
            if self.frames_left == 0 {
                return false;
            }
            self.frames_left -= 1;
            true
        }

        fn terminate(&mut self) {
            let _ = self.terminations.fetch_add(1, Ordering::Relaxed);
        }

        fn update_surfaces(&mut self) {
            let _ = self.surface_updates.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[derive(Default)]
    struct RecordingTracer {
        tick_begins: u32,
        tick_ends: u32,
        animating_begins: u32,
        animating_ends: u32,
        rotations_finished: Vec<DisplayId>,
    }

    impl TraceSink for RecordingTracer {
        fn on_tick_begin(&mut self, _e: &TickBeginEvent) {
            self.tick_begins += 1;
        }

        fn on_tick_end(&mut self, _e: &TickEndEvent) {
            self.tick_ends += 1;
        }

        fn on_animating_begin(&mut self, _e: &AnimatingEvent) {
            self.animating_begins += 1;
        }

        fn on_animating_end(&mut self, _e: &AnimatingEvent) {
            self.animating_ends += 1;
        }

        fn on_rotation_finished(&mut self, e: &RotationFinishedEvent) {
            self.rotations_finished.push(e.display);
        }
    }

    fn frame(ms: u64) -> FrameTime {
        FrameTime(ms * 1_000_000)
    }

    // -- tests -------------------------------------------------------------

    #[test]
    fn tick_before_initialization_is_a_no_op() {
        let (mut ws, counters) = TestSystem::new();
        let mut animator = Animator::new();
        // A secondary display alone does not initialize the animator.
        animator.add_display(DisplayId(1));
        let mut tracer = RecordingTracer::default();

        let report = animator.animate(&mut ws, frame(16), &mut tracer);

        assert!(report.skipped);
        assert_eq!(counters.opens.get(), 0, "no transaction for skipped tick");
        assert_eq!(tracer.tick_begins, 0);
        assert_eq!(animator.session().transaction_sequence, 0);
    }

    #[test]
    fn adding_primary_display_initializes() {
        let mut animator = Animator::new();
        assert!(!animator.is_initialized());
        animator.add_display(DisplayId::PRIMARY);
        assert!(animator.is_initialized());
    }

    #[test]
    fn invalid_primary_sentinel_does_not_initialize() {
        let mut animator = Animator::new();
        animator.add_display(DisplayId(-1));
        assert!(!animator.is_initialized());
        assert!(animator.registry().is_empty());
    }

    #[test]
    fn transaction_is_opened_and_closed_once_per_tick() {
        let (ws, counters) = TestSystem::new();
        let mut ws = ws.with_display(TestDisplay::new(DisplayId::PRIMARY, &counters));
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);

        let _ = animator.animate(&mut ws, frame(16), &mut NoopTracer);
        assert_eq!(counters.opens.get(), 1);
        assert_eq!(counters.closes.get(), 1);

        let _ = animator.animate(&mut ws, frame(32), &mut NoopTracer);
        assert_eq!(counters.opens.get(), 2);
        assert_eq!(counters.closes.get(), 2);
    }

    #[test]
    fn completing_rotation_terminates_and_sets_flag() {
        let (ws, counters) = TestSystem::new();
        let mut ws = ws
            .with_display(TestDisplay::new(DisplayId::PRIMARY, &counters))
            .with_display(TestDisplay::new(DisplayId(1), &counters));
        ws.accessibility = Some(TestAccessibility {
            counters: Rc::clone(&counters),
        });

        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);
        animator.add_display(DisplayId(1));

        // Completes on the first step.
        let (rotation, steps, terminations, surface_updates) = TestRotation::new(0);
        animator.set_rotation_animation(DisplayId::PRIMARY, Some(rotation));

        let mut tracer = RecordingTracer::default();
        let report = animator.animate(&mut ws, frame(16), &mut tracer);

        assert_eq!(
            steps.load(Ordering::Relaxed),
            1,
            "step runs at most once per tick"
        );
        assert_eq!(
            terminations.load(Ordering::Relaxed),
            1,
            "terminate runs exactly once"
        );
        assert!(
            !animator.registry().has_rotation_animation(DisplayId::PRIMARY),
            "handle cleared on completion"
        );
        assert!(report.flags.contains(BulkUpdateFlags::UPDATE_ROTATION));
        assert_eq!(
            counters.rotation_changed.get(),
            1,
            "primary display announces the landed rotation"
        );
        assert_eq!(tracer.rotations_finished, [DisplayId::PRIMARY]);
        assert_eq!(
            surface_updates.load(Ordering::Relaxed),
            0,
            "a completed rotation pushes no surfaces in the second pass"
        );
        assert!(!report.animating);
    }

    #[test]
    fn non_primary_rotation_completion_skips_accessibility() {
        let (ws, counters) = TestSystem::new();
        let mut ws = ws
            .with_display(TestDisplay::new(DisplayId::PRIMARY, &counters))
            .with_display(TestDisplay::new(DisplayId(1), &counters));
        ws.accessibility = Some(TestAccessibility {
            counters: Rc::clone(&counters),
        });

        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);
        animator.add_display(DisplayId(1));

        let (rotation, _, terminations, _) = TestRotation::new(0);
        animator.set_rotation_animation(DisplayId(1), Some(rotation));

        let _ = animator.animate(&mut ws, frame(16), &mut NoopTracer);

        assert_eq!(terminations.load(Ordering::Relaxed), 1);
        assert_eq!(counters.rotation_changed.get(), 0);
        assert!(!animator.registry().has_rotation_animation(DisplayId(1)));
    }

    #[test]
    fn running_rotation_keeps_animating_and_rearms() {
        let (ws, counters) = TestSystem::new();
        let mut ws = ws.with_display(TestDisplay::new(DisplayId::PRIMARY, &counters));
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);

        let (rotation, steps, terminations, surface_updates) = TestRotation::new(3);
        animator.set_rotation_animation(DisplayId::PRIMARY, Some(rotation));

        let report = animator.animate(&mut ws, frame(16), &mut NoopTracer);

        assert!(report.animating);
        assert_eq!(report.schedule, ScheduleAction::ArmFrameCallback);
        assert_eq!(steps.load(Ordering::Relaxed), 1);
        assert_eq!(terminations.load(Ordering::Relaxed), 0);
        assert_eq!(
            surface_updates.load(Ordering::Relaxed),
            1,
            "a running rotation pushes surfaces in the second pass"
        );
        assert!(animator.registry().has_rotation_animation(DisplayId::PRIMARY));
        assert!(!report.flags.contains(BulkUpdateFlags::UPDATE_ROTATION));
    }

    #[test]
    fn dim_and_divider_results_or_into_animating() {
        let (ws, counters) = TestSystem::new();
        let mut display = TestDisplay::new(DisplayId::PRIMARY, &counters);
        display.divider_animating = true;
        let mut ws = ws.with_display(display);
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);

        let report = animator.animate(&mut ws, frame(16), &mut NoopTracer);
        assert!(report.animating);
        assert!(animator.is_animating());
    }

    #[test]
    fn drag_step_ors_into_animating() {
        let (ws, counters) = TestSystem::new();
        let mut ws = ws.with_display(TestDisplay::new(DisplayId::PRIMARY, &counters));
        ws.drag = Some(TestDrag {
            animating: true,
            steps: Cell::new(0),
        });
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);

        let report = animator.animate(&mut ws, frame(16), &mut NoopTracer);
        assert!(report.animating);
        assert_eq!(ws.drag.as_ref().map(|d| d.steps.get()), Some(1));
    }

    #[test]
    fn watermark_is_drawn_every_tick() {
        let (ws, counters) = TestSystem::new();
        let mut ws = ws.with_display(TestDisplay::new(DisplayId::PRIMARY, &counters));
        ws.watermark = Some(TestWatermark {
            draws: Cell::new(0),
        });
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);

        let _ = animator.animate(&mut ws, frame(16), &mut NoopTracer);
        let _ = animator.animate(&mut ws, frame(32), &mut NoopTracer);
        assert_eq!(ws.watermark.as_ref().map(|w| w.draws.get()), Some(2));
    }

    #[test]
    fn animating_edges_trace_once_and_final_traversal_fires() {
        let (ws, counters) = TestSystem::new();
        let mut display = TestDisplay::new(DisplayId::PRIMARY, &counters);
        display.dim_animating = true;
        let mut ws = ws.with_display(display);
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);
        let mut tracer = RecordingTracer::default();

        // Two animating ticks: exactly one begin edge.
        let _ = animator.animate(&mut ws, frame(16), &mut tracer);
        let _ = animator.animate(&mut ws, frame(32), &mut tracer);
        assert_eq!(tracer.animating_begins, 1);
        assert_eq!(tracer.animating_ends, 0);

        // Animation stops: exactly one end edge plus a final traversal.
        let traversals_before = counters.traversals.get();
        ws.displays[0].dim_animating = false;
        let report = animator.animate(&mut ws, frame(48), &mut tracer);
        assert_eq!(tracer.animating_begins, 1);
        assert_eq!(tracer.animating_ends, 1);
        assert!(report.requested_traversal);
        assert_eq!(counters.traversals.get(), traversals_before + 1);
        assert_eq!(report.schedule, ScheduleAction::None);
    }

    #[test]
    fn pending_layout_changes_request_traversal() {
        let (ws, counters) = TestSystem::new();
        let mut display = TestDisplay::new(DisplayId::PRIMARY, &counters);
        display.has_pending_layout = true;
        let mut ws = ws.with_display(display);
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);

        let report = animator.animate(&mut ws, frame(16), &mut NoopTracer);
        assert!(report.requested_traversal);
        assert_eq!(counters.traversals.get(), 1);
    }

    #[test]
    fn copy_flags_runs_only_when_flags_nonzero() {
        let (ws, counters) = TestSystem::new();
        let mut display = TestDisplay::new(DisplayId::PRIMARY, &counters);
        // The display clears the orientation baseline, leaving the flags
        // empty at tick end.
        display.clear_orientation_baseline = true;
        display.copy_requests_traversal = true;
        let mut ws = ws.with_display(display);
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);

        let report = animator.animate(&mut ws, frame(16), &mut NoopTracer);
        assert!(report.flags.is_empty());
        assert!(!report.requested_traversal, "empty flags are not copied");
        assert!(ws.displays[0].pending.is_empty());
    }

    #[test]
    fn nonzero_flags_are_copied_into_layout_params() {
        let (ws, counters) = TestSystem::new();
        let mut display = TestDisplay::new(DisplayId::PRIMARY, &counters);
        display.copy_requests_traversal = true;
        let mut ws = ws.with_display(display);
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);

        let report = animator.animate(&mut ws, frame(16), &mut NoopTracer);
        // The orientation baseline is still set, so the copy runs and the
        // display requested a traversal from it.
        assert!(
            report
                .flags
                .contains(BulkUpdateFlags::ORIENTATION_CHANGE_COMPLETE)
        );
        assert!(report.requested_traversal);
        assert!(!ws.displays[0].pending.is_empty());
    }

    #[test]
    fn transaction_sequence_increments_once_per_display_per_tick() {
        let (ws, counters) = TestSystem::new();
        let mut ws = ws
            .with_display(TestDisplay::new(DisplayId::PRIMARY, &counters))
            .with_display(TestDisplay::new(DisplayId(1), &counters));
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);
        animator.add_display(DisplayId(1));

        let _ = animator.animate(&mut ws, frame(16), &mut NoopTracer);
        assert_eq!(animator.session().transaction_sequence, 2);
        let _ = animator.animate(&mut ws, frame(32), &mut NoopTracer);
        assert_eq!(animator.session().transaction_sequence, 4, "never reset");
    }

    #[test]
    fn second_pass_starts_after_first_pass_covers_all_displays() {
        let (ws, counters) = TestSystem::new();
        let mut ws = ws
            .with_display(TestDisplay::new(DisplayId::PRIMARY, &counters))
            .with_display(TestDisplay::new(DisplayId(1), &counters));
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);
        animator.add_display(DisplayId(1));

        let _ = animator.animate(&mut ws, frame(16), &mut NoopTracer);

        let last_first_pass = counters
            .call_position("prepare:1")
            .expect("first pass reached display 1");
        let first_second_pass = counters
            .call_position("check_ready:0")
            .expect("second pass reached display 0");
        assert!(
            last_first_pass < first_second_pass,
            "ready-to-show must wait until every display's primary state settled"
        );
    }

    #[test]
    fn replaced_windows_are_purged_once_per_request() {
        let (ws, counters) = TestSystem::new();
        let mut ws = ws.with_display(TestDisplay::new(DisplayId::PRIMARY, &counters));
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);

        animator.request_removal_of_replaced_windows();
        let _ = animator.animate(&mut ws, frame(16), &mut NoopTracer);
        assert_eq!(counters.purges.get(), 1);

        // Flag is consumed: the next tick does not purge again.
        let _ = animator.animate(&mut ws, frame(32), &mut NoopTracer);
        assert_eq!(counters.purges.get(), 1);
        assert_eq!(counters.releases.get(), 2, "surface release runs every tick");
    }

    #[test]
    fn magnification_border_drawn_only_for_primary() {
        let (ws, counters) = TestSystem::new();
        let mut ws = ws
            .with_display(TestDisplay::new(DisplayId::PRIMARY, &counters))
            .with_display(TestDisplay::new(DisplayId(1), &counters));
        ws.accessibility = Some(TestAccessibility {
            counters: Rc::clone(&counters),
        });
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);
        animator.add_display(DisplayId(1));

        let _ = animator.animate(&mut ws, frame(16), &mut NoopTracer);
        assert_eq!(counters.borders_drawn.get(), 1);
    }

    #[test]
    fn vanished_display_is_skipped_without_fault() {
        let (ws, counters) = TestSystem::new();
        // Registered with the animator but absent from the window system.
        let mut ws = ws.with_display(TestDisplay::new(DisplayId::PRIMARY, &counters));
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);
        animator.add_display(DisplayId(9));

        let report = animator.animate(&mut ws, frame(16), &mut NoopTracer);
        assert!(!report.skipped);
        assert_eq!(counters.opens.get(), 1);
        assert_eq!(counters.closes.get(), 1);
    }

    #[test]
    fn full_schedule_cycle_drives_a_tick() {
        let (ws, counters) = TestSystem::new();
        let mut ws = ws.with_display(TestDisplay::new(DisplayId::PRIMARY, &counters));
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);

        assert_eq!(animator.request_frame(), ScheduleAction::ArmFrameCallback);
        assert!(animator.is_scheduled());
        assert_eq!(
            animator.frame_callback(frame(16)),
            ScheduleAction::ArmTick(frame(16))
        );
        // A late vsync refreshes the timestamp without re-arming.
        assert_eq!(animator.frame_callback(frame(17)), ScheduleAction::None);

        let frame_time = animator.begin_tick().expect("tick was pending");
        assert_eq!(frame_time, frame(17));
        let report = animator.animate(&mut ws, frame_time, &mut NoopTracer);
        assert!(!report.skipped);
        assert_eq!(animator.session().frame_time, StepTime(17));
        assert!(!animator.is_scheduled());
    }

    #[test]
    fn layout_change_accessors_guard_invalid_ids() {
        let (ws, counters) = TestSystem::new();
        let mut ws = ws.with_display(TestDisplay::new(DisplayId::PRIMARY, &counters));
        let animator = Animator::new();

        assert_eq!(
            animator.pending_layout_changes(&mut ws, DisplayId(-3)),
            LayoutChanges::NONE
        );
        animator.or_pending_layout_changes(&mut ws, DisplayId(-3), LayoutChanges(0b1));
        animator.or_pending_layout_changes(&mut ws, DisplayId::PRIMARY, LayoutChanges(0b10));
        assert_eq!(
            animator.pending_layout_changes(&mut ws, DisplayId::PRIMARY),
            LayoutChanges(0b10)
        );
    }

    #[test]
    fn dump_renders_rotation_state_and_counters() {
        let mut animator = Animator::new();
        animator.add_display(DisplayId::PRIMARY);
        animator.add_display(DisplayId(1));
        let (rotation, _, _, _) = TestRotation::new(5);
        animator.set_rotation_animation(DisplayId(1), Some(rotation));

        let mut out = String::new();
        animator.dump(&mut out).expect("dump never fails on String");

        assert!(out.contains("DisplayAnimator #0:"));
        assert!(out.contains("rotation: (none)"));
        assert!(out.contains("TestRotation(frames_left=5)"));
        assert!(out.contains("transaction_sequence=0"));
        assert!(out.contains("frame_time=0ms"));
    }
}
