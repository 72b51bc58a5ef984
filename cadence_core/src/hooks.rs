// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window-system integration contract.
//!
//! The animation core drives a windowing system it does not own. Everything
//! it needs from that system is expressed here as trait seams, so that the
//! tick algorithm stays platform-free and every collaborator can be replaced
//! by a test double:
//!
//! - **[`DisplayContent`]** — the per-display window tree: steps app
//!   animations, updates window/wallpaper animation state, prepares surfaces,
//!   and reports pending layout work.
//!
//! - **[`RotationAnimation`]** — the screen-rotation state machine. Owned by
//!   the registry per display; stepped at most once per tick and terminated
//!   exactly once, either on natural completion or on display removal.
//!
//! - **[`AccessibilityHooks`]** — rotation-change announcements and the
//!   magnification border. Consulted only for the primary display.
//!
//! - **[`DragAnimation`]** / **[`Watermark`]** — optional: an in-progress
//!   drag-and-drop animation, and the debug watermark overlay.
//!
//! - **[`WindowSystem`]** — the aggregate the tick borrows for its duration:
//!   transaction open/close, display lookup, the optional collaborators, the
//!   layout-traversal request sink, and end-of-tick housekeeping.
//!
//! # Frame loop pseudocode
//!
//! A driver (see `cadence_runtime`) wires the pieces together like this:
//!
//! ```rust,ignore
//! // vsync-app rail: external frame callback fires.
//! dispatch(animator.frame_callback(frame_time));   // arms the tick rail
//!
//! // vsync-sf rail: compositor-sync point fires.
//! if let Some(frame_time) = animator.begin_tick() {
//!     let report = animator.animate(&mut window_system, frame_time, &mut tracer);
//!     dispatch(report.schedule);                   // self-sustaining re-arm
//! }
//! ```
//!
//! # Call discipline
//!
//! All trait methods are called with the global window-management lock held
//! and must not re-enter the animator. They are synchronous and must not
//! block on I/O; the only suspension point in the whole core is waiting for
//! the next vsync signal.

use core::fmt;

use crate::display::DisplayId;
use crate::flags::{BulkUpdateFlags, LayoutChanges};
use crate::tick::AnimationSession;
use crate::time::StepTime;

/// The per-display window tree, as seen by the animation pass.
pub trait DisplayContent {
    /// Steps all per-app window animations to `now`.
    fn step_app_animations(&mut self, now: StepTime);

    /// Updates window animation state for this tick, recording results
    /// (animating bits, bulk-update flags) into `session`.
    fn update_window_animations(&mut self, session: &mut AnimationSession);

    /// Updates wallpaper animation state for this tick.
    fn update_wallpaper_animation(&mut self, session: &mut AnimationSession);

    /// Prepares this display's surfaces for commit inside the open
    /// transaction.
    fn prepare_surfaces(&mut self);

    /// Checks whether exit animations have completed and windows are ready
    /// to show. Runs in the second pass, after every display's primary
    /// animation state is settled.
    fn check_ready_to_show(&mut self);

    /// Steps dim-layer animation. Returns whether it is still animating.
    fn animate_dim_layers(&mut self) -> bool;

    /// Steps the docked-divider animation. Returns whether it is still
    /// animating.
    fn animate_divider(&mut self, now: StepTime) -> bool;

    /// Returns whether this display has layout work queued.
    fn has_pending_layout_changes(&self) -> bool;

    /// Merges the tick's bulk-update flags into this display's layout
    /// parameters. Returns whether a layout traversal is needed as a result.
    fn copy_flags_to_layout_params(&mut self, flags: BulkUpdateFlags) -> bool;

    /// Reads the pending layout-change bits.
    fn pending_layout_changes(&self) -> LayoutChanges;

    /// ORs `changes` into the pending layout-change bits.
    fn or_pending_layout_changes(&mut self, changes: LayoutChanges);

    /// Returns whether this is the primary display.
    fn is_primary(&self) -> bool;
}

/// The screen-rotation animation state machine.
///
/// The `Debug` bound supplies the diagnostic dump rendering; the animator
/// never interprets it. `Send` because the handle is installed under the
/// global lock from window-management threads but owned and stepped on the
/// animation thread.
pub trait RotationAnimation: fmt::Debug + Send {
    /// Returns whether the animation is running (not yet finished or
    /// terminated).
    fn is_active(&self) -> bool;

    /// Advances the animation to `now`. Returns `true` while animation
    /// continues; `false` signals completion, after which the animator
    /// terminates and drops the handle.
    fn step(&mut self, now: StepTime) -> bool;

    /// Releases the animation's resources. Called exactly once, either after
    /// a completing [`step`](Self::step) or when the display is removed.
    fn terminate(&mut self);

    /// Pushes this animation's surface changes into the open transaction.
    fn update_surfaces(&mut self);
}

/// Accessibility integration, consulted only for the primary display.
pub trait AccessibilityHooks {
    /// Announces that a deferred rotation change has landed. Fired when a
    /// rotation animation completes naturally.
    fn on_rotation_changed(&mut self);

    /// Draws the magnified-region border if magnification is active.
    fn draw_magnified_border_if_needed(&mut self);
}

/// An in-progress drag-and-drop animation.
pub trait DragAnimation {
    /// Advances the drag animation to `now`. Returns whether it is still
    /// animating.
    fn step(&mut self, now: StepTime) -> bool;
}

/// The debug watermark overlay.
pub trait Watermark {
    /// Redraws the watermark if it is out of date.
    fn draw_if_needed(&mut self);
}

/// Everything the tick needs from the windowing system, borrowed for the
/// duration of one tick.
///
/// The optional collaborators default to `None`; a window system only
/// overrides what it has.
pub trait WindowSystem {
    /// Opens the atomic surface-transaction boundary. Paired with
    /// [`close_surface_transaction`](Self::close_surface_transaction) on
    /// every exit path — the tick wraps the pair in a drop guard.
    fn open_surface_transaction(&mut self);

    /// Closes the surface transaction, committing buffered surface state.
    fn close_surface_transaction(&mut self);

    /// Returns the window tree for `id`, or `None` if the display vanished.
    fn display_content(&mut self, id: DisplayId) -> Option<&mut dyn DisplayContent>;

    /// Returns the accessibility integration, if any.
    fn accessibility(&mut self) -> Option<&mut dyn AccessibilityHooks> {
        None
    }

    /// Returns the in-progress drag animation, if any.
    fn drag_animation(&mut self) -> Option<&mut dyn DragAnimation> {
        None
    }

    /// Returns the watermark overlay, if configured.
    fn watermark(&mut self) -> Option<&mut dyn Watermark> {
        None
    }

    /// Requests a layout re-traversal after the tick.
    fn request_traversal(&mut self);

    /// Removes windows that have been replaced by a newer instance.
    fn purge_replaced_windows(&mut self);

    /// Releases saved and preserved surface resources no longer in use.
    fn release_unused_surfaces(&mut self);
}
