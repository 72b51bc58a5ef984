// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bulk-update flags and pending layout changes.
//!
//! A tick produces coarse outcome bits as it advances animations — "the
//! rotation finished, the wallpaper target may have moved" — and the layout
//! subsystem consumes them *after* the tick, merged into per-display layout
//! parameters. [`BulkUpdateFlags`] is that accumulator: named bits, OR-only
//! accumulation, and a human-readable rendering for dumps. It carries no
//! behavior beyond that.
//!
//! [`LayoutChanges`] is the per-display counterpart: an opaque bitmask of
//! layout work a display has queued up. The scheduler only ever ORs into it
//! and tests it for emptiness; the layout pass owns the bit meanings.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// Coarse outcome bits accumulated during one tick.
///
/// Reset to [`ORIENTATION_CHANGE_COMPLETE`](Self::ORIENTATION_CHANGE_COMPLETE)
/// at the start of every tick and merged into layout parameters at tick end
/// only when non-empty.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BulkUpdateFlags(u32);

impl BulkUpdateFlags {
    /// No bits set.
    pub const NONE: Self = Self(0);

    /// Every display's orientation change has completed.
    ///
    /// This is the *baseline* for each tick; displays that are still frozen
    /// mid-rotation clear it while their windows animate.
    pub const ORIENTATION_CHANGE_COMPLETE: Self = Self(1 << 0);

    /// A rotation animation finished; the display rotation must be re-read.
    pub const UPDATE_ROTATION: Self = Self(1 << 1);

    /// The wallpaper target window may have changed.
    pub const WALLPAPER_MAY_CHANGE: Self = Self(1 << 2);

    /// The set of windows force-hidden by the keyguard changed.
    pub const FORCE_HIDING_CHANGED: Self = Self(1 << 3);

    /// A window that turns the screen on became visible.
    pub const TURN_ON_SCREEN: Self = Self(1 << 4);

    /// Returns the raw bit value.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns whether no bits are set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns whether all bits of `other` are set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets all bits of `other`.
    #[inline]
    pub const fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears all bits of `other`.
    #[inline]
    pub const fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for BulkUpdateFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for BulkUpdateFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Bit-name pairs for rendering. Order matches the declaration order above.
const FLAG_NAMES: [(BulkUpdateFlags, &str); 5] = [
    (
        BulkUpdateFlags::ORIENTATION_CHANGE_COMPLETE,
        "ORIENTATION_CHANGE_COMPLETE",
    ),
    (BulkUpdateFlags::UPDATE_ROTATION, "UPDATE_ROTATION"),
    (BulkUpdateFlags::WALLPAPER_MAY_CHANGE, "WALLPAPER_MAY_CHANGE"),
    (BulkUpdateFlags::FORCE_HIDING_CHANGED, "FORCE_HIDING_CHANGED"),
    (BulkUpdateFlags::TURN_ON_SCREEN, "TURN_ON_SCREEN"),
];

impl fmt::Display for BulkUpdateFlags {
    /// Renders the set bits by name, space-separated, for dump output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(none)");
        }
        let mut first = true;
        for (flag, name) in FLAG_NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for BulkUpdateFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BulkUpdateFlags({:#x}: {self})", self.0)
    }
}

/// Per-display pending layout work, as an opaque bitmask.
///
/// The layout subsystem owns the bit meanings; the scheduler only ORs bits in
/// and tests for emptiness.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayoutChanges(pub u32);

impl LayoutChanges {
    /// No layout work pending.
    pub const NONE: Self = Self(0);

    /// Returns whether no layout work is pending.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Merges the bits of `other` into `self`.
    #[inline]
    pub const fn merge(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl fmt::Debug for LayoutChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayoutChanges({:#x})", self.0)
    }
}
