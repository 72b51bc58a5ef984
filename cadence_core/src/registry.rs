// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-display animator state registry.
//!
//! One [`DisplaySlot`] exists for every live display, keyed by
//! [`DisplayId`] and iterated in registration order — the tick's two passes
//! walk displays in the order they were added. The slot owns at most one
//! rotation-animation handle; the registry guarantees the handle is
//! terminated before a slot is deleted, so a live animation can never leak
//! through display removal.
//!
//! All accessors share one guard: an invalid (negative) id is a silent no-op
//! returning a neutral value. Display ids arrive from the window-management
//! side on a hot path, and a stale or sentinel id must never fault here.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::display::DisplayId;
use crate::hooks::RotationAnimation;

/// Animator-owned state for one display.
#[derive(Debug)]
pub(crate) struct DisplaySlot {
    pub(crate) id: DisplayId,
    pub(crate) rotation: Option<Box<dyn RotationAnimation>>,
}

/// Registry of per-display animator state, in registration order.
#[derive(Debug, Default)]
pub struct DisplayRegistry {
    pub(crate) slots: Vec<DisplaySlot>,
}

impl DisplayRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Returns the number of registered displays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns whether no displays are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns whether a slot exists for `id`.
    #[must_use]
    pub fn contains(&self, id: DisplayId) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }

    /// Returns the registered display ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = DisplayId> + '_ {
        self.slots.iter().map(|slot| slot.id)
    }

    /// Get-or-create: returns the slot index for `id`, creating an empty
    /// slot at the end if absent. Returns `None` for invalid ids.
    pub(crate) fn ensure(&mut self, id: DisplayId) -> Option<usize> {
        if !id.is_valid() {
            return None;
        }
        if let Some(index) = self.slots.iter().position(|slot| slot.id == id) {
            return Some(index);
        }
        self.slots.push(DisplaySlot { id, rotation: None });
        Some(self.slots.len() - 1)
    }

    /// Creates a slot for `id` if absent. Invalid ids are ignored.
    pub fn add(&mut self, id: DisplayId) {
        let _ = self.ensure(id);
    }

    /// Removes the slot for `id`, terminating any owned rotation animation
    /// first. Missing or invalid ids are ignored.
    pub fn remove(&mut self, id: DisplayId) {
        let Some(index) = self.slots.iter().position(|slot| slot.id == id) else {
            return;
        };
        if let Some(mut rotation) = self.slots[index].rotation.take() {
            rotation.terminate();
        }
        let _ = self.slots.remove(index);
    }

    /// Installs (or clears) the rotation animation for `id`, creating the
    /// slot if needed. Invalid ids are ignored.
    pub fn set_rotation_animation(
        &mut self,
        id: DisplayId,
        animation: Option<Box<dyn RotationAnimation>>,
    ) {
        if let Some(index) = self.ensure(id) {
            self.slots[index].rotation = animation;
        }
    }

    /// Returns the rotation animation for `id`, creating the slot if needed.
    /// Returns `None` for invalid ids or when no animation is installed.
    pub fn rotation_animation(&mut self, id: DisplayId) -> Option<&mut (dyn RotationAnimation + 'static)> {
        let index = self.ensure(id)?;
        self.slots[index].rotation.as_deref_mut()
    }

    /// Returns whether `id` currently owns a rotation animation, without
    /// creating a slot.
    #[must_use]
    pub fn has_rotation_animation(&self, id: DisplayId) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.id == id && slot.rotation.is_some())
    }
}
