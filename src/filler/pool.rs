// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fixed storage for both halves of the double buffer.

use parking_lot::{Mutex, MutexGuard};

use super::Slot;
use crate::products::CorrProducts;

/// An arena of `2 * num_beams` [`CorrProducts`], allocated once and never
/// resized. Buffers are addressed by `(slot, beam)`; the first slot's buffers
/// occupy `[0, num_beams)` and the second slot's `[num_beams, 2 * num_beams)`.
///
/// Each buffer has its own lock so that references can be handed to many
/// threads at once. The hand-off protocol keeps these locks uncontended.
pub(crate) struct BufferPool {
    buffers: Vec<Mutex<CorrProducts>>,
    num_beams: usize,
}

impl BufferPool {
    pub(crate) fn new(num_antennas: usize, num_beams: usize, num_channels: usize) -> BufferPool {
        let buffers = [Slot::First, Slot::Second]
            .into_iter()
            .flat_map(|_| 0..num_beams)
            .map(|beam| Mutex::new(CorrProducts::new(num_antennas, num_channels, beam)))
            .collect();
        BufferPool { buffers, num_beams }
    }

    pub(crate) fn num_beams(&self) -> usize {
        self.num_beams
    }

    fn index(&self, slot: Slot, beam: usize) -> usize {
        beam + slot.index() * self.num_beams
    }

    /// Lock the buffer of `beam` in `slot`. The caller must have checked that
    /// `beam` is in range.
    pub(crate) fn lock(&self, slot: Slot, beam: usize) -> MutexGuard<CorrProducts> {
        debug_assert!(beam < self.num_beams);
        self.buffers[self.index(slot, beam)].lock()
    }

    /// Re-initialise every buffer in `slot` for a new BAT.
    pub(crate) fn init_slot(&self, slot: Slot, bat: u64) {
        for beam in 0..self.num_beams {
            self.lock(slot, beam).init(bat);
        }
    }
}
