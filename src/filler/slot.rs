// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use strum_macros::{Display, EnumIter};

/// One of the two halves of the double buffer. A slot's role (active or
/// pending flush) is a logical tag; its storage never moves.
#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    #[strum(serialize = "first")]
    First,
    #[strum(serialize = "second")]
    Second,
}

impl Slot {
    /// The slot that isn't this one.
    pub fn other(self) -> Slot {
        match self {
            Slot::First => Slot::Second,
            Slot::Second => Slot::First,
        }
    }

    /// A small integer for indexing per-slot arrays.
    pub(crate) fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }
}
