// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

BATs are microseconds of a hardware clock, so all time-like constants here are
in microseconds unless their names say otherwise.
 */

/// The number of antennas correlated when none is specified.
pub(crate) const DEFAULT_NUM_ANTENNAS: usize = 3;

/// The number of beams correlated when none is specified.
pub(crate) const DEFAULT_NUM_BEAMS: usize = 9;

/// The number of spectral channels per beam when none is specified.
pub(crate) const DEFAULT_NUM_CHANNELS: usize = 216;

/// The number of correlation cycles a simulation runs when none is specified.
pub(crate) const DEFAULT_NUM_CYCLES: usize = 10;

/// The BAT of the first simulated cycle when none is specified.
pub(crate) const DEFAULT_START_BAT: u64 = 0x1_1000_0000_0000;

/// The BAT increment between simulated cycles [microseconds].
pub(crate) const DEFAULT_BAT_STEP: u64 = 1_000_000;

/// The wall-clock time between simulated cycles when none is specified
/// [milliseconds].
pub(crate) const DEFAULT_CYCLE_PERIOD_MS: u64 = 100;

/// The storage latency emulated by a simulation's writer when none is
/// specified [milliseconds].
pub(crate) const DEFAULT_WRITER_DELAY_MS: u64 = 0;
