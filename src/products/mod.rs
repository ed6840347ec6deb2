// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Correlation products of a single beam for a single correlation cycle.

#[cfg(test)]
mod tests;

use ndarray::prelude::*;
use num_complex::Complex;

/// A binary atomic time (BAT); a monotonically increasing hardware clock
/// sample identifying one correlation cycle [microseconds].
pub type Bat = u64;

/// The correlation products of one beam for one BAT.
///
/// The numeric content is opaque to the buffer hand-off machinery; it is only
/// ever reset with [`CorrProducts::init`]. Samples are considered invalid
/// until their flags are cleared by whoever accumulates into them.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrProducts {
    /// The BAT these products belong to. Only meaningful while the buffer is
    /// reachable from the active or pending-flush slot.
    pub bat: Bat,

    /// The beam index these products correspond to.
    pub beam: usize,

    /// Cross-correlation visibilities (\[baseline\]\[channel\]).
    pub visibilities: Array2<Complex<f32>>,

    /// Flags (1:1 with the visibilities). `true` means the sample is invalid.
    pub flags: Array2<bool>,

    /// The UVW coordinates of each baseline \[metres\] (\[baseline\]\[u, v, w\]).
    pub uvw: Array2<f64>,

    /// The geometric delay applied to each antenna \[seconds\].
    pub delays: Array1<f64>,
}

impl CorrProducts {
    /// Allocate products for `num_antennas` antennas and `num_channels`
    /// channels. Every sample starts out flagged.
    pub fn new(num_antennas: usize, num_channels: usize, beam: usize) -> CorrProducts {
        let num_baselines = num_cross_baselines(num_antennas);
        CorrProducts {
            bat: 0,
            beam,
            visibilities: Array2::zeros((num_baselines, num_channels)),
            flags: Array2::from_elem((num_baselines, num_channels), true),
            uvw: Array2::zeros((num_baselines, 3)),
            delays: Array1::zeros(num_antennas),
        }
    }

    /// Reset these products for a new cycle. All content is zeroed and every
    /// sample is flagged.
    pub fn init(&mut self, bat: Bat) {
        self.bat = bat;
        self.visibilities.fill(Complex::default());
        self.flags.fill(true);
        self.uvw.fill(0.0);
        self.delays.fill(0.0);
    }

    pub fn num_antennas(&self) -> usize {
        self.delays.len()
    }

    pub fn num_baselines(&self) -> usize {
        self.visibilities.len_of(Axis(0))
    }

    pub fn num_channels(&self) -> usize {
        self.visibilities.len_of(Axis(1))
    }

    /// The number of samples that aren't flagged.
    pub fn num_unflagged(&self) -> usize {
        self.flags.iter().filter(|&&f| !f).count()
    }

    /// Are all samples flagged? This is the case for freshly-initialised
    /// products that no worker has touched.
    pub fn is_fully_flagged(&self) -> bool {
        self.flags.iter().all(|&f| f)
    }

    /// The mean amplitude of all unflagged visibilities, or `None` if
    /// everything is flagged.
    pub fn mean_unflagged_amplitude(&self) -> Option<f64> {
        let (sum, count) = self
            .visibilities
            .iter()
            .zip(self.flags.iter())
            .filter(|(_, f)| !**f)
            .fold((0.0, 0_usize), |(sum, count), (v, _)| {
                (sum + v.norm() as f64, count + 1)
            });
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }
}

/// The number of cross-correlation baselines formed by `num_antennas`
/// antennas.
pub fn num_cross_baselines(num_antennas: usize) -> usize {
    (num_antennas * num_antennas.saturating_sub(1)) / 2
}

/// Convert a pair of antenna indices into a cross-correlation baseline index.
/// Baselines are ordered (0,1), (0,2), ..., (1,2), .... Returns `None` if the
/// indices are equal or out of range.
pub fn antennas_to_baseline(ant1: usize, ant2: usize, num_antennas: usize) -> Option<usize> {
    let (a, b) = if ant1 < ant2 {
        (ant1, ant2)
    } else {
        (ant2, ant1)
    };
    if a == b || b >= num_antennas {
        return None;
    }
    // The number of baselines belonging to antennas before `a`, plus the
    // offset within `a`'s row.
    Some(a * (2 * num_antennas - a - 1) / 2 + (b - a - 1))
}
