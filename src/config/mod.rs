// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Construction-time configuration of a filler. These values size the buffer
//! pool and can't change for the life of a filler.

mod error;

pub use error::FillerConfigError;

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_NUM_ANTENNAS, DEFAULT_NUM_BEAMS, DEFAULT_NUM_CHANNELS},
    products::num_cross_baselines,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillerConfig {
    /// The number of antennas being correlated.
    pub num_antennas: usize,

    /// The number of beams being correlated in parallel.
    pub num_beams: usize,

    /// The number of spectral channels per beam.
    pub num_channels: usize,
}

impl Default for FillerConfig {
    fn default() -> Self {
        FillerConfig {
            num_antennas: DEFAULT_NUM_ANTENNAS,
            num_beams: DEFAULT_NUM_BEAMS,
            num_channels: DEFAULT_NUM_CHANNELS,
        }
    }
}

impl FillerConfig {
    pub fn validate(&self) -> Result<(), FillerConfigError> {
        if self.num_antennas < 2 {
            return Err(FillerConfigError::TooFewAntennas(self.num_antennas));
        }
        if self.num_beams == 0 {
            return Err(FillerConfigError::NoBeams);
        }
        if self.num_channels == 0 {
            return Err(FillerConfigError::NoChannels);
        }
        self.num_samples().ok_or(FillerConfigError::TooLarge {
            num_antennas: self.num_antennas,
            num_beams: self.num_beams,
            num_channels: self.num_channels,
        })?;
        Ok(())
    }

    /// The number of visibilities held by both slots of a filler, or `None`
    /// if they couldn't be addressed in memory.
    fn num_samples(&self) -> Option<usize> {
        let num_baselines = self
            .num_antennas
            .checked_mul(self.num_antennas.saturating_sub(1))?
            / 2;
        let num_samples = num_baselines
            .checked_mul(self.num_channels)?
            .checked_mul(self.num_beams)?
            .checked_mul(2)?;
        let num_bytes = num_samples.checked_mul(std::mem::size_of::<Complex<f32>>())?;
        (num_bytes <= isize::MAX as usize).then_some(num_samples)
    }

    pub fn num_baselines(&self) -> usize {
        num_cross_baselines(self.num_antennas)
    }
}
