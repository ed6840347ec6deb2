// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FillerConfigError {
    #[error("At least 2 antennas are needed to form a baseline, but {0} were specified")]
    TooFewAntennas(usize),

    #[error("The number of beams must be at least 1")]
    NoBeams,

    #[error("The number of channels must be at least 1")]
    NoChannels,

    #[error("{num_antennas} antennas, {num_beams} beams and {num_channels} channels are too many products to hold in memory")]
    TooLarge {
        num_antennas: usize,
        num_beams: usize,
        num_channels: usize,
    },
}
