// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FillerError {
    #[error("The filler has been shut down")]
    ShutDown,

    #[error("Beam {beam} is out of range; there are only {num_beams} beams")]
    BeamOutOfRange { beam: usize, num_beams: usize },
}
