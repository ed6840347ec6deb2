// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum SimulateError {
    #[error("The number of cycles to simulate must be at least 1")]
    NoCycles,

    #[error("The BAT step between cycles must be at least 1")]
    ZeroBatStep,

    #[error("Simulating {num_cycles} cycles from BAT {start_bat:#x} in steps of {bat_step} would overflow the BAT")]
    BatOverflow {
        num_cycles: usize,
        start_bat: u64,
        bat_step: u64,
    },

    #[error(transparent)]
    Config(#[from] crate::config::FillerConfigError),

    #[error(transparent)]
    Filler(#[from] crate::filler::FillerError),

    #[error(transparent)]
    Sink(#[from] crate::sink::SinkError),

    #[error(transparent)]
    Writer(#[from] crate::writer::WriterError),
}
