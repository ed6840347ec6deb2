// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{filler::FillerError, products::Bat, sink::SinkError};

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Couldn't write the products of beam {beam} for BAT {bat:#x}: {err}")]
    Sink {
        beam: usize,
        bat: Bat,
        err: SinkError,
    },

    #[error(transparent)]
    Finish(#[from] SinkError),

    #[error(transparent)]
    Filler(#[from] FillerError),
}
