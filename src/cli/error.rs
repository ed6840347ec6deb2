// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all corr-filler-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use super::simulate::SimulateArgsError;
use crate::{
    config::FillerConfigError, filler::FillerError, simulate::SimulateError, sink::SinkError,
    writer::WriterError,
};

/// The *only* publicly visible error from corr-filler.
#[derive(Error, Debug)]
pub enum CorrFillerError {
    /// An error related to the simulate subcommand.
    #[error("{0}")]
    Simulate(String),

    /// An error related to the filler's construction-time configuration.
    #[error("{0}\n\nThe filler needs at least 2 antennas, 1 beam and 1 channel.")]
    Config(String),

    /// An error from the filler itself.
    #[error("{0}")]
    Filler(String),

    /// An error related to writing products.
    #[error("{0}")]
    Sink(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files are TOML or JSON; their keys are the long names of the subcommand's arguments, with underscores for dashes.")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<SimulateArgsError> for CorrFillerError {
    fn from(e: SimulateArgsError) -> Self {
        match e {
            SimulateArgsError::InvalidBat { .. } => Self::Simulate(e.to_string()),
            SimulateArgsError::Sink(e) => Self::from(e),
        }
    }
}

impl From<SimulateError> for CorrFillerError {
    fn from(e: SimulateError) -> Self {
        let s = e.to_string();
        match e {
            SimulateError::NoCycles
            | SimulateError::ZeroBatStep
            | SimulateError::BatOverflow { .. } => Self::Simulate(s),
            SimulateError::Config(e) => Self::from(e),
            SimulateError::Filler(e) => Self::from(e),
            SimulateError::Sink(e) => Self::from(e),
            SimulateError::Writer(e) => Self::from(e),
        }
    }
}

impl From<FillerConfigError> for CorrFillerError {
    fn from(e: FillerConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<FillerError> for CorrFillerError {
    fn from(e: FillerError) -> Self {
        Self::Filler(e.to_string())
    }
}

impl From<SinkError> for CorrFillerError {
    fn from(e: SinkError) -> Self {
        let s = e.to_string();
        match e {
            SinkError::InvalidSinkType(_)
            | SinkError::NoOutput(_)
            | SinkError::FileNotWritable(_) => Self::Sink(s),
            SinkError::IO(e) => Self::from(e),
        }
    }
}

impl From<WriterError> for CorrFillerError {
    fn from(e: WriterError) -> Self {
        let s = e.to_string();
        match e {
            WriterError::Sink { .. } | WriterError::Finish(_) => Self::Sink(s),
            WriterError::Filler(e) => Self::from(e),
        }
    }
}

impl From<std::io::Error> for CorrFillerError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
