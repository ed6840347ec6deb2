// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Result-buffer hand-off engine for a real-time software correlator.

Many correlation-worker threads each fill a [`CorrProducts`] for one beam at
one hardware timestamp (BAT); a single persistence thread drains completed
cycles to storage. [`CorrFiller`] owns a double buffer of products and
arbitrates who may touch which half, without ever blocking the real-time
producers behind the writer.
 */

pub mod cli;
pub mod config;
mod constants;
pub mod filler;
pub mod products;
pub(crate) mod simulate;
pub mod sink;
pub mod writer;

// Re-exports.
pub use cli::{CorrFillerCli, CorrFillerError};
pub use config::{FillerConfig, FillerConfigError};
pub use filler::{
    Anomaly, AnomalyCounts, AnomalyReporter, CorrFiller, FillerError, FillerSnapshot, LogReporter,
    Slot,
};
pub use products::{Bat, CorrProducts};

use crossbeam_utils::atomic::AtomicCell;

/// Are progress bars being drawn? This should only ever be enabled by CLI code.
pub(crate) static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
