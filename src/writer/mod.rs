// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The persistence side of the filler.

mod error;

pub use error::WriterError;

use crossbeam_utils::atomic::AtomicCell;
use indicatif::ProgressBar;
use log::{debug, trace};

use crate::{
    filler::{CorrFiller, FillerError},
    sink::ProductsSink,
};

/// Receive completed slots from `filler` and write them into `sink` until the
/// filler is shut down. This function is intended to be run on its own
/// thread; there must only ever be one writer per filler.
///
/// # Arguments
///
/// * `filler` - the filler to drain.
/// * `sink` - where to write products.
/// * `error` - a thread-safe [`bool`] to indicate if an error has occurred.
///   Receiving `true` signals that we should not continue, as another thread
///   has experienced an error. If this writer fails, it sets it.
/// * `progress_bar` - an optional progress bar to increment once per written
///   slot.
///
/// # Returns
///
/// * The sink's summary of everything that got written.
pub fn run_writer(
    filler: &CorrFiller,
    sink: &mut dyn ProductsSink,
    error: &AtomicCell<bool>,
    progress_bar: Option<ProgressBar>,
) -> Result<String, WriterError> {
    let mut num_slots_written = 0;
    loop {
        let slot = match filler.get_writing_job() {
            Ok(slot) => slot,
            Err(FillerError::ShutDown) => break,
            Err(e) => return Err(e.into()),
        };
        if error.load() {
            // Another thread has failed; don't bother writing.
            filler.notify_writing_done(slot);
            break;
        }

        let mut result: Result<(), WriterError> = Ok(());
        for beam in 0..filler.num_beams() {
            let products = filler.get_products_to_write(beam, slot)?;
            trace!("Writing beam {beam} of BAT {:#x}", products.bat);
            if let Err(err) = sink.write(&products) {
                result = Err(WriterError::Sink {
                    beam,
                    bat: products.bat,
                    err,
                });
                break;
            }
        }
        // Always give the slot back, even on failure.
        filler.notify_writing_done(slot);
        if let Err(e) = result {
            error.store(true);
            filler.shutdown();
            return Err(e);
        }

        num_slots_written += 1;
        if let Some(pb) = progress_bar.as_ref() {
            pb.inc(1);
        }
    }

    debug!("Writer finished after {num_slots_written} slots");
    if let Some(pb) = progress_bar {
        pb.abandon_with_message("Finished writing products");
    }
    let message = sink.finish()?;
    Ok(message)
}
