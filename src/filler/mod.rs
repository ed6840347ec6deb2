// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The double-buffer hand-off between correlation workers and the writer.
//!
//! Workers fill the *active* slot; when any worker sees a new BAT, exactly one
//! thread swaps the slots' roles (after waiting for in-flight fills to finish)
//! and the previously active slot becomes a *write job* for the single writer
//! thread. Producers are never blocked behind the writer; if the writer falls
//! behind, the slot is reused anyway and an [`Anomaly::NotKeepingUp`] is
//! reported.
//!
//! All state shared between threads lives behind a single mutex with a single
//! condition variable. The products themselves are only ever touched by a
//! thread holding a fill reservation (workers) or a write job (the writer).

mod anomaly;
mod error;
pub(crate) mod pool;
mod slot;

pub use anomaly::{Anomaly, AnomalyCounts, AnomalyReporter, LogReporter};
pub use error::FillerError;
pub use slot::Slot;

use std::sync::Arc;

use log::{debug, info, trace};
use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::{
    config::{FillerConfig, FillerConfigError},
    products::{Bat, CorrProducts},
};
use pool::BufferPool;

/// Everything shared between workers, the swap leader and the writer.
struct FillerStatus {
    /// `None` until the first BAT is seen.
    active_bat: Option<Bat>,
    active_slot: Slot,
    /// Per beam; set between `products_buffer` and `notify_products_ready`.
    fill_in_progress: Vec<bool>,
    /// Per slot; set between `get_writing_job` and `notify_writing_done`.
    flush_in_progress: [bool; 2],
    /// Set while a thread is leading a swap. Other threads that want a swap
    /// wait for this to clear.
    swap_in_progress: bool,
    /// Set when a swap has left a slot ready to be written.
    write_job_ready: bool,
    shut_down: bool,

    num_swaps: usize,
    num_jobs_claimed: usize,
    anomalies: AnomalyCounts,
}

impl FillerStatus {
    fn any_fill_in_progress(&self) -> bool {
        self.fill_in_progress.iter().any(|&f| f)
    }
}

/// A point-in-time copy of a filler's bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillerSnapshot {
    pub active_bat: Option<Bat>,
    pub active_slot: Slot,
    pub fill_in_progress: Vec<bool>,
    pub flush_in_progress: [bool; 2],
    pub swap_in_progress: bool,
    pub write_job_ready: bool,
    pub shut_down: bool,
    /// The number of swaps performed (not counting the first BAT's adoption).
    pub num_swaps: usize,
    /// The number of write jobs handed to the writer.
    pub num_jobs_claimed: usize,
    pub anomalies: AnomalyCounts,
}

impl FillerSnapshot {
    pub fn is_flushing(&self, slot: Slot) -> bool {
        self.flush_in_progress[slot.index()]
    }
}

/// Owns the products of both slots and arbitrates access to them.
///
/// Workers call [`CorrFiller::products_buffer`], fill the returned products,
/// drop the guard and then call [`CorrFiller::notify_products_ready`]. The
/// writer loops over [`CorrFiller::get_writing_job`],
/// [`CorrFiller::get_products_to_write`] and
/// [`CorrFiller::notify_writing_done`]. Guards to products must not be held
/// across calls into the filler.
pub struct CorrFiller {
    config: FillerConfig,
    pool: BufferPool,
    status: Mutex<FillerStatus>,
    cond: Condvar,
    reporter: Arc<dyn AnomalyReporter>,
}

impl CorrFiller {
    /// Create a filler whose anomalies are logged.
    pub fn new(config: FillerConfig) -> Result<CorrFiller, FillerConfigError> {
        CorrFiller::with_reporter(config, Arc::new(LogReporter))
    }

    /// Create a filler whose anomalies are sent to `reporter`.
    pub fn with_reporter(
        config: FillerConfig,
        reporter: Arc<dyn AnomalyReporter>,
    ) -> Result<CorrFiller, FillerConfigError> {
        config.validate()?;
        let FillerConfig {
            num_antennas,
            num_beams,
            num_channels,
        } = config;
        debug!(
            "Allocating products for {num_beams} beams x 2 slots ({num_antennas} antennas, {num_channels} channels)"
        );

        Ok(CorrFiller {
            config,
            pool: BufferPool::new(num_antennas, num_beams, num_channels),
            status: Mutex::new(FillerStatus {
                active_bat: None,
                active_slot: Slot::First,
                fill_in_progress: vec![false; num_beams],
                flush_in_progress: [false; 2],
                swap_in_progress: false,
                write_job_ready: false,
                shut_down: false,
                num_swaps: 0,
                num_jobs_claimed: 0,
                anomalies: AnomalyCounts::default(),
            }),
            cond: Condvar::new(),
            reporter,
        })
    }

    pub fn config(&self) -> &FillerConfig {
        &self.config
    }

    pub fn num_beams(&self) -> usize {
        self.pool.num_beams()
    }

    fn check_beam(&self, beam: usize) -> Result<(), FillerError> {
        let num_beams = self.num_beams();
        if beam >= num_beams {
            return Err(FillerError::BeamOutOfRange { beam, num_beams });
        }
        Ok(())
    }

    fn report(&self, status: &mut FillerStatus, anomaly: Anomaly) {
        status.anomalies.record(&anomaly);
        self.reporter.report(&anomaly);
    }

    /// Get the products of `beam` for filling with data for `bat`. If `bat` is
    /// newer than the active BAT, the slots are swapped first (possibly by
    /// another thread; this call returns once the swap is complete).
    ///
    /// If `bat` still doesn't match the active BAT afterwards, or `beam` is
    /// already being filled, an anomaly is reported and the active products
    /// are returned anyway.
    pub fn products_buffer(
        &self,
        beam: usize,
        bat: Bat,
    ) -> Result<MutexGuard<CorrProducts>, FillerError> {
        self.check_beam(beam)?;

        let slot = {
            let mut status = self.status.lock();
            self.resolve_new_data(&mut status, bat)?;

            if let Some(active) = status.active_bat {
                if active != bat {
                    self.report(
                        &mut status,
                        Anomaly::MissedSwap {
                            beam,
                            requested: bat,
                            active,
                        },
                    );
                }
            }
            if status.fill_in_progress[beam] {
                self.report(&mut status, Anomaly::DoubleFill { beam });
            }
            status.fill_in_progress[beam] = true;
            trace!("Beam {beam} filling slot {} for BAT {bat:#x}", status.active_slot);
            status.active_slot
        };

        // The swap leader can't touch this slot until our fill reservation is
        // released, so it's safe to drop the status lock first.
        Ok(self.pool.lock(slot, beam))
    }

    /// Release the fill reservation of `beam`. The guard returned by
    /// [`CorrFiller::products_buffer`] must already have been dropped.
    pub fn notify_products_ready(&self, beam: usize) {
        let mut status = self.status.lock();
        let num_beams = status.fill_in_progress.len();
        match status.fill_in_progress.get(beam).copied() {
            None => self.report(&mut status, Anomaly::BeamOutOfRange { beam, num_beams }),
            Some(false) => self.report(&mut status, Anomaly::ReadyWithoutFill { beam }),
            Some(true) => {
                status.fill_in_progress[beam] = false;
                trace!("Beam {beam} is ready");
            }
        }
        self.cond.notify_all();
    }

    /// Announce that data for `bat` has arrived. The first BAT is simply
    /// adopted; a repeated BAT does nothing; an older BAT is reported and
    /// ignored; a newer BAT causes exactly one thread to swap the slots while
    /// any others wait for that swap to finish.
    pub fn notify_of_new_data(&self, bat: Bat) -> Result<(), FillerError> {
        let mut status = self.status.lock();
        self.resolve_new_data(&mut status, bat)
    }

    fn resolve_new_data(
        &self,
        status: &mut MutexGuard<FillerStatus>,
        bat: Bat,
    ) -> Result<(), FillerError> {
        // Arbitration. Threads that find a swap already underway wait for it
        // and then look again; the BAT they carry may need another swap.
        loop {
            if status.shut_down {
                return Err(FillerError::ShutDown);
            }

            let Some(active) = status.active_bat else {
                info!("First BAT: {bat:#x}");
                status.active_bat = Some(bat);
                self.pool.init_slot(status.active_slot, bat);
                return Ok(());
            };
            if bat == active {
                return Ok(());
            }
            if bat < active {
                self.report(
                    status,
                    Anomaly::TimestampRegression {
                        active,
                        requested: bat,
                    },
                );
                return Ok(());
            }
            if !status.swap_in_progress {
                break;
            }
            trace!("Waiting for another thread to swap to BAT {bat:#x} or newer");
            self.cond.wait(status);
        }

        // This thread leads the swap.
        status.swap_in_progress = true;
        debug!("Swapping to BAT {bat:#x}; waiting for in-flight fills");

        // Drain. The status lock is released while waiting.
        while status.any_fill_in_progress() && !status.shut_down {
            self.cond.wait(status);
        }
        if status.shut_down {
            status.swap_in_progress = false;
            self.cond.notify_all();
            return Err(FillerError::ShutDown);
        }

        let new_active = status.active_slot.other();
        if status.flush_in_progress[new_active.index()] || status.write_job_ready {
            let unclaimed = status.write_job_ready;
            self.report(
                status,
                Anomaly::NotKeepingUp {
                    slot: new_active,
                    bat,
                    unclaimed,
                },
            );
            // An unclaimed job lives in the slot about to be reused; it can't
            // be handed out any more.
            status.write_job_ready = false;
        }

        // In an overrun the writer may still hold one of these buffers while
        // it does I/O; producers must not wait on that behind the status lock.
        MutexGuard::unlocked(status, || self.pool.init_slot(new_active, bat));

        // Fills of the current BAT may have started while the lock was
        // released; they belong to the slot about to be written.
        while status.any_fill_in_progress() && !status.shut_down {
            self.cond.wait(status);
        }
        if status.shut_down {
            status.swap_in_progress = false;
            self.cond.notify_all();
            return Err(FillerError::ShutDown);
        }

        // Commit.
        status.active_slot = new_active;
        status.active_bat = Some(bat);
        status.write_job_ready = true;
        status.swap_in_progress = false;
        status.num_swaps += 1;
        debug!(
            "Slot {new_active} is now active for BAT {bat:#x}; slot {} is ready to be written",
            new_active.other()
        );
        self.cond.notify_all();

        Ok(())
    }

    /// Block until a slot is ready to be written, then claim it. A job that
    /// was ready before [`CorrFiller::shutdown`] is still handed out; after
    /// that, [`FillerError::ShutDown`] is returned.
    pub fn get_writing_job(&self) -> Result<Slot, FillerError> {
        let mut status = self.status.lock();
        while !status.write_job_ready {
            if status.shut_down {
                return Err(FillerError::ShutDown);
            }
            self.cond.wait(&mut status);
        }

        status.write_job_ready = false;
        let slot = status.active_slot.other();
        if status.flush_in_progress[slot.index()] {
            self.report(&mut status, Anomaly::DoubleFlushClaim { slot });
        }
        status.flush_in_progress[slot.index()] = true;
        status.num_jobs_claimed += 1;
        trace!("Writing job claimed for slot {slot}");
        Ok(slot)
    }

    /// Get the products of `beam` in `slot` for writing. `slot` must have come
    /// from [`CorrFiller::get_writing_job`]; this isn't checked.
    pub fn get_products_to_write(
        &self,
        beam: usize,
        slot: Slot,
    ) -> Result<MutexGuard<CorrProducts>, FillerError> {
        self.check_beam(beam)?;
        Ok(self.pool.lock(slot, beam))
    }

    /// Release a slot claimed with [`CorrFiller::get_writing_job`].
    pub fn notify_writing_done(&self, slot: Slot) {
        let mut status = self.status.lock();
        if !status.flush_in_progress[slot.index()] {
            self.report(&mut status, Anomaly::DoneWithoutClaim { slot });
        }
        status.flush_in_progress[slot.index()] = false;
        trace!("Slot {slot} has been written");
        self.cond.notify_all();
    }

    /// Unblock every waiting thread. All subsequent waits and new fills fail
    /// with [`FillerError::ShutDown`], except that a write job that was
    /// already ready can still be claimed.
    pub fn shutdown(&self) {
        let mut status = self.status.lock();
        if !status.shut_down {
            info!("Shutting down the filler");
            status.shut_down = true;
        }
        self.cond.notify_all();
    }

    pub fn is_shut_down(&self) -> bool {
        self.status.lock().shut_down
    }

    pub fn snapshot(&self) -> FillerSnapshot {
        let status = self.status.lock();
        FillerSnapshot {
            active_bat: status.active_bat,
            active_slot: status.active_slot,
            fill_in_progress: status.fill_in_progress.clone(),
            flush_in_progress: status.flush_in_progress,
            swap_in_progress: status.swap_in_progress,
            write_job_ready: status.write_job_ready,
            shut_down: status.shut_down,
            num_swaps: status.num_swaps,
            num_jobs_claimed: status.num_jobs_claimed,
            anomalies: status.anomalies,
        }
    }
}
