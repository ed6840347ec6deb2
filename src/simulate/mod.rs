// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A synthetic correlator, for driving a filler end to end.
//!
//! A ticker hands each cycle's BAT to one worker thread per beam; the workers
//! fill their products through the filler, and a writer thread drains
//! completed cycles into a sink.

mod error;

pub(crate) use error::SimulateError;

use std::{
    path::PathBuf,
    thread::{self, ScopedJoinHandle},
    time::{Duration, Instant},
};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use crossbeam_utils::atomic::AtomicCell;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info, trace, warn};
use ndarray::Zip;
use num_complex::Complex;
use scopeguard::{defer, defer_on_unwind};

use crate::{
    config::FillerConfig,
    filler::{AnomalyCounts, CorrFiller, FillerError},
    products::{antennas_to_baseline, Bat, CorrProducts},
    sink::{new_sink, ProductsSink, SinkError, SinkType},
    writer::run_writer,
    PROGRESS_BARS,
};

/// The distance between neighbouring synthetic antennas [metres].
const ANTENNA_SPACING: f64 = 10.0;

/// The delay added per synthetic antenna [seconds].
const DELAY_PER_ANTENNA: f64 = 1e-9;

/// How often the ticker checks whether it should give up while waiting for
/// workers.
const TICKER_POLL: Duration = Duration::from_millis(50);

pub(crate) struct SimulateParams {
    pub(crate) filler_config: FillerConfig,
    pub(crate) num_cycles: usize,
    pub(crate) start_bat: Bat,
    pub(crate) bat_step: Bat,
    /// The wall-clock time between cycles.
    pub(crate) cycle_period: Duration,
    /// Storage latency emulated by the writer, once per cycle.
    pub(crate) writer_delay: Duration,
    pub(crate) sink_type: SinkType,
    pub(crate) output: Option<PathBuf>,
}

/// What happened during a simulation.
#[derive(Debug)]
pub(crate) struct SimulationSummary {
    pub(crate) num_cycles: usize,
    pub(crate) num_slots_written: usize,
    pub(crate) anomalies: AnomalyCounts,
    pub(crate) sink_message: String,
}

impl SimulateParams {
    pub(crate) fn validate(&self) -> Result<(), SimulateError> {
        self.filler_config.validate()?;
        if self.num_cycles == 0 {
            return Err(SimulateError::NoCycles);
        }
        if self.bat_step == 0 {
            return Err(SimulateError::ZeroBatStep);
        }
        // One extra BAT is needed to flush the last cycle.
        (self.num_cycles as u64)
            .checked_mul(self.bat_step)
            .and_then(|span| self.start_bat.checked_add(span))
            .ok_or(SimulateError::BatOverflow {
                num_cycles: self.num_cycles,
                start_bat: self.start_bat,
                bat_step: self.bat_step,
            })?;
        Ok(())
    }

    /// The BAT of every simulated cycle, followed by the BAT that flushes the
    /// last one.
    fn bats(&self) -> impl Iterator<Item = Bat> + '_ {
        (0..=self.num_cycles as u64).map(|i| self.start_bat + i * self.bat_step)
    }

    pub(crate) fn run(&self) -> Result<SimulationSummary, SimulateError> {
        self.validate()?;
        let sink = SlowSink {
            inner: new_sink(self.sink_type, self.output.clone())?,
            delay: self.writer_delay,
        };
        let filler = CorrFiller::new(self.filler_config)?;
        let num_beams = filler.num_beams();
        info!(
            "Simulating {} cycles of {num_beams} beams ({} baselines, {} channels)",
            self.num_cycles,
            filler.config().num_baselines(),
            filler.config().num_channels
        );

        // One channel per worker for BATs, and one shared by all workers to
        // say that they've finished a cycle.
        let (tx_bats, rx_bats): (Vec<Sender<Bat>>, Vec<Receiver<Bat>>) =
            (0..num_beams).map(|_| bounded(1)).unzip();
        let (tx_done, rx_done) = bounded(num_beams);

        // Progress bars.
        let multi_progress = MultiProgress::with_draw_target(if PROGRESS_BARS.load() {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        });
        let fill_progress = multi_progress.add(new_progress_bar(self.num_cycles, "Correlating"));
        let write_progress = multi_progress.add(new_progress_bar(self.num_cycles, "Writing"));

        // Use a variable to track whether any threads have an issue.
        let error = AtomicCell::new(false);

        let scoped_threads_result: Result<String, SimulateError> = thread::scope(|scope| {
            let filler = &filler;
            let error = &error;

            let worker_handles: Vec<ScopedJoinHandle<Result<(), SimulateError>>> = rx_bats
                .into_iter()
                .enumerate()
                .map(|(beam, rx_bat)| {
                    let tx_done = tx_done.clone();
                    thread::Builder::new()
                        .name(format!("beam {beam}"))
                        .spawn_scoped(scope, move || {
                            defer_on_unwind! { error.store(true); }
                            correlate_beam(filler, beam, rx_bat, tx_done)
                        })
                        .expect("OS can create threads")
                })
                .collect();
            drop(tx_done);

            let ticker_handle: ScopedJoinHandle<Result<(), SimulateError>> = thread::Builder::new()
                .name("ticker".to_string())
                .spawn_scoped(scope, move || {
                    defer_on_unwind! { error.store(true); }
                    // However this thread finishes, nothing else can make
                    // progress without it.
                    defer! { filler.shutdown(); }
                    fill_progress.tick();

                    let mut bats = self.bats();
                    let mut next_tick = Instant::now();
                    for bat in bats.by_ref().take(self.num_cycles) {
                        wait_until(next_tick);
                        next_tick += self.cycle_period;
                        trace!("Tick: BAT {bat:#x}");
                        for tx in &tx_bats {
                            if tx.send(bat).is_err() {
                                return Ok(());
                            }
                        }

                        // Wait for every beam to finish this cycle.
                        let mut num_done = 0;
                        while num_done < num_beams {
                            match rx_done.recv_timeout(TICKER_POLL) {
                                Ok(_) => num_done += 1,
                                Err(RecvTimeoutError::Timeout) => {
                                    if error.load() || filler.is_shut_down() {
                                        return Ok(());
                                    }
                                }
                                Err(RecvTimeoutError::Disconnected) => return Ok(()),
                            }
                        }
                        fill_progress.inc(1);
                    }
                    drop(tx_bats);
                    fill_progress.abandon_with_message("Finished correlating");

                    if let Some(final_bat) = bats.next() {
                        wait_until(next_tick);
                        debug!("Announcing BAT {final_bat:#x} to flush the last cycle");
                        filler.notify_of_new_data(final_bat)?;
                    }
                    Ok(())
                })
                .expect("OS can create threads");

            let writer_handle = thread::Builder::new()
                .name("write".to_string())
                .spawn_scoped(scope, move || {
                    defer_on_unwind! { error.store(true); }
                    write_progress.tick();
                    let mut sink = sink;
                    let result = run_writer(filler, &mut sink, error, Some(write_progress));
                    if result.is_err() {
                        error.store(true);
                    }
                    result.map_err(SimulateError::from)
                })
                .expect("OS can create threads");

            // Join the writer first; if it failed, its error explains why
            // the other threads gave up.
            let write_message = writer_handle.join().unwrap()?;
            ticker_handle.join().unwrap()?;
            for handle in worker_handles {
                handle.join().unwrap()?;
            }
            Ok(write_message)
        });
        let sink_message = scoped_threads_result?;

        let snapshot = filler.snapshot();
        let summary = SimulationSummary {
            num_cycles: self.num_cycles,
            num_slots_written: snapshot.num_jobs_claimed,
            anomalies: snapshot.anomalies,
            sink_message,
        };
        summary.log();
        Ok(summary)
    }
}

impl SimulationSummary {
    fn log(&self) {
        info!("{}", self.sink_message);
        info!(
            "Wrote {} of {} cycles",
            self.num_slots_written, self.num_cycles
        );
        if self.anomalies.total() == 0 {
            info!("No anomalies");
        } else {
            warn!("{} anomalies:", self.anomalies.total());
            for (kind, count) in self.anomalies.by_kind() {
                if count > 0 {
                    warn!("  {kind}: {count}");
                }
            }
        }
    }
}

fn new_progress_bar(len: usize, message: &'static str) -> ProgressBar {
    ProgressBar::new(len as _)
        .with_style(
            ProgressStyle::default_bar()
                .template("{msg:12}: [{wide_bar:.blue}] {pos:3}/{len:3} cycles ({elapsed_precise}<{eta_precise})")
                .unwrap()
                .progress_chars("=> "),
        )
        .with_position(0)
        .with_message(message)
}

fn wait_until(instant: Instant) {
    let now = Instant::now();
    if instant > now {
        thread::sleep(instant - now);
    }
}

/// The body of a worker thread: fill the products of `beam` for each BAT
/// received, until the ticker hangs up or the filler is shut down.
fn correlate_beam(
    filler: &CorrFiller,
    beam: usize,
    rx_bat: Receiver<Bat>,
    tx_done: Sender<usize>,
) -> Result<(), SimulateError> {
    for bat in rx_bat.iter() {
        let mut products = match filler.products_buffer(beam, bat) {
            Ok(p) => p,
            Err(FillerError::ShutDown) => break,
            Err(e) => return Err(e.into()),
        };
        fill_synthetic(&mut products, bat);
        drop(products);
        filler.notify_products_ready(beam);

        if tx_done.send(beam).is_err() {
            break;
        }
    }
    debug!("Beam {beam} finished");
    Ok(())
}

/// Deterministically fill `products` for `bat`. Every visibility has an
/// amplitude of `beam + 1` and a phase that is a multiple of 90 degrees; the
/// first channel of every baseline stays flagged.
pub(crate) fn fill_synthetic(products: &mut CorrProducts, bat: Bat) {
    let amplitude = (products.beam + 1) as f32;
    let num_antennas = products.num_antennas();
    let bat_phase = (bat % 4) as usize;

    Zip::indexed(&mut products.visibilities)
        .and(&mut products.flags)
        .for_each(|(i_bl, i_chan), vis, flag| {
            *vis = match (bat_phase + i_bl + i_chan) % 4 {
                0 => Complex::new(amplitude, 0.0),
                1 => Complex::new(0.0, amplitude),
                2 => Complex::new(-amplitude, 0.0),
                _ => Complex::new(0.0, -amplitude),
            };
            *flag = i_chan == 0;
        });

    // Antennas sit along the u axis.
    for ant1 in 0..num_antennas {
        for ant2 in ant1 + 1..num_antennas {
            if let Some(i_bl) = antennas_to_baseline(ant1, ant2, num_antennas) {
                products.uvw[[i_bl, 0]] = (ant2 - ant1) as f64 * ANTENNA_SPACING;
            }
        }
    }
    for (i_ant, delay) in products.delays.iter_mut().enumerate() {
        *delay = i_ant as f64 * DELAY_PER_ANTENNA;
    }
}

/// Emulates slow storage by sleeping before the first beam of each cycle.
struct SlowSink {
    inner: Box<dyn ProductsSink>,
    delay: Duration,
}

impl ProductsSink for SlowSink {
    fn write(&mut self, products: &CorrProducts) -> Result<(), SinkError> {
        if products.beam == 0 && !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.inner.write(products)
    }

    fn finish(&mut self) -> Result<String, SinkError> {
        self.inner.finish()
    }
}
