// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Anomalies detected by the filler.
//!
//! None of these stop the filler. Each is reported through an
//! [`AnomalyReporter`] at the point it is detected and control flow then
//! continues; a missed cycle is simply gone, and nothing is retried.

use log::error;
use thiserror::Error;

use super::Slot;
use crate::products::Bat;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// A new BAT older than the active one was announced. It is ignored.
    #[error("Timestamp regression: BAT {requested:#x} is older than the active BAT {active:#x}; ignoring it")]
    TimestampRegression { active: Bat, requested: Bat },

    /// A worker asked for a buffer for a BAT that isn't the active one (after
    /// any swap was resolved). The worker is given the active buffer anyway.
    #[error("Missed swap for beam {beam}: requested BAT {requested:#x} but the active BAT is {active:#x}")]
    MissedSwap {
        beam: usize,
        requested: Bat,
        active: Bat,
    },

    /// A slot was reused for a new BAT before its previous contents were
    /// persisted. If `unclaimed`, the writer never even picked up the job.
    #[error("Not keeping up: slot {slot} is being reused for BAT {bat:#x} before its previous contents were written{}; data will be corrupted or lost", unclaimed_note(.unclaimed))]
    NotKeepingUp { slot: Slot, bat: Bat, unclaimed: bool },

    /// `products_buffer` was called for a beam already being filled.
    #[error("Beam {beam} is already being filled; products_buffer was called twice without notify_products_ready")]
    DoubleFill { beam: usize },

    /// `notify_products_ready` was called for a beam that isn't being filled.
    #[error("notify_products_ready called for beam {beam}, but it isn't being filled")]
    ReadyWithoutFill { beam: usize },

    /// A writing job was claimed for a slot that is still being flushed. This
    /// indicates more than one writer thread.
    #[error("Slot {slot} was claimed for writing while it is already being written; only one writer thread is supported")]
    DoubleFlushClaim { slot: Slot },

    /// `notify_writing_done` was called for a slot that wasn't being flushed.
    #[error("notify_writing_done called for slot {slot}, but it wasn't being written")]
    DoneWithoutClaim { slot: Slot },

    /// A notification referred to a beam that doesn't exist.
    #[error("Beam {beam} is out of range; there are only {num_beams} beams")]
    BeamOutOfRange { beam: usize, num_beams: usize },
}

fn unclaimed_note(unclaimed: &bool) -> &'static str {
    if *unclaimed {
        " (the write job was never claimed)"
    } else {
        ""
    }
}

/// Somewhere to send anomalies. Implementations must not call back into the
/// filler; they are invoked while its status lock is held.
pub trait AnomalyReporter: Send + Sync {
    fn report(&self, anomaly: &Anomaly);
}

/// The default reporter; every anomaly is logged at the error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl AnomalyReporter for LogReporter {
    fn report(&self, anomaly: &Anomaly) {
        error!("{anomaly}");
    }
}

/// The number of anomalies of each kind seen by a filler.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnomalyCounts {
    pub timestamp_regressions: usize,
    pub missed_swaps: usize,
    pub not_keeping_up: usize,
    pub double_fills: usize,
    pub ready_without_fill: usize,
    pub double_flush_claims: usize,
    pub done_without_claim: usize,
    pub beams_out_of_range: usize,
}

impl AnomalyCounts {
    pub(crate) fn record(&mut self, anomaly: &Anomaly) {
        let count = match anomaly {
            Anomaly::TimestampRegression { .. } => &mut self.timestamp_regressions,
            Anomaly::MissedSwap { .. } => &mut self.missed_swaps,
            Anomaly::NotKeepingUp { .. } => &mut self.not_keeping_up,
            Anomaly::DoubleFill { .. } => &mut self.double_fills,
            Anomaly::ReadyWithoutFill { .. } => &mut self.ready_without_fill,
            Anomaly::DoubleFlushClaim { .. } => &mut self.double_flush_claims,
            Anomaly::DoneWithoutClaim { .. } => &mut self.done_without_claim,
            Anomaly::BeamOutOfRange { .. } => &mut self.beams_out_of_range,
        };
        *count += 1;
    }

    /// Each kind of anomaly with its count.
    pub fn by_kind(&self) -> [(&'static str, usize); 8] {
        [
            ("timestamp regressions", self.timestamp_regressions),
            ("missed swaps", self.missed_swaps),
            ("not keeping up", self.not_keeping_up),
            ("double fills", self.double_fills),
            ("ready without fill", self.ready_without_fill),
            ("double flush claims", self.double_flush_claims),
            ("done without claim", self.done_without_claim),
            ("beams out of range", self.beams_out_of_range),
        ]
    }

    pub fn total(&self) -> usize {
        self.by_kind().iter().map(|(_, count)| count).sum()
    }
}
