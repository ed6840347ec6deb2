// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod tests;

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{
    parse_bat, ANTENNAS_HELP, ARG_FILE_HELP, BAT_STEP_HELP, BEAMS_HELP, CHANNELS_HELP,
    CYCLES_HELP, CYCLE_PERIOD_HELP, SINK_TYPE_HELP, START_BAT_HELP,
};
use crate::{
    config::FillerConfig,
    constants::{
        DEFAULT_BAT_STEP, DEFAULT_CYCLE_PERIOD_MS, DEFAULT_NUM_ANTENNAS, DEFAULT_NUM_BEAMS,
        DEFAULT_NUM_CHANNELS, DEFAULT_NUM_CYCLES, DEFAULT_START_BAT, DEFAULT_WRITER_DELAY_MS,
    },
    simulate::SimulateParams,
    sink::{can_write_to_file, SinkError, SinkType},
    CorrFillerError,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SimulateArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    #[serde(skip)]
    pub(super) args_file: Option<PathBuf>,

    #[clap(long, help = ANTENNAS_HELP.as_str(), help_heading = "FILLER")]
    pub(super) antennas: Option<usize>,

    #[clap(long, help = BEAMS_HELP.as_str(), help_heading = "FILLER")]
    pub(super) beams: Option<usize>,

    #[clap(long, help = CHANNELS_HELP.as_str(), help_heading = "FILLER")]
    pub(super) channels: Option<usize>,

    #[clap(long, help = CYCLES_HELP.as_str(), help_heading = "CYCLES")]
    pub(super) cycles: Option<usize>,

    #[clap(long, help = START_BAT_HELP.as_str(), help_heading = "CYCLES")]
    pub(super) start_bat: Option<String>,

    #[clap(long, help = BAT_STEP_HELP.as_str(), help_heading = "CYCLES")]
    pub(super) bat_step: Option<String>,

    #[clap(long, help = CYCLE_PERIOD_HELP.as_str(), help_heading = "CYCLES")]
    pub(super) cycle_period_ms: Option<u64>,

    /// Make the writer sleep this long before writing each cycle, emulating
    /// slow storage [milliseconds]. Default: 0
    #[clap(long, help_heading = "OUTPUT")]
    pub(super) writer_delay_ms: Option<u64>,

    #[clap(long, help = SINK_TYPE_HELP.as_str(), help_heading = "OUTPUT")]
    pub(super) sink: Option<String>,

    /// The file to write to. Required by the text sink.
    #[clap(short = 'o', long, help_heading = "OUTPUT")]
    pub(super) output: Option<PathBuf>,
}

impl SimulateArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<SimulateArgs, CorrFillerError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let SimulateArgs {
                args_file: _,
                antennas,
                beams,
                channels,
                cycles,
                start_bat,
                bat_step,
                cycle_period_ms,
                writer_delay_ms,
                sink,
                output,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(SimulateArgs {
                args_file: None,
                antennas: cli_args.antennas.or(antennas),
                beams: cli_args.beams.or(beams),
                channels: cli_args.channels.or(channels),
                cycles: cli_args.cycles.or(cycles),
                start_bat: cli_args.start_bat.or(start_bat),
                bat_step: cli_args.bat_step.or(bat_step),
                cycle_period_ms: cli_args.cycle_period_ms.or(cycle_period_ms),
                writer_delay_ms: cli_args.writer_delay_ms.or(writer_delay_ms),
                sink: cli_args.sink.or(sink),
                output: cli_args.output.or(output),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<SimulateParams, SimulateArgsError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            antennas,
            beams,
            channels,
            cycles,
            start_bat,
            bat_step,
            cycle_period_ms,
            writer_delay_ms,
            sink,
            output,
        } = self;

        let start_bat = match start_bat {
            None => DEFAULT_START_BAT,
            Some(s) => parse_bat(&s).ok_or(SimulateArgsError::InvalidBat {
                arg: "start-bat",
                value: s,
            })?,
        };
        let bat_step = match bat_step {
            None => DEFAULT_BAT_STEP,
            Some(s) => parse_bat(&s).ok_or(SimulateArgsError::InvalidBat {
                arg: "bat-step",
                value: s,
            })?,
        };
        let sink_type = match sink {
            None => SinkType::Null,
            Some(s) => SinkType::parse(&s)?,
        };
        match (sink_type, output.as_deref()) {
            (SinkType::Text, None) => return Err(SinkError::NoOutput(sink_type).into()),
            (SinkType::Text, Some(output)) => can_write_to_file(output)?,
            (SinkType::Null, _) => (),
        }

        let params = SimulateParams {
            filler_config: FillerConfig {
                num_antennas: antennas.unwrap_or(DEFAULT_NUM_ANTENNAS),
                num_beams: beams.unwrap_or(DEFAULT_NUM_BEAMS),
                num_channels: channels.unwrap_or(DEFAULT_NUM_CHANNELS),
            },
            num_cycles: cycles.unwrap_or(DEFAULT_NUM_CYCLES),
            start_bat,
            bat_step,
            cycle_period: Duration::from_millis(
                cycle_period_ms.unwrap_or(DEFAULT_CYCLE_PERIOD_MS),
            ),
            writer_delay: Duration::from_millis(
                writer_delay_ms.unwrap_or(DEFAULT_WRITER_DELAY_MS),
            ),
            sink_type,
            output,
        };

        let FillerConfig {
            num_antennas,
            num_beams,
            num_channels,
        } = params.filler_config;
        info!("Filler:");
        info!("  {num_antennas} antennas ({} baselines)", params.filler_config.num_baselines());
        info!("  {num_beams} beams of {num_channels} channels");
        info!("Cycles:");
        info!(
            "  {} from BAT {:#x} in steps of {}",
            params.num_cycles, params.start_bat, params.bat_step
        );
        info!("  one every {:?}", params.cycle_period);
        info!("Output:");
        match params.output.as_ref() {
            Some(output) => info!("  {} sink to '{}'", params.sink_type, output.display()),
            None => info!("  {} sink", params.sink_type),
        }
        if !params.writer_delay.is_zero() {
            info!("  writer delayed by {:?} per cycle", params.writer_delay);
        }

        Ok(params)
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), CorrFillerError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;
        params.validate()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()?;
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub(super) enum SimulateArgsError {
    #[error("Couldn't parse '{value}' as a BAT for --{arg}; expected a decimal or 0x-prefixed hexadecimal integer")]
    InvalidBat { arg: &'static str, value: String },

    #[error(transparent)]
    Sink(#[from] SinkError),
}
