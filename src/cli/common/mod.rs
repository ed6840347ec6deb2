// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Things shared by `corr-filler` subcommands, chiefly the handling of
//! arguments files.


use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    constants::{
        DEFAULT_BAT_STEP, DEFAULT_CYCLE_PERIOD_MS, DEFAULT_NUM_ANTENNAS, DEFAULT_NUM_BEAMS,
        DEFAULT_NUM_CHANNELS, DEFAULT_NUM_CYCLES, DEFAULT_START_BAT,
    },
    sink::SINK_TYPES_COMMA_SEPARATED,
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    pub(super) static ref ANTENNAS_HELP: String =
        format!("The number of antennas being correlated. Default: {DEFAULT_NUM_ANTENNAS}");

    pub(super) static ref BEAMS_HELP: String =
        format!("The number of beams being correlated in parallel. Each gets its own worker thread. Default: {DEFAULT_NUM_BEAMS}");

    pub(super) static ref CHANNELS_HELP: String =
        format!("The number of spectral channels per beam. Default: {DEFAULT_NUM_CHANNELS}");

    pub(super) static ref CYCLES_HELP: String =
        format!("The number of correlation cycles to simulate. Default: {DEFAULT_NUM_CYCLES}");

    pub(super) static ref START_BAT_HELP: String =
        format!("The BAT of the first cycle. Hexadecimal values need a 0x prefix. Default: {DEFAULT_START_BAT:#x}");

    pub(super) static ref BAT_STEP_HELP: String =
        format!("The BAT increment between cycles [microseconds]. Hexadecimal values need a 0x prefix. Default: {DEFAULT_BAT_STEP}");

    pub(super) static ref CYCLE_PERIOD_HELP: String =
        format!("The wall-clock time between cycles [milliseconds]. Default: {DEFAULT_CYCLE_PERIOD_MS}");

    pub(super) static ref SINK_TYPE_HELP: String =
        format!("Where to write completed products. Supported: {}. Default: null", *SINK_TYPES_COMMA_SEPARATED);
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

/// Read an arguments file into whatever type is expected, deciding how to
/// decode it from the file's extension. Returns early from the calling
/// function on failure.
macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(CorrFillerError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(CorrFillerError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(CorrFillerError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// Parse a BAT (or BAT interval) given as a decimal or 0x-prefixed
/// hexadecimal integer. Underscores are allowed as digit separators.
pub(super) fn parse_bat(s: &str) -> Option<u64> {
    let s = s.trim().replace('_', "");
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}
