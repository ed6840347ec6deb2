// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use super::SINK_TYPES_COMMA_SEPARATED;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error(
        "An invalid sink type was specified ({0}). Supported:\n{}",
        *SINK_TYPES_COMMA_SEPARATED,
    )]
    InvalidSinkType(String),

    #[error("The '{0}' sink needs an output file, but none was specified")]
    NoOutput(super::SinkType),

    #[error("Cannot write to the specified file '{}'. Do you have write permissions set?", .0.display())]
    FileNotWritable(PathBuf),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
