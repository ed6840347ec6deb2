// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Destinations for completed correlation products.
//!
//! The real storage schema lives elsewhere; these sinks exist so that the
//! writer side of the filler can be driven and inspected.

mod error;
mod text;
#[cfg(test)]
mod tests;

pub use error::SinkError;
pub use text::TextSink;

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::products::CorrProducts;

#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq)]
/// All supported sinks.
pub enum SinkType {
    #[strum(serialize = "null")]
    Null,
    #[strum(serialize = "text")]
    Text,
}

lazy_static::lazy_static! {
    pub(crate) static ref SINK_TYPES_COMMA_SEPARATED: String = SinkType::iter().join(", ");
}

impl SinkType {
    /// Parse a user-supplied sink type, case insensitively.
    pub fn parse(s: &str) -> Result<SinkType, SinkError> {
        SinkType::from_str(&s.to_lowercase()).map_err(|_| SinkError::InvalidSinkType(s.to_string()))
    }
}

/// Something that persists the products of completed cycles. A sink is only
/// ever driven by the single writer thread.
pub trait ProductsSink: Send {
    /// Persist the products of one beam.
    fn write(&mut self, products: &CorrProducts) -> Result<(), SinkError>;

    /// Finish writing. Returns a neatly-formatted summary of what was written.
    fn finish(&mut self) -> Result<String, SinkError>;
}

/// A sink that discards everything, but keeps count.
#[derive(Debug, Default)]
pub struct NullSink {
    num_products: usize,
    num_unflagged: usize,
}

impl ProductsSink for NullSink {
    fn write(&mut self, products: &CorrProducts) -> Result<(), SinkError> {
        self.num_products += 1;
        self.num_unflagged += products.num_unflagged();
        Ok(())
    }

    fn finish(&mut self) -> Result<String, SinkError> {
        Ok(format!(
            "Discarded {} products ({} unflagged samples)",
            self.num_products, self.num_unflagged
        ))
    }
}

/// Check that a file can be written to. The file is left in place but
/// truncated.
pub(crate) fn can_write_to_file(file: &Path) -> Result<(), SinkError> {
    match OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file)
    {
        Ok(_) => Ok(()),
        Err(e) => match e.kind() {
            std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::NotFound => {
                Err(SinkError::FileNotWritable(file.to_path_buf()))
            }
            _ => Err(SinkError::IO(e)),
        },
    }
}

/// Create a sink of the requested type.
pub fn new_sink(
    sink_type: SinkType,
    output: Option<PathBuf>,
) -> Result<Box<dyn ProductsSink>, SinkError> {
    match sink_type {
        SinkType::Null => Ok(Box::<NullSink>::default()),
        SinkType::Text => {
            let output = output.ok_or(SinkError::NoOutput(sink_type))?;
            can_write_to_file(&output)?;
            Ok(Box::new(TextSink::new(&output)?))
        }
    }
}
