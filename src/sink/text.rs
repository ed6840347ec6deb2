// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::debug;

use super::{ProductsSink, SinkError};
use crate::products::CorrProducts;

/// Write a one-line summary of each beam's products to a text file.
///
/// Columns: BAT (hex), beam, number of unflagged samples, mean unflagged
/// amplitude (`NaN` when everything is flagged).
pub struct TextSink {
    path: PathBuf,
    writer: BufWriter<File>,
    num_lines: usize,
}

impl TextSink {
    pub fn new(path: &Path) -> Result<TextSink, SinkError> {
        debug!("Opening '{}' for products summaries", path.display());
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "# bat beam unflagged mean_amplitude")?;
        Ok(TextSink {
            path: path.to_path_buf(),
            writer,
            num_lines: 0,
        })
    }
}

impl ProductsSink for TextSink {
    fn write(&mut self, products: &CorrProducts) -> Result<(), SinkError> {
        writeln!(
            self.writer,
            "{:#x} {} {} {:.6}",
            products.bat,
            products.beam,
            products.num_unflagged(),
            products.mean_unflagged_amplitude().unwrap_or(f64::NAN)
        )?;
        self.num_lines += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<String, SinkError> {
        self.writer.flush()?;
        Ok(format!(
            "Wrote {} products summaries to '{}'",
            self.num_lines,
            self.path.display()
        ))
    }
}
