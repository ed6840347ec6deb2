// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::read_to_string;

use num_complex::Complex;
use tempfile::TempDir;

use super::*;

#[test]
fn test_sink_type_parsing() {
    assert_eq!(SinkType::parse("null").unwrap(), SinkType::Null);
    assert_eq!(SinkType::parse("TEXT").unwrap(), SinkType::Text);
    let result = SinkType::parse("ms");
    assert!(matches!(result, Err(SinkError::InvalidSinkType(_))));
    let msg = result.err().unwrap().to_string();
    assert!(msg.contains("null, text"), "{msg}");
}

#[test]
fn test_null_sink_counts() {
    let mut sink = NullSink::default();
    let mut p = CorrProducts::new(3, 4, 0);
    sink.write(&p).unwrap();
    p.flags[(0, 0)] = false;
    sink.write(&p).unwrap();
    assert_eq!(
        sink.finish().unwrap(),
        "Discarded 2 products (1 unflagged samples)"
    );
}

#[test]
fn test_text_sink_writes_one_line_per_products() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let path = tmp_dir.path().join("products.txt");
    let mut sink = new_sink(SinkType::Text, Some(path.clone())).unwrap();

    let mut p = CorrProducts::new(2, 2, 3);
    p.init(0x10);
    sink.write(&p).unwrap();
    p.visibilities[(0, 1)] = Complex::new(0.0, 2.0);
    p.flags[(0, 1)] = false;
    sink.write(&p).unwrap();
    let summary = sink.finish().unwrap();
    assert!(summary.starts_with("Wrote 2 products summaries"), "{summary}");

    let contents = read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines,
        vec![
            "# bat beam unflagged mean_amplitude",
            "0x10 3 0 NaN",
            "0x10 3 1 2.000000"
        ]
    );
}

#[test]
fn test_text_sink_needs_an_output() {
    let result = new_sink(SinkType::Text, None);
    assert!(matches!(result, Err(SinkError::NoOutput(SinkType::Text))));
}

#[test]
fn test_text_sink_in_missing_directory_is_not_writable() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let path = tmp_dir.path().join("does_not_exist").join("products.txt");
    let result = new_sink(SinkType::Text, Some(path));
    assert!(matches!(result, Err(SinkError::FileNotWritable(_))));
}
