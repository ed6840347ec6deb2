// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use tempfile::TempDir;

use crate::{corr_filler, get_cmd_output, make_file_in_dir};

#[test]
fn test_simulate_dry_run() {
    #[rustfmt::skip]
    let cmd = corr_filler()
        .args([
            "simulate",
            "--beams", "3",
            "--cycles", "2",
            "--no-progress-bars",
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("3 beams of 216 channels"), "{stdout}");
    assert!(stdout.contains("Dry run -- exiting now."), "{stdout}");
    assert!(!stdout.contains("Wrote"), "{stdout}");
}

#[test]
fn test_simulate_with_null_sink() {
    #[rustfmt::skip]
    let cmd = corr_filler()
        .args([
            "simulate",
            "--antennas", "4",
            "--beams", "2",
            "--channels", "8",
            "--cycles", "4",
            "--cycle-period-ms", "20",
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Wrote 4 of 4 cycles"), "{stdout}");
    assert!(stdout.contains("No anomalies"), "{stdout}");
    assert!(stdout.contains("corr-filler simulate complete."), "{stdout}");
}

#[test]
fn test_simulate_with_text_sink() {
    let tmp_dir = TempDir::new().unwrap();
    let output = tmp_dir.path().join("products.txt");
    let output_string = output.display().to_string();
    #[rustfmt::skip]
    let cmd = corr_filler()
        .args([
            "simulate",
            "--beams", "2",
            "--channels", "4",
            "--cycles", "2",
            "--start-bat", "0x10",
            "--bat-step", "0x10",
            "--cycle-period-ms", "20",
            "--sink", "text",
            "--output", &output_string,
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));

    let contents = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    // 3 baselines with 3 unflagged channels each.
    assert_eq!(
        lines,
        vec![
            "# bat beam unflagged mean_amplitude",
            "0x10 0 9 1.000000",
            "0x10 1 9 2.000000",
            "0x20 0 9 1.000000",
            "0x20 1 9 2.000000",
        ]
    );
}

#[test]
fn test_simulate_with_args_file() {
    let tmp_dir = TempDir::new().unwrap();
    let (args_file, mut f) = make_file_in_dir("args.toml", tmp_dir.path());
    f.write_all(b"beams = 1\ncycles = 2\ncycle_period_ms = 10\n")
        .unwrap();
    drop(f);
    let saved = tmp_dir.path().join("saved.toml");

    let cmd = corr_filler()
        .args([
            "simulate",
            args_file.to_str().unwrap(),
            "--cycles",
            "3",
            "--save-toml",
            saved.to_str().unwrap(),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Wrote 3 of 3 cycles"), "{stdout}");

    let saved = std::fs::read_to_string(saved).unwrap();
    assert!(saved.contains("beams = 1"), "{saved}");
    assert!(saved.contains("cycles = 3"), "{saved}");
}

#[test]
fn test_simulate_invalid_config() {
    let cmd = corr_filler()
        .args(["simulate", "--beams", "0", "--no-progress-bars"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(
        stderr.contains("Error: The number of beams must be at least 1"),
        "{stderr}"
    );
}

#[test]
fn test_simulate_text_sink_without_output() {
    let cmd = corr_filler()
        .args(["simulate", "--sink", "text", "--no-progress-bars"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("needs an output file"), "{stderr}");
}
