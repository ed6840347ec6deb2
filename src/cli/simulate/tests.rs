// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{fs::File, io::Write};

use clap::Parser;
use tempfile::TempDir;

use super::*;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut f = File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_defaults() {
    let args = SimulateArgs::parse_from(["simulate"]);
    let params = args.parse().unwrap();
    assert_eq!(params.filler_config, FillerConfig::default());
    assert_eq!(params.num_cycles, DEFAULT_NUM_CYCLES);
    assert_eq!(params.start_bat, DEFAULT_START_BAT);
    assert_eq!(params.bat_step, DEFAULT_BAT_STEP);
    assert_eq!(
        params.cycle_period,
        Duration::from_millis(DEFAULT_CYCLE_PERIOD_MS)
    );
    assert!(params.writer_delay.is_zero());
    assert_eq!(params.sink_type, SinkType::Null);
    assert!(params.output.is_none());
}

#[test]
fn test_cli_args() {
    #[rustfmt::skip]
    let args = SimulateArgs::parse_from([
        "simulate",
        "--antennas", "6",
        "--beams", "2",
        "--channels", "64",
        "--cycles", "3",
        "--start-bat", "0x2000",
        "--bat-step", "1_000",
        "--cycle-period-ms", "5",
        "--writer-delay-ms", "7",
    ]);
    let params = args.parse().unwrap();
    assert_eq!(params.filler_config.num_antennas, 6);
    assert_eq!(params.filler_config.num_baselines(), 15);
    assert_eq!(params.filler_config.num_beams, 2);
    assert_eq!(params.filler_config.num_channels, 64);
    assert_eq!(params.num_cycles, 3);
    assert_eq!(params.start_bat, 0x2000);
    assert_eq!(params.bat_step, 1000);
    assert_eq!(params.cycle_period, Duration::from_millis(5));
    assert_eq!(params.writer_delay, Duration::from_millis(7));
}

#[test]
fn test_invalid_bat() {
    let args = SimulateArgs::parse_from(["simulate", "--start-bat", "soon"]);
    assert!(matches!(
        args.parse(),
        Err(SimulateArgsError::InvalidBat {
            arg: "start-bat",
            ..
        })
    ));
}

#[test]
fn test_text_sink_needs_output() {
    let args = SimulateArgs::parse_from(["simulate", "--sink", "TEXT"]);
    assert!(matches!(
        args.parse(),
        Err(SimulateArgsError::Sink(SinkError::NoOutput(SinkType::Text)))
    ));

    let args = SimulateArgs::parse_from(["simulate", "--sink", "disk"]);
    assert!(matches!(
        args.parse(),
        Err(SimulateArgsError::Sink(SinkError::InvalidSinkType(_)))
    ));
}

#[test]
fn test_toml_args_file_is_overridden_by_cli() {
    let tmp_dir = TempDir::new().unwrap();
    let args_file = write_file(
        &tmp_dir,
        "args.toml",
        "beams = 4\nchannels = 32\nstart_bat = \"0x100\"\nsink = \"null\"\n",
    );
    let args = SimulateArgs::parse_from([
        "simulate",
        args_file.to_str().unwrap(),
        "--beams",
        "2",
    ]);
    let merged = args.merge().unwrap();
    assert!(merged.args_file.is_none());
    assert_eq!(merged.beams, Some(2));
    assert_eq!(merged.channels, Some(32));
    assert_eq!(merged.start_bat.as_deref(), Some("0x100"));
    assert_eq!(merged.sink.as_deref(), Some("null"));
    assert!(merged.antennas.is_none());

    let params = merged.parse().unwrap();
    assert_eq!(params.start_bat, 0x100);
    assert_eq!(params.filler_config.num_beams, 2);
}

#[test]
fn test_json_args_file() {
    let tmp_dir = TempDir::new().unwrap();
    let args_file = write_file(
        &tmp_dir,
        "args.json",
        r#"{"antennas": 8, "cycles": 2, "writer_delay_ms": 3}"#,
    );
    let args = SimulateArgs::parse_from(["simulate", args_file.to_str().unwrap()]);
    let params = args.merge().unwrap().parse().unwrap();
    assert_eq!(params.filler_config.num_antennas, 8);
    assert_eq!(params.num_cycles, 2);
    assert_eq!(params.writer_delay, Duration::from_millis(3));
}

#[test]
fn test_args_file_with_unknown_extension() {
    let tmp_dir = TempDir::new().unwrap();
    let args_file = write_file(&tmp_dir, "args.yaml", "beams: 4\n");
    let args = SimulateArgs::parse_from(["simulate", args_file.to_str().unwrap()]);
    let result = args.merge();
    assert!(matches!(result, Err(CorrFillerError::ArgFile(_))));
}

#[test]
fn test_bad_toml_args_file() {
    let tmp_dir = TempDir::new().unwrap();
    let args_file = write_file(&tmp_dir, "args.toml", "beams = \"many\"\n");
    let args = SimulateArgs::parse_from(["simulate", args_file.to_str().unwrap()]);
    let err = args.merge().unwrap_err();
    assert!(err.to_string().contains("Couldn't decode toml structure"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let tmp_dir = TempDir::new().unwrap();
    let output = tmp_dir.path().join("products.txt");
    let output_string = output.display().to_string();
    #[rustfmt::skip]
    let args = SimulateArgs::parse_from([
        "simulate",
        "--beams", "1",
        "--cycles", "2",
        "--cycle-period-ms", "1",
        "--sink", "text",
        "--output", &output_string,
    ]);
    assert!(args.clone().run(true).is_ok());
    // Checking that the output is writable leaves an empty file behind.
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");

    assert!(args.run(false).is_ok());
    let contents = std::fs::read_to_string(&output).unwrap();
    assert_eq!(contents.lines().count(), 3);
}

#[test]
fn test_invalid_config_is_caught_before_running() {
    let args = SimulateArgs::parse_from(["simulate", "--antennas", "1"]);
    let result = args.run(true);
    assert!(matches!(result, Err(CorrFillerError::Config(_))));
}
