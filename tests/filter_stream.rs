use std::fs::File;
use std::io::Write;

use tempfile::tempdir;

use tst::{process, Config, PeriodHeader, TimeFormat, TimestampParser};

fn run(cfg: &Config, input: &str) -> String {
    let mut parser = TimestampParser::new();
    let mut out = Vec::new();
    process(cfg, &mut parser, input.as_bytes(), &mut out).expect("process");
    String::from_utf8(out).expect("utf8 output")
}

#[test]
fn end_to_end_identity() {
    // No resampling, no filtering: three rows pass through with ISO times.
    // The header unit (bare "t" = seconds) is re-rendered in canonical form.
    let out = run(
        &Config::default(),
        "t,value\n0,1.0\n1000,2.0\n2000,1.5\n",
    );
    assert_eq!(
        out,
        "ts,value\n\
         1970-01-01T00:00:00Z,1\n\
         1970-01-01T00:00:01Z,2\n\
         1970-01-01T00:00:02Z,1.5\n"
    );
}

#[test]
fn resample_onto_grid() {
    let cfg = Config {
        every: 1000,
        ..Config::default()
    };
    let out = run(&cfg, "tms,value\n500,1.0\n1500,2.0\n2600,3.0\n");
    assert_eq!(
        out,
        "tms,value\n\
         1970-01-01T00:00:01Z,1\n\
         1970-01-01T00:00:02Z,2\n"
    );
}

#[test]
fn resample_then_suppress() {
    // Carry-forward emits a repeat at 2000 which the filter then drops.
    let cfg = Config {
        every: 1000,
        min_delta: 0.5,
        ..Config::default()
    };
    let out = run(&cfg, "tms,value\n0,1.0\n2500,1.1\n3000,2.0\n");
    assert_eq!(
        out,
        "tms,value\n\
         1970-01-01T00:00:00Z,1\n\
         1970-01-01T00:00:03Z,2\n"
    );
}

#[test]
fn delta_tick_output() {
    let cfg = Config {
        time_format: TimeFormat::Ticks,
        out_header: Some(PeriodHeader { delta: true, unit_ms: 1000 }),
        ..Config::default()
    };
    let out = run(&cfg, "ts,value\n5000,1.0\n12000,2.0\n");
    assert_eq!(out, "dts,value\n5,1\n7,2\n");
}

#[test]
fn custom_pattern_and_separators() {
    let cfg = Config {
        time_format: TimeFormat::Pattern("%Y%m%d".to_string()),
        field_sep: ";".to_string(),
        record_sep: "|".to_string(),
        ..Config::default()
    };
    let out = run(&cfg, "ts,value\n0,1.0\n");
    assert_eq!(out, "ts;value|19700101;1|");
}

#[test]
fn per_file_state_does_not_leak() {
    // A large min-delta suppresses everything except the first sample of
    // each stream; the second stream must start fresh.
    let cfg = Config {
        min_delta: 100.0,
        ..Config::default()
    };
    let mut parser = TimestampParser::new();
    let mut out = Vec::new();
    process(&cfg, &mut parser, "ts,a\n1000,1.0\n2000,1.5\n".as_bytes(), &mut out)
        .expect("first stream");
    process(&cfg, &mut parser, "ts,b\n5000,1.0\n6000,1.5\n".as_bytes(), &mut out)
        .expect("second stream");
    let out = String::from_utf8(out).expect("utf8 output");
    assert_eq!(
        out,
        "ts,a\n1970-01-01T00:00:01Z,1\n\
         ts,b\n1970-01-01T00:00:05Z,1\n"
    );
}

#[test]
fn mixed_timestamp_layouts_in_one_stream() {
    let out = run(
        &Config::default(),
        "ts,value\n2020-01-02T03:04:05,1.0\n2020-01-02T03:04:05.5,2.0\n1577934246000,3.0\n",
    );
    assert_eq!(
        out,
        "ts,value\n\
         2020-01-02T03:04:05Z,1\n\
         2020-01-02T03:04:05.500Z,2\n\
         2020-01-02T03:04:06Z,3\n"
    );
}

#[test]
fn reads_from_a_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("input.csv");
    let mut file = File::create(&path).expect("create input");
    file.write_all(b"# generated\nts,value\n1000,1.0\n")
        .expect("write input");
    drop(file);

    let mut parser = TimestampParser::new();
    let mut out = Vec::new();
    let input = File::open(&path).expect("open input");
    process(&Config::default(), &mut parser, input, &mut out).expect("process file");
    assert_eq!(
        String::from_utf8(out).expect("utf8 output"),
        "ts,value\n1970-01-01T00:00:01Z,1\n"
    );
}
