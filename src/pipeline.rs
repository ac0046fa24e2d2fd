//! Per-stream driver: CSV records in, filtered samples out.
//!
//! The first retained record is the stream header (`period-header,label`);
//! every following record is `timestamp,value`. Records flow through the
//! resampler, then the change filter, then the inclusive start/end bounds,
//! then the time renderer. All per-stream state lives inside [`process`] so
//! nothing leaks between input files; only the timestamp parser (a cache,
//! not state) is shared across files.

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::filter::ChangeFilter;
use crate::format::{TimeFormat, TimeRenderer};
use crate::header::PeriodHeader;
use crate::resample::Resampler;
use crate::timestamp::{is_time, Instant, TimestampParser, NOT_A_TIME};

#[derive(Clone, Debug)]
pub struct Config {
    /// Minimum absolute change required to pass the filter.
    pub min_delta: f64,
    /// Values inside `(-zdb, zdb)` are treated as exactly 0.
    pub zero_dead_band: f64,
    /// Resampling interval in milliseconds; 0 or negative disables resampling.
    pub every: i64,
    /// Inclusive lower bound on emitted instants.
    pub start: Option<Instant>,
    /// Inclusive upper bound on emitted instants.
    pub end: Option<Instant>,
    pub time_format: TimeFormat,
    /// Output period header; defaults to the input stream's own header.
    pub out_header: Option<PeriodHeader>,
    pub field_sep: String,
    pub record_sep: String,
    pub show_time: bool,
    pub show_value: bool,
    /// Strip `#` comment lines before interpretation.
    pub strip_meta: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_delta: 0.0,
            zero_dead_band: 0.0,
            every: 0,
            start: None,
            end: None,
            time_format: TimeFormat::Iso,
            out_header: None,
            field_sep: ",".to_string(),
            record_sep: "\n".to_string(),
            show_time: true,
            show_value: true,
            strip_meta: true,
        }
    }
}

/// Run one input stream to completion. An empty stream produces no output.
///
/// Fatal: a malformed header, a record with a field count other than 2, and
/// I/O failures. Non-fatal: a data timestamp that fails every layout becomes
/// the sentinel and renders as `*` (dropped instead when resampling, since
/// grid arithmetic on it is meaningless), and an unparseable value field is
/// taken as 0 with a warning.
pub fn process<R: Read, W: Write>(
    cfg: &Config,
    parser: &mut TimestampParser,
    input: R,
    output: &mut W,
) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(cfg.strip_meta.then_some(b'#'))
        .from_reader(input);
    let mut records = reader.records();

    let header_record = match records.next() {
        Some(record) => record?,
        None => return Ok(()),
    };
    if header_record.len() != 2 {
        return Err(Error::FieldCount {
            line: record_line(&header_record),
            count: header_record.len(),
        });
    }
    let in_header = PeriodHeader::parse(&header_record[0]).ok_or_else(|| Error::Header {
        input: header_record[0].to_string(),
    })?;
    let label = header_record[1].to_string();
    let out_header = cfg.out_header.unwrap_or(in_header);

    match (cfg.show_time, cfg.show_value) {
        (true, true) => write!(
            output,
            "{}{}{}{}",
            out_header, cfg.field_sep, label, cfg.record_sep
        )?,
        (true, false) => write!(output, "{}{}", out_header, cfg.record_sep)?,
        (false, true) => write!(output, "{}{}", label, cfg.record_sep)?,
        (false, false) => {}
    }

    let mut renderer = TimeRenderer::new(cfg.time_format.clone(), out_header);
    let mut resampler = Resampler::new(cfg.every);
    let mut filter = ChangeFilter::new(cfg.zero_dead_band, cfg.min_delta);
    // Delta decoding accumulates from instant 0.
    let mut last_abs: Instant = 0;
    let mut emitted: Vec<(Instant, f64)> = Vec::new();

    for record in records {
        let record = record?;
        if record.len() != 2 {
            return Err(Error::FieldCount {
                line: record_line(&record),
                count: record.len(),
            });
        }

        let t = if in_header.delta {
            // Overflow (including landing exactly on the sentinel) makes the
            // record unparseable rather than wrapping; the accumulator keeps
            // its last good value.
            match record[0].parse::<i64>().ok().and_then(|offset| {
                offset
                    .checked_mul(in_header.unit_ms)
                    .and_then(|step| last_abs.checked_add(step))
                    .filter(|&t| t != NOT_A_TIME)
            }) {
                Some(t) => {
                    last_abs = t;
                    t
                }
                None => NOT_A_TIME,
            }
        } else {
            parser.parse(&record[0])
        };
        let value = match record[1].parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                log::warn!(
                    "line {}: unparseable value {:?}, using 0",
                    record_line(&record),
                    &record[1]
                );
                0.0
            }
        };

        if !is_time(t) {
            if cfg.every <= 0 {
                if let Some(passed) = filter.accept(value) {
                    write_row(cfg, &mut renderer, output, NOT_A_TIME, passed)?;
                }
            } else {
                log::warn!(
                    "line {}: unparseable timestamp {:?} dropped while resampling",
                    record_line(&record),
                    &record[0]
                );
            }
            continue;
        }

        emitted.clear();
        resampler.push(t, value, &mut emitted);
        for &(rt, rv) in &emitted {
            if let Some(passed) = filter.accept(rv) {
                if in_bounds(cfg, rt) {
                    write_row(cfg, &mut renderer, output, rt, passed)?;
                }
            }
        }
    }
    Ok(())
}

fn in_bounds(cfg: &Config, t: Instant) -> bool {
    cfg.start.map_or(true, |s| t >= s) && cfg.end.map_or(true, |e| t <= e)
}

fn write_row<W: Write>(
    cfg: &Config,
    renderer: &mut TimeRenderer,
    output: &mut W,
    t: Instant,
    value: f64,
) -> Result<()> {
    match (cfg.show_time, cfg.show_value) {
        (true, true) => write!(
            output,
            "{}{}{}{}",
            renderer.render(t),
            cfg.field_sep,
            value,
            cfg.record_sep
        )?,
        (true, false) => write!(output, "{}{}", renderer.render(t), cfg.record_sep)?,
        (false, true) => write!(output, "{}{}", value, cfg.record_sep)?,
        (false, false) => {}
    }
    Ok(())
}

fn record_line(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}
