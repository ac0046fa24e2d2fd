//! Period header codec.
//!
//! The header `[d]t[N][unit]` describes how the time column is encoded:
//! a leading `d` marks delta encoding (each time field is an offset from the
//! previous absolute instant), `t` is mandatory, and the optional magnitude
//! plus unit suffix (`ms`, `s`, `m`, `h`) give the size of one raw time unit
//! in milliseconds. A bare `t` means seconds.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodHeader {
    pub delta: bool,
    pub unit_ms: i64,
}

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

impl PeriodHeader {
    /// Parse `[d]t[N][unit]`. Returns `None` when the mandatory `t` is
    /// missing or the unit suffix is unrecognized. A malformed or absent
    /// magnitude falls back to 1 rather than failing.
    pub fn parse(text: &str) -> Option<Self> {
        let mut p = text.trim_start();

        let delta = match p.strip_prefix('d') {
            Some(rest) => {
                p = rest;
                true
            }
            None => false,
        };
        p = p.strip_prefix('t')?;
        if p.is_empty() {
            return Some(Self { delta, unit_ms: MS_PER_SECOND });
        }

        let digits = p.len() - p.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        // A magnitude of 0 would make a zero-width unit; treat it like any
        // other malformed magnitude and fall back to 1.
        let magnitude = p[..digits]
            .parse::<i64>()
            .ok()
            .filter(|&m| m > 0)
            .unwrap_or(1);
        p = p[digits..].trim_start();

        // `ms` must be checked before the bare `s` prefix.
        let unit_ms = if p.is_empty() {
            magnitude * MS_PER_SECOND
        } else if p.starts_with("ms") {
            magnitude
        } else if p.starts_with('s') {
            magnitude * MS_PER_SECOND
        } else if p.starts_with('m') {
            magnitude * MS_PER_MINUTE
        } else if p.starts_with('h') {
            magnitude * MS_PER_HOUR
        } else {
            return None;
        };
        Some(Self { delta, unit_ms })
    }

    /// Render using the largest unit that divides `unit_ms` evenly, omitting
    /// a magnitude of 1. Inverse of [`PeriodHeader::parse`].
    pub fn unparse(&self) -> String {
        let (magnitude, unit) = if self.unit_ms >= MS_PER_HOUR && self.unit_ms % MS_PER_HOUR == 0 {
            (self.unit_ms / MS_PER_HOUR, "h")
        } else if self.unit_ms >= MS_PER_MINUTE && self.unit_ms % MS_PER_MINUTE == 0 {
            (self.unit_ms / MS_PER_MINUTE, "m")
        } else if self.unit_ms >= MS_PER_SECOND && self.unit_ms % MS_PER_SECOND == 0 {
            (self.unit_ms / MS_PER_SECOND, "s")
        } else {
            (self.unit_ms, "ms")
        };

        let mut out = String::new();
        if self.delta {
            out.push('d');
        }
        out.push('t');
        if magnitude != 1 {
            out.push_str(&magnitude.to_string());
        }
        out.push_str(unit);
        out
    }
}

impl fmt::Display for PeriodHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unparse())
    }
}
