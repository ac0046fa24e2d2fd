//! Instant rendering: ISO-8601 UTC, strftime-like patterns, and tick counts.

use time::OffsetDateTime;

use crate::header::PeriodHeader;
use crate::timestamp::{is_time, Instant};

/// How the time column is rendered on output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimeFormat {
    /// `YYYY-MM-DDTHH:MM:SS[.mmm]Z`, always UTC.
    Iso,
    /// Plain integer tick count per the output period header, delta-encoded
    /// when the header says so.
    Ticks,
    /// A strftime-like pattern (starts with `%`).
    Pattern(String),
}

impl TimeFormat {
    /// Interpret a CLI selector: a string starting with `%` is a pattern,
    /// `t` or `ticks` selects tick counts, anything else is ISO.
    pub fn from_selector(selector: &str) -> Self {
        if selector.starts_with('%') {
            TimeFormat::Pattern(selector.to_string())
        } else if selector == "t" || selector == "ticks" {
            TimeFormat::Ticks
        } else {
            TimeFormat::Iso
        }
    }
}

/// Stateful renderer: tick mode in delta encoding needs the previously
/// written instant. One renderer per output stream.
pub struct TimeRenderer {
    format: TimeFormat,
    header: PeriodHeader,
    prev: Instant,
}

impl TimeRenderer {
    pub fn new(format: TimeFormat, header: PeriodHeader) -> Self {
        Self { format, header, prev: 0 }
    }

    /// Render one instant. The sentinel renders as `*` in every mode.
    pub fn render(&mut self, t: Instant) -> String {
        if !is_time(t) {
            return "*".to_string();
        }
        match &self.format {
            TimeFormat::Iso => format_iso(t),
            TimeFormat::Pattern(pattern) => format_pattern(t, pattern),
            TimeFormat::Ticks => {
                let raw = if self.header.delta {
                    let delta = t - self.prev;
                    self.prev = t;
                    delta
                } else {
                    t
                };
                (raw / self.header.unit_ms).to_string()
            }
        }
    }
}

fn split_ms(t: Instant) -> (i64, i64) {
    (t.div_euclid(1000), t.rem_euclid(1000))
}

/// `YYYY-MM-DDTHH:MM:SS` with a `.mmm` suffix only when the millisecond
/// remainder is non-zero, then a literal `Z`.
pub fn format_iso(t: Instant) -> String {
    let (secs, ms) = split_ms(t);
    let dt = match OffsetDateTime::from_unix_timestamp(secs) {
        Ok(dt) => dt,
        Err(_) => return "*".to_string(),
    };
    let mut out = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        dt.year(),
        dt.month() as u8,
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    );
    if ms != 0 {
        out.push_str(&format!(".{ms:03}"));
    }
    out.push('Z');
    out
}

/// Render `t` through a strftime-like pattern, in UTC. Supported: %Y %m %d
/// %H %M %S %j %e %F %T %%; an unknown specifier is copied through verbatim.
pub fn format_pattern(t: Instant, pattern: &str) -> String {
    let (secs, _) = split_ms(t);
    let dt = match OffsetDateTime::from_unix_timestamp(secs) {
        Ok(dt) => dt,
        Err(_) => return "*".to_string(),
    };

    let mut out = String::with_capacity(pattern.len() + 16);
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('Y') => out.push_str(&format!("{:04}", dt.year())),
            Some('m') => out.push_str(&format!("{:02}", dt.month() as u8)),
            Some('d') => out.push_str(&format!("{:02}", dt.day())),
            Some('e') => out.push_str(&format!("{:2}", dt.day())),
            Some('H') => out.push_str(&format!("{:02}", dt.hour())),
            Some('M') => out.push_str(&format!("{:02}", dt.minute())),
            Some('S') => out.push_str(&format!("{:02}", dt.second())),
            Some('j') => out.push_str(&format!("{:03}", dt.ordinal())),
            Some('F') => out.push_str(&format!(
                "{:04}-{:02}-{:02}",
                dt.year(),
                dt.month() as u8,
                dt.day()
            )),
            Some('T') => out.push_str(&format!(
                "{:02}:{:02}:{:02}",
                dt.hour(),
                dt.minute(),
                dt.second()
            )),
            Some('%') => out.push('%'),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::NOT_A_TIME;

    // 2020-01-02T03:04:05Z
    const BASE_MS: Instant = 1_577_934_245_000;

    #[test]
    fn iso_whole_seconds() {
        assert_eq!(format_iso(BASE_MS), "2020-01-02T03:04:05Z");
    }

    #[test]
    fn iso_subsecond_suffix_only_when_nonzero() {
        assert_eq!(format_iso(BASE_MS + 7), "2020-01-02T03:04:05.007Z");
        assert_eq!(format_iso(BASE_MS + 500), "2020-01-02T03:04:05.500Z");
    }

    #[test]
    fn iso_pre_epoch() {
        assert_eq!(format_iso(-86_400_000), "1969-12-31T00:00:00Z");
        // negative instants split into floor seconds + positive remainder
        assert_eq!(format_iso(-500), "1969-12-31T23:59:59.500Z");
    }

    #[test]
    fn sentinel_renders_placeholder() {
        let mut r = TimeRenderer::new(TimeFormat::Iso, PeriodHeader { delta: false, unit_ms: 1000 });
        assert_eq!(r.render(NOT_A_TIME), "*");
        let mut r = TimeRenderer::new(TimeFormat::Ticks, PeriodHeader { delta: true, unit_ms: 1000 });
        assert_eq!(r.render(NOT_A_TIME), "*");
    }

    #[test]
    fn pattern_subset() {
        assert_eq!(format_pattern(BASE_MS, "%Y/%m/%d %H:%M:%S"), "2020/01/02 03:04:05");
        assert_eq!(format_pattern(BASE_MS, "%FT%T"), "2020-01-02T03:04:05");
        assert_eq!(format_pattern(BASE_MS, "%j"), "002");
        assert_eq!(format_pattern(BASE_MS, "100%%"), "100%");
        // unknown specifiers pass through
        assert_eq!(format_pattern(BASE_MS, "%q"), "%q");
    }

    #[test]
    fn ticks_absolute() {
        let mut r = TimeRenderer::new(TimeFormat::Ticks, PeriodHeader { delta: false, unit_ms: 1000 });
        assert_eq!(r.render(5000), "5");
        assert_eq!(r.render(12_000), "12");
    }

    #[test]
    fn ticks_delta() {
        let mut r = TimeRenderer::new(TimeFormat::Ticks, PeriodHeader { delta: true, unit_ms: 1000 });
        assert_eq!(r.render(5000), "5");
        assert_eq!(r.render(12_000), "7");
        assert_eq!(r.render(12_000), "0");
    }

    #[test]
    fn selector_mapping() {
        assert_eq!(TimeFormat::from_selector("iso"), TimeFormat::Iso);
        assert_eq!(TimeFormat::from_selector("t"), TimeFormat::Ticks);
        assert_eq!(
            TimeFormat::from_selector("%Y-%m-%d"),
            TimeFormat::Pattern("%Y-%m-%d".to_string())
        );
    }
}
