//! Multi-layout timestamp parsing.
//!
//! An input token is matched against a fixed, priority-ordered table of
//! candidate layouts: numeric epoch milliseconds, ISO-8601 variants with
//! optional fractional seconds and numeric zone, date-only, year+zone, and a
//! legacy vendor date/time. The last successful layout index is cached so a
//! homogeneous stream pays for one match attempt per record; the cache is a
//! speed hint only and never affects the result.
//!
//! Calendar fields are combined in UTC. The historical tool leaned on the
//! host's local-time conversion, which made results depend on the process
//! environment; here UTC is the documented, fixed choice.

use time::{Date, Month, PrimitiveDateTime, Time};

/// Milliseconds since the Unix epoch. Negative values are valid (pre-epoch).
pub type Instant = i64;

/// Sentinel for "not a time". `i64::MIN` is unreachable by any successful
/// parse, so arithmetic on real instants can never collide with it.
pub const NOT_A_TIME: Instant = i64::MIN;

pub fn is_time(t: Instant) -> bool {
    t != NOT_A_TIME
}

#[derive(Clone, Copy)]
enum Token {
    /// The whole input is a signed decimal epoch-millisecond count.
    Numeric,
    /// A fractional-second literal at the cursor, e.g. `.123`.
    SubSecond,
    /// A strptime-style pattern matched at the cursor.
    Calendar(&'static str),
}

// Priority order matters: the numeric layout must come first so that a plain
// number is never claimed as a bare year by the year+zone layout.
const LAYOUTS: &[&[Token]] = &[
    &[Token::Numeric],
    &[Token::Calendar("%Y-%m-%dT%H:%M:%S")],
    &[Token::Calendar("%Y-%m-%dT%H:%M:%S"), Token::SubSecond],
    &[
        Token::Calendar("%Y-%m-%dT%H:%M:%S"),
        Token::SubSecond,
        Token::Calendar("%z"),
    ],
    &[Token::Calendar("%Y-%m-%d")],
    &[Token::Calendar("%Y"), Token::Calendar("%z")],
    // timestamps from OSIsoft PI
    &[Token::Calendar("%d/%m/%Y %H:%M:%S %p")],
];

/// Format-guessing timestamp parser with a cached preferred layout.
pub struct TimestampParser {
    cached: Option<usize>,
}

impl TimestampParser {
    pub fn new() -> Self {
        Self { cached: None }
    }

    /// Parse `text` against the layout table, returning [`NOT_A_TIME`] when
    /// every layout fails. The cached layout is tried first; a full scan
    /// updates it, and total failure clears it.
    pub fn parse(&mut self, text: &str) -> Instant {
        if let Some(index) = self.cached {
            if let Some(t) = parse_with_layout(text, LAYOUTS[index]) {
                return t;
            }
        }
        for (index, layout) in LAYOUTS.iter().enumerate() {
            if let Some(t) = parse_with_layout(text, layout) {
                log::trace!("layout {index} matched {text:?}");
                self.cached = Some(index);
                return t;
            }
        }
        log::trace!("all layouts failed for {text:?}");
        self.cached = None;
        NOT_A_TIME
    }
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Broken-down calendar fields accumulated while matching one layout.
struct Fields {
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    pm: Option<bool>,
    offset_secs: i64,
}

impl Default for Fields {
    fn default() -> Self {
        Self {
            year: 1970,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
            pm: None,
            offset_secs: 0,
        }
    }
}

impl Fields {
    fn epoch_secs(&self) -> Option<i64> {
        let hour = match self.pm {
            Some(true) => self.hour % 12 + 12,
            Some(false) => self.hour % 12,
            None => self.hour,
        };
        let month = Month::try_from(self.month).ok()?;
        let date = Date::from_calendar_date(self.year, month, self.day).ok()?;
        let tod = Time::from_hms(hour, self.minute, self.second).ok()?;
        let utc = PrimitiveDateTime::new(date, tod).assume_utc().unix_timestamp();
        Some(utc - self.offset_secs)
    }
}

/// Evaluate one layout against `input`. The entire input (modulo surrounding
/// whitespace) must be consumed for the layout to succeed.
fn parse_with_layout(input: &str, layout: &[Token]) -> Option<Instant> {
    let mut cursor = input.trim_start();
    let mut fields = Fields::default();
    let mut subsec_ms: i64 = 0;

    for token in layout {
        match token {
            Token::Numeric => return parse_numeric(input),
            Token::SubSecond => {
                let (ms, rest) = parse_subsec(cursor)?;
                subsec_ms = ms;
                cursor = rest;
            }
            Token::Calendar(pattern) => {
                cursor = match_calendar(cursor, pattern, &mut fields)?;
            }
        }
    }

    if !cursor.trim_start().is_empty() {
        return None;
    }
    let secs = fields.epoch_secs()?;
    Some(secs * 1000 + subsec_ms)
}

/// Signed decimal integer with optional surrounding whitespace; any other
/// trailing content is a failure.
fn parse_numeric(input: &str) -> Option<Instant> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok().filter(|&t| t != NOT_A_TIME)
}

/// Parse a leading floating-point literal and return its value rounded to
/// milliseconds plus the remaining input.
fn parse_subsec(input: &str) -> Option<(i64, &str)> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut saw_digit = i > 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        saw_digit |= i > frac_start;
    }
    if !saw_digit {
        return None;
    }
    let value: f64 = s[..i].parse().ok()?;
    Some(((value * 1000.0).round() as i64, &s[i..]))
}

/// Match a strptime-style `pattern` at the start of `input`, filling `out`.
/// Returns the remaining input on success. Supported conversions are the ones
/// the layout table needs: %Y %m %d %H %M %S %p %z. Whitespace in the pattern
/// matches any run of whitespace; other characters match literally.
fn match_calendar<'a>(input: &'a str, pattern: &str, out: &mut Fields) -> Option<&'a str> {
    let mut cursor = input;
    let pat = pattern.as_bytes();
    let mut p = 0;

    while p < pat.len() {
        match pat[p] {
            b'%' => {
                p += 1;
                let conv = *pat.get(p)?;
                p += 1;
                match conv {
                    b'Y' => {
                        let (v, rest) = scan_number(cursor, 4)?;
                        out.year = v as i32;
                        cursor = rest;
                    }
                    b'm' => {
                        let (v, rest) = scan_number(cursor, 2)?;
                        out.month = v as u8;
                        cursor = rest;
                    }
                    b'd' => {
                        let (v, rest) = scan_number(cursor, 2)?;
                        out.day = v as u8;
                        cursor = rest;
                    }
                    b'H' => {
                        let (v, rest) = scan_number(cursor, 2)?;
                        out.hour = v as u8;
                        cursor = rest;
                    }
                    b'M' => {
                        let (v, rest) = scan_number(cursor, 2)?;
                        out.minute = v as u8;
                        cursor = rest;
                    }
                    b'S' => {
                        let (v, rest) = scan_number(cursor, 2)?;
                        out.second = v as u8;
                        cursor = rest;
                    }
                    b'p' => {
                        let (pm, rest) = if let Some(rest) = cursor.strip_prefix(['A', 'a']) {
                            (false, rest)
                        } else if let Some(rest) = cursor.strip_prefix(['P', 'p']) {
                            (true, rest)
                        } else {
                            return None;
                        };
                        out.pm = Some(pm);
                        cursor = rest.strip_prefix(['M', 'm'])?;
                    }
                    b'z' => {
                        let (offset, rest) = scan_zone(cursor)?;
                        out.offset_secs = offset;
                        cursor = rest;
                    }
                    b'%' => {
                        cursor = cursor.strip_prefix('%')?;
                    }
                    _ => return None,
                }
            }
            c if c.is_ascii_whitespace() => {
                p += 1;
                cursor = cursor.trim_start();
            }
            c => {
                p += 1;
                cursor = cursor.strip_prefix(c as char)?;
            }
        }
    }
    Some(cursor)
}

/// Scan 1..=`max` leading ASCII digits.
fn scan_number(input: &str, max: usize) -> Option<(u32, &str)> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() && i < max && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == 0 {
        return None;
    }
    let value = input[..i].parse().ok()?;
    Some((value, &input[i..]))
}

/// Numeric UTC offset: `Z`, or a sign followed by `HHMM` or `HH:MM`, with
/// both fields exactly two digits. Returns the offset in seconds east of UTC.
fn scan_zone(input: &str) -> Option<(i64, &str)> {
    if let Some(rest) = input.strip_prefix(['Z', 'z']) {
        return Some((0, rest));
    }
    let (sign, rest) = match input.as_bytes().first()? {
        b'+' => (1i64, &input[1..]),
        b'-' => (-1i64, &input[1..]),
        _ => return None,
    };
    let (hours, rest) = scan_exact(rest, 2)?;
    let (minutes, rest) = match rest.strip_prefix(':') {
        Some(after) => scan_exact(after, 2)?,
        None => scan_exact(rest, 2)?,
    };
    Some((sign * (i64::from(hours) * 3600 + i64::from(minutes) * 60), rest))
}

/// Exactly `n` leading ASCII digits.
fn scan_exact(input: &str, n: usize) -> Option<(u32, &str)> {
    let bytes = input.as_bytes();
    if bytes.len() < n || !bytes[..n].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value = input[..n].parse().ok()?;
    Some((value, &input[n..]))
}
