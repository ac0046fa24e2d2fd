//! Time-series CSV filter engine.
//!
//! Reads a two-column (timestamp, value) CSV stream, guesses the timestamp
//! layout, optionally resamples onto a fixed millisecond grid with
//! last-value carry-forward, suppresses insignificant changes, and re-emits
//! the series. Calendar timestamps are always interpreted and rendered in
//! UTC; relying on the process timezone is deliberately avoided.

pub mod error;
pub mod filter;
pub mod format;
pub mod header;
pub mod pipeline;
pub mod resample;
pub mod timestamp;

pub use error::{Error, Result};
pub use filter::ChangeFilter;
pub use format::{TimeFormat, TimeRenderer};
pub use header::PeriodHeader;
pub use pipeline::{process, Config};
pub use resample::Resampler;
pub use timestamp::{is_time, Instant, TimestampParser, NOT_A_TIME};
