use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Open { path: PathBuf, source: std::io::Error },
    Header { input: String },
    FieldCount { line: u64, count: usize },
    Bound { input: String },
    Csv(csv::Error),
}

impl Error {
    /// Process exit status for this failure. Each fatal cause gets its own
    /// code so callers can tell them apart; 103 (open failure) matches the
    /// historical tool.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Io(_) | Error::Csv(_) => 1,
            Error::Open { .. } => 103,
            Error::Header { .. } => 104,
            Error::FieldCount { .. } => 105,
            Error::Bound { .. } => 106,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Open { path, source } => {
                write!(f, "cannot open file \"{}\": {source}", path.display())
            }
            Error::Header { input } => write!(f, "bad period header \"{input}\""),
            Error::FieldCount { line, count } => {
                write!(f, "line {line}: expected 2 fields, got {count}")
            }
            Error::Bound { input } => write!(f, "unparseable time bound \"{input}\""),
            Error::Csv(err) => write!(f, "csv error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Open { source, .. } => Some(source),
            Error::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::Csv(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
