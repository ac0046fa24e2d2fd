use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use tst::{Config, Error, PeriodHeader, TimeFormat, TimestampParser};

#[derive(Parser)]
#[command(name = "tst")]
#[command(about = "Filter a two-column time-series CSV stream: parse, resample, suppress, re-emit")]
struct Cli {
    /// Minimum value change required to pass a sample
    #[arg(long, default_value_t = 0.0)]
    dv: f64,

    /// Dead band around zero; values inside it are treated as exactly 0
    #[arg(long, default_value_t = 0.0)]
    zdb: f64,

    /// Resampling interval in milliseconds (0 disables resampling)
    #[arg(long, default_value_t = 0)]
    every: i64,

    /// Only emit samples at or after this time (any supported timestamp layout)
    #[arg(long)]
    start: Option<String>,

    /// Only emit samples at or before this time (any supported timestamp layout)
    #[arg(long)]
    end: Option<String>,

    /// Time rendering: "iso", "t" (tick counts), or a %-pattern
    #[arg(long, default_value = "iso")]
    time_format: String,

    /// Output period header, e.g. "ts", "dt5m" (default: the input's header)
    #[arg(long)]
    out_header: Option<String>,

    /// Output field separator
    #[arg(long, default_value = ",")]
    ofs: String,

    /// Output record separator
    #[arg(long, default_value = "\n")]
    ors: String,

    /// Suppress the time column
    #[arg(long)]
    no_time: bool,

    /// Suppress the value column
    #[arg(long)]
    no_value: bool,

    /// Echo the command line and a marker per input file as comment lines
    #[arg(long)]
    meta_add: bool,

    /// Keep `#` comment lines instead of stripping them
    #[arg(long)]
    keep_meta: bool,

    /// Input files; "-" or no files reads stdin
    files: Vec<String>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("tst: {err:#}");
        let code = err.downcast_ref::<Error>().map_or(1, Error::exit_code);
        process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut parser = TimestampParser::new();
    let cfg = build_config(cli, &mut parser)?;

    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());

    if cli.meta_add {
        let args: Vec<String> = std::env::args().collect();
        writeln!(output, "# % {}", args.join(" "))?;
    }

    if cli.files.is_empty() {
        process_file(&cfg, cli, &mut parser, "-", &mut output)?;
    } else {
        for name in &cli.files {
            process_file(&cfg, cli, &mut parser, name, &mut output)?;
        }
    }
    output.flush()?;
    Ok(())
}

fn process_file(
    cfg: &Config,
    cli: &Cli,
    parser: &mut TimestampParser,
    name: &str,
    output: &mut impl Write,
) -> Result<()> {
    if cli.meta_add {
        writeln!(output, "# process {name}")?;
    }
    if name == "-" {
        tst::process(cfg, parser, io::stdin().lock(), output)?;
    } else {
        let file = File::open(name).map_err(|source| Error::Open {
            path: PathBuf::from(name),
            source,
        })?;
        tst::process(cfg, parser, file, output)
            .with_context(|| format!("while processing \"{name}\""))?;
    }
    Ok(())
}

fn build_config(cli: &Cli, parser: &mut TimestampParser) -> Result<Config> {
    let out_header = match &cli.out_header {
        Some(text) => Some(
            PeriodHeader::parse(text).ok_or_else(|| Error::Header { input: text.clone() })?,
        ),
        None => None,
    };
    Ok(Config {
        min_delta: cli.dv,
        zero_dead_band: cli.zdb,
        every: cli.every,
        start: parse_bound(parser, cli.start.as_deref())?,
        end: parse_bound(parser, cli.end.as_deref())?,
        time_format: TimeFormat::from_selector(&cli.time_format),
        out_header,
        field_sep: cli.ofs.clone(),
        record_sep: cli.ors.clone(),
        show_time: !cli.no_time,
        show_value: !cli.no_value,
        strip_meta: !cli.keep_meta,
    })
}

fn parse_bound(parser: &mut TimestampParser, text: Option<&str>) -> Result<Option<i64>> {
    match text {
        None => Ok(None),
        Some(text) => {
            let t = parser.parse(text);
            if tst::is_time(t) {
                Ok(Some(t))
            } else {
                Err(Error::Bound { input: text.to_string() }.into())
            }
        }
    }
}
