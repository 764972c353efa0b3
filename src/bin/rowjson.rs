//! Command-line front end: encodes result and relation fixture documents.
#![forbid(unsafe_code)]

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rowjson::{
    fixture, logging::init_logging, Dialect, EncoderConfig, JsonResultEncoder, ResultEncoder,
};

#[derive(Parser, Debug)]
#[command(
    name = "rowjson",
    version,
    about = "Encode query results and relation schemas as JSON documents",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(flatten)]
    encode: EncodeArgs,

    #[arg(
        long,
        global = true,
        env = "ROWJSON_LOG",
        default_value = "warn",
        help = "Log filter directive (written to stderr)"
    )]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "Encoder config file (defaults to the per-user encoder.toml)"
    )]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Spaces per nesting level")]
    indent: Option<usize>,

    #[arg(long, global = true, help = "Dialect expressions are rendered in")]
    target: Option<Dialect>,

    #[arg(long, global = true, help = "Emit only the rows array")]
    rows_only: bool,

    #[arg(long, global = true, help = "Emit only metadata and column headers")]
    structure_only: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a result fixture as a result envelope
    Result {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
    /// Encode a relation fixture as a structure document
    Relation {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;
    let config = build_config(&cli.encode)?;
    let encoder = JsonResultEncoder::new();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Result { path } => {
            let mut cursor = fixture::load_result(&path)?;
            encoder.encode_result(&mut cursor, &mut out, &config)?;
        }
        Command::Relation { path } => {
            let relation = fixture::load_relation(&path)?;
            encoder.encode_relation(&relation, &mut out, &config)?;
        }
    }
    writeln!(out)?;
    Ok(())
}

/// File settings first, then command-line overrides.
fn build_config(args: &EncodeArgs) -> Result<EncoderConfig, Box<dyn Error>> {
    let mut config = EncoderConfig::load_or_default(args.config.clone())?;
    if let Some(indent) = args.indent {
        config = config.with_indent(indent);
    }
    if let Some(target) = args.target {
        config = config.with_target(target);
    }
    if args.rows_only {
        config = config.with_rows_only(true);
    }
    if args.structure_only {
        config = config.with_structure_only(true);
    }
    Ok(config)
}
