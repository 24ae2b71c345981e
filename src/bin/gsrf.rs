use std::collections::BTreeMap;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use gsrf::{format, parse, AdapterError, Notation, ParseError, Ssa, Symbol, Trace};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gsrf")]
#[command(about = "Go Symbol Representation Format tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Log decoding decisions to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a canonical symbol and print its components
    Parse { symbol: String },
    /// Normalise a symbol from any supported notation to canonical form
    Format {
        symbol: String,
        /// Input notation
        #[arg(long, value_enum, default_value_t = InputFormat::Gsrf)]
        from: InputFormat,
    },
    /// Convert a canonical symbol to the SSA and stack-trace notations
    Convert { symbol: String },
    /// Print version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormat {
    Gsrf,
    Ssa,
    #[value(alias = "stacktrace", alias = "stack")]
    Trace,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("conversion error: {0}")]
    Adapter(#[from] AdapterError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Parse { symbol } => run_parse(&symbol, cli.json),
        Commands::Format { symbol, from } => run_format(&symbol, from, cli.json),
        Commands::Convert { symbol } => run_convert(&symbol, cli.json),
        Commands::Version => {
            println!("gsrf version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}

fn run_parse(input: &str, json: bool) -> Result<(), CliError> {
    let sym = parse(input)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&sym)?);
    } else {
        print_components(&sym);
    }
    Ok(())
}

fn run_format(input: &str, from: InputFormat, json: bool) -> Result<(), CliError> {
    let sym = match from {
        InputFormat::Gsrf => parse(input)?,
        InputFormat::Ssa => decode_foreign(&Ssa, input)?,
        InputFormat::Trace => decode_foreign(&Trace, input)?,
    };
    let canonical = format(&sym);
    debug!(input, %canonical, "normalised");

    if json {
        let out = BTreeMap::from([("gsrf", canonical)]);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{canonical}");
    }
    Ok(())
}

fn decode_foreign(notation: &dyn Notation, input: &str) -> Result<Symbol, AdapterError> {
    debug!(notation = %notation.kind(), input, "decoding foreign symbol");
    notation.decode(input)
}

fn run_convert(input: &str, json: bool) -> Result<(), CliError> {
    let sym = parse(input)?;
    let gsrf = format(&sym);
    let ssa = Ssa.encode(&sym);
    let trace = Trace.encode(&sym);

    if json {
        let out = BTreeMap::from([("gsrf", gsrf), ("ssa", ssa), ("stacktrace", trace)]);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("GSRF:        {gsrf}");
        println!("SSA:         {ssa}");
        println!("Stack Trace: {trace}");
    }
    Ok(())
}

fn print_components(sym: &Symbol) {
    println!("Package: {}", sym.package_path);
    if !sym.name.is_empty() {
        println!("Function: {}", sym.name);
    }
    if let Some(recv) = &sym.receiver {
        let star = if recv.is_pointer { "*" } else { "" };
        if recv.type_args.is_empty() {
            println!("Receiver: {star}{}", recv.type_name);
        } else {
            println!("Receiver: {star}{}[{}]", recv.type_name, recv.type_args.join(", "));
        }
    }
    if sym.is_init {
        println!("Type: init function");
    }
    if sym.is_anonymous {
        println!(
            "Type: anonymous function (parent: {}, index: {})",
            sym.anon_parent, sym.anon_index
        );
    }
    if !sym.type_params.is_empty() {
        let params: Vec<String> = sym
            .type_params
            .iter()
            .map(|p| match p.effective_constraint() {
                Some(c) => format!("{} {c}", p.name),
                None => p.name.clone(),
            })
            .collect();
        println!("Type Parameters: {}", params.join(", "));
    }
    if !sym.type_args.is_empty() {
        println!("Type Arguments: {}", sym.type_args.join(", "));
    }
    if let Some(ctx) = &sym.context {
        println!("Context: {ctx}");
    }

    let m = &sym.metadata;
    if !m.is_empty() {
        println!("Metadata:");
        if !m.via.is_empty() {
            println!("  Via: {}", m.via);
        }
        if !m.alias.is_empty() {
            println!("  Alias: {}", m.alias);
        }
        if !m.position.is_empty() {
            println!("  Position: {}", m.position);
        }
        for (key, value) in &m.custom {
            println!("  {key}: {value}");
        }
    }
}
