use clap::Parser;
use std::io::{self, Write};
use std::process;
use tracing_subscriber::EnvFilter;
use zonescan::FilterConfig;
use zonescan::cli::{self, Args};

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(err) = run(&args) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

fn run(args: &Args) -> zonescan::Result<()> {
    let base = FilterConfig::from_env()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::run(args, base, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Diagnostics go to stderr; `RUST_LOG` takes precedence over `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
