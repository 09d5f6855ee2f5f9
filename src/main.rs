mod cli;

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use onboard::config::Config;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(cli::run(cli, &config)) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Log to stderr, filtered by `ONBOARD_LOG` (default `warn`, or `debug`
/// with `--verbose`).
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("ONBOARD_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
