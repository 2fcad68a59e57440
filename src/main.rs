use std::env;
use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let args: Vec<String> = env::args().collect();
    process::exit(dexdata::cli::run_with_args(&args));
}
