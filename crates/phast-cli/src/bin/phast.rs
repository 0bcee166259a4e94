use clap::Parser;
use phast_cli::{run, CliArgs, EXIT_CONFIG_ERROR};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PHAST_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    match run(&args) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("phast: {err}");
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    }
}
