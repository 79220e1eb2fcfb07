use clap::Parser;
use env_logger::Env;

mod model;
mod parse;
mod render;
mod runs;
mod verbs;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "rdma-perf-stats")]
#[command(about = "RDMA verb latency statistics and charts", long_about = None)]
struct Cli {
    /// Process only this run directory under the logs root; without it,
    /// every run directory under the root is processed.
    run: Option<String>,

    /// Logs root containing one subdirectory per benchmark run.
    #[arg(long, default_value = "./log")]
    log_root: String,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match cli.run {
        Some(run) => runs::handle_run(&cli.log_root, &run)?,
        None => runs::handle_log_root(&cli.log_root)?,
    }

    Ok(())
}
