use anyhow::Result;
use clap::Parser;
use orchard_lib::app::{App, RunOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Seed for the random source; overrides the config file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of physics steps to simulate
    #[arg(short, long, default_value_t = 3600)]
    ticks: u64,

    /// Save the final tree distribution; without a path a timestamped file is written
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    save_trees: Option<PathBuf>,

    /// Plant trees from a saved distribution instead of at random
    #[arg(long)]
    load_trees: Option<PathBuf>,

    /// Log a population report every N ticks (0 disables)
    #[arg(long, default_value_t = 600)]
    report_every: u64,

    /// Print every simulation event as a JSON line on stdout
    #[arg(long)]
    events: bool,
}

fn main() -> Result<()> {
    orchard_core::metrics::init_logging();
    let args = Args::parse();

    let mut config = App::load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }

    let save_trees = args.save_trees.map(|path| {
        if path.as_os_str().is_empty() {
            orchard_io::distribution::default_distribution_path(".")
        } else {
            path
        }
    });
    let options = RunOptions {
        ticks: args.ticks,
        report_every: args.report_every,
        print_events: args.events,
        save_trees,
        load_trees: args.load_trees,
    };

    let mut app = App::new(config, options)?;
    let stdout = std::io::stdout();
    let summary = app.run(&mut stdout.lock())?;

    tracing::info!(
        ticks = summary.ticks,
        creatures = summary.stats.creatures,
        trees = summary.stats.mature_trees + summary.stats.saplings,
        "Run finished"
    );
    if !args.events {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
