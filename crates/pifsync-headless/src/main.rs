use clap::Parser;
use pifsync_headless::{SoakConfig, run_soak};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// Lockstep soak runner
#[derive(Parser, Debug)]
#[command(name = "pifsync-headless")]
#[command(about = "Runs scripted lockstep netplay sessions and checks they agree", long_about = None)]
struct Args {
    /// Number of participants (1-4)
    #[arg(short, long, default_value_t = 2)]
    players: usize,

    /// Ticks to run
    #[arg(short, long, default_value_t = 600)]
    frames: u32,

    /// Upper bound of controller polls per tick
    #[arg(long, default_value_t = 4)]
    polls_per_frame: u32,

    /// Seed for scripted inputs and poll mix
    #[arg(long, default_value_t = 0x5EED)]
    seed: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = SoakConfig {
        players: args.players,
        frames: args.frames,
        polls_per_frame: args.polls_per_frame,
        seed: args.seed,
    };
    let report = run_soak(&config)?;
    info!(
        players = report.players,
        frames = report.frames,
        "soak run finished in lockstep"
    );
    Ok(())
}
