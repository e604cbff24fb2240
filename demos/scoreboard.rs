//! Runs a scripted game against a manual clock and logs what a display would
//! show: every cue, gong and point.
//!
//! ```text
//! cargo run --example scoreboard -- --mode 20 --ticks 45 --score-at 25
//! cargo run --example scoreboard -- --mode 30 --reverse --pause-after-gong
//! ```

use clap::Parser;
use jugger_stones::prelude::*;
use tracing::{info, warn, Level};

#[derive(Parser)]
struct Opt {
    /// Mode selector: positive size, 0 for custom, -1 for infinity.
    #[arg(short, long, default_value_t = 100)]
    mode: i64,
    /// Tick interval in milliseconds.
    #[arg(short, long, default_value_t = 1500)]
    interval: i64,
    #[arg(short, long)]
    reverse: bool,
    #[arg(long)]
    pause_after_gong: bool,
    /// Number of intervals to let pass.
    #[arg(short, long, default_value_t = 120)]
    ticks: u32,
    /// Ticks after which the first team scores. Repeatable.
    #[arg(long)]
    score_at: Vec<u32>,
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = Opt::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if opt.verbose {
                Level::TRACE
            } else {
                Level::INFO
            })
            .finish(),
    )?;

    let clock = ManualClock::new();
    let mut session = GameSessionBuilder::new()
        .with_preference_store(MemoryPreferenceStore::new(Preferences {
            mode: opt.mode,
            interval: opt.interval,
            reverse: opt.reverse,
            pause_after_gong: opt.pause_after_gong,
            ..Preferences::default()
        }))
        .with_clock(clock.clone())
        .start_session();

    info!(mode = %session.mode(), stones = %session.stones(), "session ready");
    session.start();

    for tick in 1..=opt.ticks {
        clock.advance(session.interval());
        session.poll();

        if opt.score_at.contains(&tick) {
            let points = session.score_point(TeamIndex::First);
            info!(tick, points, "{} scores", session.team(TeamIndex::First).name());
        }

        for event in session.events() {
            match event {
                StonesEvent::Cue { cue: Cue::Gong, stones } => info!(%stones, "GONG"),
                StonesEvent::Cue { cue, stones } => info!(%stones, ?cue, "stone"),
                StonesEvent::InfinityMilestone { stones } => info!(%stones, "milestone"),
                StonesEvent::TimerPaused => info!("timer paused"),
                other => info!(?other, "event"),
            }
        }

        if !session.is_running() {
            warn!(tick, "timer idle, resuming");
            session.start();
        }
    }

    let [first, second] = session.teams();
    info!(
        "final: {} {} : {} {} at {} stones",
        first.name(),
        first.points(),
        second.points(),
        second.name(),
        session.stones()
    );
    Ok(())
}
