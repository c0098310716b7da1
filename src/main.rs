//! Blade Drop entry point
//!
//! Headless native runner: drives a session on the fixed timestep with
//! scripted presses and reports the HUD through the logger.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use blade_drop::consts::SIM_DT;
use blade_drop::persistence::{FileStorage, MemoryStorage, Storage};
use blade_drop::sim::{GameEvent, RapierWorld};
use blade_drop::{Session, Tuning};

/// Drop blades onto a floating island
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for terrain, spin and scripted presses
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of fixed ticks to simulate
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// JSON tuning file
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Directory for persisted high scores (in-memory when omitted)
    #[arg(long)]
    scores_dir: Option<PathBuf>,

    /// Press once every this many ticks
    #[arg(long, default_value_t = 30)]
    drop_every: u64,

    /// Start a new game after game over
    #[arg(long)]
    auto_restart: bool,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path).context("failed to load tuning")?,
        None => Tuning::default(),
    };

    match &args.scores_dir {
        Some(dir) => run(&args, tuning, FileStorage::new(dir)),
        None => run(&args, tuning, MemoryStorage::new()),
    }
}

fn run<S: Storage>(args: &Args, tuning: Tuning, storage: S) -> Result<()> {
    log::info!("Blade Drop (native) starting...");

    let world = RapierWorld::new(tuning.session.gravity);
    let mut session =
        Session::new(tuning, world, storage, args.seed).context("failed to start session")?;
    let width = session.tuning().viewport.width;
    log::info!(
        "Rules: pin within {:.2} rad of vertical, lost below y={:.0}, {} ms between drops",
        session.rules().classifier.tolerance(),
        session.rules().boundary.limit_y(),
        session.spawn_cooldown_ms()
    );

    // Press positions come from their own stream
    let mut presses = Pcg32::seed_from_u64(args.seed.wrapping_add(1));
    let drop_every = args.drop_every.max(1);
    let mut games = 1u32;

    for t in 0..args.ticks {
        let now_ms = t as f64 * f64::from(SIM_DT) * 1000.0;

        if t % drop_every == 0 && session.state().is_playing() {
            let x = presses.random_range(0.0..width);
            session.pointer_down(x, now_ms);
        }

        for event in session.tick() {
            match event {
                GameEvent::GameOver { score, rank } => {
                    log::info!("Game {} over: score {}, rank {:?}", games, score, rank);
                    if args.auto_restart {
                        session.restart().context("failed to restart session")?;
                        games += 1;
                    }
                }
                other => log::debug!("{:?}", other),
            }
        }

        if t % 60 == 0 {
            log::info!("[t={}] {}", t, session.snapshot().hud_line());
        }
    }

    let snapshot = session.snapshot();
    log::info!("Finished after {} ticks: {}", args.ticks, snapshot.hud_line());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}
