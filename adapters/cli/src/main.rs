#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for the Nova Siege gameplay engine.
//!
//! Plays the campaign with a simple autopilot that tracks the lowest enemy and
//! fires on a fixed cadence, then prints a summary of the run.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use nova_siege_core::{Event, Tuning, Vec2};
use nova_siege_session::{Session, SessionConfig, SessionState};
use nova_siege_system_levels::LevelCatalog;
use nova_siege_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_micros(16_667);

/// Runs Nova Siege headless and prints a summary.
#[derive(Debug, Parser)]
#[command(name = "nova-siege", version, about)]
struct Args {
    /// TOML tuning file overriding the default balance parameters.
    #[arg(long)]
    config: Option<PathBuf>,
    /// TOML level pack layered over the built-in levels.
    #[arg(long)]
    levels: Option<PathBuf>,
    /// Seed for gameplay rolls and procedural levels.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Frames to simulate at sixty frames per second.
    #[arg(long, default_value_t = 36_000)]
    frames: u64,
    /// Level to start on.
    #[arg(long, default_value_t = 1)]
    start_level: u32,
    /// Frames between autopilot shots.
    #[arg(long, default_value_t = 6)]
    fire_interval: u64,
}

#[derive(Debug, Default)]
struct Tally {
    frames: u64,
    kills: u32,
    bosses: u32,
    waves: u32,
    lives_lost: u32,
    nullified: u32,
    power_ups: u32,
    worlds_entered: u32,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemyDestroyed { .. } => self.kills += 1,
                Event::BossDefeated { .. } => self.bosses += 1,
                Event::WaveAnnounced { .. } => self.waves += 1,
                Event::PlayerDamaged { amount, .. } => self.lives_lost += amount,
                Event::PlayerHitNullified { .. } => self.nullified += 1,
                Event::PowerUpCollected { .. } => self.power_ups += 1,
                Event::WorldTransitioned { .. } => self.worlds_entered += 1,
                _ => {}
            }
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let tuning = load_tuning(args.config.as_deref())?;
    let catalog = load_catalog(args.seed, args.levels.as_deref())?;
    let config = SessionConfig {
        seed: args.seed,
        start_level: args.start_level,
        tuning,
        ..SessionConfig::default()
    };
    let mut session = Session::new(config, catalog);
    info!(seed = args.seed, frames = args.frames, "headless run starting");

    let tally = run(&mut session, args.frames, args.fire_interval.max(1));
    print_summary(&session, &tally);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

fn load_tuning(path: Option<&Path>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning file {}", path.display()))?;
    Tuning::from_toml_str(&source)
        .with_context(|| format!("failed to load tuning file {}", path.display()))
}

fn load_catalog(seed: u64, path: Option<&Path>) -> Result<LevelCatalog> {
    let catalog = LevelCatalog::new(seed);
    let Some(path) = path else {
        return Ok(catalog);
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read level pack {}", path.display()))?;
    catalog
        .with_pack(&source)
        .with_context(|| format!("failed to load level pack {}", path.display()))
}

fn run(session: &mut Session, frames: u64, fire_interval: u64) -> Tally {
    let mut tally = Tally::default();
    let mut events = Vec::new();
    for frame in 0..frames {
        if session.state().is_finished() {
            break;
        }
        steer(session);
        if frame % fire_interval == 0 {
            session.fire();
        }
        events.clear();
        session.step(FRAME, &mut events);
        tally.record(&events);
        tally.frames += 1;
    }
    tally
}

fn steer(session: &mut Session) {
    let world = session.world();
    let player = query::player(world);
    let target = query::enemies(world)
        .iter()
        .filter(|enemy| enemy.is_alive())
        .max_by(|a, b| a.position.y.total_cmp(&b.position.y))
        .map(|enemy| enemy.position.x);
    if let Some(x) = target {
        session.move_player(Vec2::new(x - player.size.x * 0.5, player.position.y));
    }
}

fn print_summary(session: &Session, tally: &Tally) {
    let outcome = match session.state() {
        SessionState::Playing | SessionState::Intermission { .. } => "still playing",
        SessionState::GameOver => "game over",
        SessionState::Victory => "campaign cleared",
    };
    let telemetry = query::telemetry(session.world());

    println!("outcome: {outcome}");
    println!("frames simulated: {}", tally.frames);
    println!("level reached: {} (world {})", session.level(), session.world_number());
    println!("score: {}", session.score());
    println!("waves started: {}", tally.waves);
    println!("enemies destroyed: {} ({} bosses)", tally.kills, tally.bosses);
    println!("power-ups collected: {}", tally.power_ups);
    println!(
        "lives lost: {} (phased {}, shield absorbed {})",
        tally.lives_lost, telemetry.phased, telemetry.shield_absorbed
    );
    println!("hits nullified: {}", tally.nullified);
    println!("worlds entered: {}", tally.worlds_entered);
    for report in session.reports() {
        println!(
            "  level {:>2} (world {}): {} kills, {} lives lost, {:.1}s",
            report.level,
            report.world,
            report.stats.enemies_killed,
            report.stats.damage_taken,
            report.stats.elapsed
        );
    }
}
