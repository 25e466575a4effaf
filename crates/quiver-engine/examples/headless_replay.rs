//! Play a replay file headlessly and print the final state.
//!
//! ```text
//! cargo run --example headless_replay -- <stage.json> <replay.json> [config.json]
//! ```
//!
//! Without a config file the default tuning is used. Set `RUST_LOG=debug` to
//! see kills, pickups and damage as they happen.

use std::time::Instant;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use quiver_engine::prelude::*;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (stage_path, replay_path) = match args.as_slice() {
        [stage, replay, ..] => (stage, replay),
        _ => anyhow::bail!("usage: headless_replay <stage.json> <replay.json> [config.json]"),
    };

    let def = StageDef::load(stage_path)
        .with_context(|| format!("failed to load stage {stage_path}"))?;
    let file = ReplayFile::load(replay_path)
        .with_context(|| format!("failed to load replay {replay_path}"))?;
    let config = match args.get(2) {
        Some(path) => {
            PhysicsConfig::load(path).with_context(|| format!("failed to load config {path}"))?
        }
        None => PhysicsConfig::default(),
    };

    println!("Stage:   {}", def.name);
    println!("Seed:    {}", file.seed);
    println!("Frames:  {}", file.frames.len());

    let mut scene = Scene::new(def, config, file.seed)?;
    let start = Instant::now();
    let result = replay(&mut scene, &file)?;
    let elapsed = start.elapsed();

    println!();
    match &result.first_divergence {
        None => println!("Replay completed ({} frames)", result.frames_replayed),
        Some(d) => {
            println!("Replay DIVERGED at frame {}", d.frame);
            println!("  expected {}", d.expected_hash);
            println!("  actual   {}", d.actual_hash);
        }
    }
    println!("  game state: {:?}", scene.game_state());
    if let Some(player) = scene.player() {
        if let Some(health) = scene.world().healths.get(player) {
            println!("  player health: {}/{}", health.current, health.max);
        }
    }
    println!("  enemies alive: {}", scene.world().count_enemies());
    println!("  state hash: {}", scene.state_hash());
    println!(
        "  {:.1}ms ({:.1}us per frame)",
        elapsed.as_secs_f64() * 1000.0,
        elapsed.as_secs_f64() * 1e6 / result.frames_replayed.max(1) as f64
    );

    if !result.completed {
        anyhow::bail!("replay diverged");
    }
    Ok(())
}
