//! NPCs wandering the village one next hop per turn.
//!
//! Run: cargo run --bin npc-walk -- --turns 30 --seed 42

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use trellis_demos::{Action, Simulation, build_world, load_world, village};
use trellis_route::BuildOptions;

#[derive(Parser, Debug)]
#[command(about = "Simulate NPCs walking between random goals")]
struct Args {
    /// World declaration in JSON. Uses the built-in village when omitted.
    #[arg(long)]
    world: Option<PathBuf>,

    #[arg(long, default_value_t = 20)]
    turns: u32,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 3)]
    npcs: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.world {
        Some(path) => match load_world(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}: {e}", path.display());
                std::process::exit(2);
            }
        },
        None => village(),
    };

    let built = match build_world(&config, BuildOptions::default()) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    let mut sim = Simulation::new(built.table, args.npcs, args.seed);
    for _ in 0..args.turns {
        for (name, action) in sim.step() {
            let zone = sim
                .npcs
                .iter()
                .find(|n| n.name == name)
                .and_then(|n| sim.table.home_zone(n.at))
                .unwrap_or("?");
            match action {
                Action::Moved { from, to } => {
                    println!("[{:>3}] {name} ({zone}): {from} -> {to}", sim.turn)
                }
                Action::Arrived { at, next_goal } => {
                    println!(
                        "[{:>3}] {name} ({zone}): reached {at}, now heading to {next_goal}",
                        sim.turn
                    )
                }
                Action::Waited { reason } => {
                    println!("[{:>3}] {name} ({zone}): waits ({reason})", sim.turn)
                }
            }
        }
    }

    let stats: Vec<String> = sim
        .table
        .zones()
        .map(|z| {
            let s = z.cache_stats();
            format!("{} {}/{} hits", z.name(), s.hits, s.hits + s.misses)
        })
        .collect();
    println!("cache: {}", stats.join(", "));
}
