//! Lint a world declaration and print what repair would do.
//!
//! Run: cargo run --bin route-lint -- --world demos/worlds/village.json

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use trellis_demos::{build_world, load_world, village};
use trellis_route::{BuildOptions, LintConfig};

#[derive(Parser, Debug)]
#[command(about = "Check a zoned NPC routing world for authoring mistakes")]
struct Args {
    /// World declaration in JSON. Uses the built-in village when omitted.
    #[arg(long)]
    world: Option<PathBuf>,

    /// Do not synthesize edges for disconnected zones.
    #[arg(long)]
    no_repair: bool,

    /// Keep gateways whose node is missing from a zone instead of failing.
    #[arg(long)]
    lenient: bool,

    /// Do not report one-way edges.
    #[arg(long)]
    allow_one_way: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
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

    let options = BuildOptions {
        repair: !args.no_repair,
        strict_gateways: !args.lenient,
        lint_config: LintConfig {
            expect_symmetric: !args.allow_one_way,
            ..LintConfig::default()
        },
        ..BuildOptions::default()
    };

    let built = match build_world(&config, options) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    let report = built.lint.unwrap_or_default();
    for d in &report {
        println!("{d}");
    }
    for r in built.repairs.iter().filter(|r| r.repaired()) {
        for e in &r.synthesized {
            println!(
                "repair: zone `{}`: linked {} <-> {} (weight {})",
                r.zone, e.from, e.to, e.weight
            );
        }
    }
    println!("{} zones, {} diagnostics", built.table.len(), report.len());

    if report.has_errors() {
        std::process::exit(1);
    }
}
