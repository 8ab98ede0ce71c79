//! Dungeon balance simulator CLI.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                      # 100 campaigns to level 10
//!   cargo run --bin simulate -- -n 20 -t 25       # 20 campaigns to level 25
//!   cargo run --bin simulate -- --seed 42 --json  # Reproducible, JSON output

use delve::simulator::{run_simulation, SimConfig};
use std::env;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();
    let (config, json) = parse_args(&args);

    let default_filter = if config.verbosity >= 2 {
        "delve=debug"
    } else {
        "delve=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if !json {
        println!("╔═══════════════════════════════════════════════════════════════╗");
        println!("║                DELVE DUNGEON SIMULATOR                        ║");
        println!("╚═══════════════════════════════════════════════════════════════╝");
        println!();
        println!("Configuration:");
        println!("  Campaigns:      {}", config.num_runs);
        println!("  Start Level:    {}", config.start_level);
        match config.target_level {
            Some(target) => println!("  Target Level:   {}", target),
            None => println!("  Target Level:   none"),
        }
        println!("  Auto Advance:   {}", config.auto_advance);
        println!("  Speed:          {}x", config.speed);
        println!("  Max Ticks:      {}", config.max_ticks);
        if let Some(seed) = config.seed {
            println!("  Seed:           {}", seed);
        }
        println!();
    }

    let report = run_simulation(&config);

    if json {
        println!("{}", report.to_json());
    } else {
        println!("{}", report.to_text());
    }
}

fn parse_args(args: &[String]) -> (SimConfig, bool) {
    let mut config = SimConfig::default();
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "-n" | "--runs" => {
                if let Some(v) = value {
                    config.num_runs = v.parse().unwrap_or(config.num_runs);
                    i += 1;
                }
            }
            "-s" | "--seed" => {
                if let Some(v) = value {
                    config.seed = v.parse().ok();
                    i += 1;
                }
            }
            "-l" | "--level" => {
                if let Some(v) = value {
                    config.start_level = v.parse().unwrap_or(config.start_level);
                    i += 1;
                }
            }
            "-t" | "--target" => {
                if let Some(v) = value {
                    config.target_level = match v.as_str() {
                        "none" => None,
                        v => v.parse().ok().or(config.target_level),
                    };
                    i += 1;
                }
            }
            "--speed" => {
                if let Some(v) = value {
                    config.speed = v.parse().unwrap_or(config.speed);
                    i += 1;
                }
            }
            "--max-ticks" => {
                if let Some(v) = value {
                    config.max_ticks = v.parse().unwrap_or(config.max_ticks);
                    i += 1;
                }
            }
            "--no-auto" => {
                config.auto_advance = false;
            }
            "--no-invest" => {
                config.invest = false;
            }
            "--json" => {
                json = true;
            }
            "-v" | "--verbose" => {
                config.verbosity = 2;
            }
            "--quick" => {
                config = SimConfig::quick(config.seed.unwrap_or(1));
            }
            "--endurance" => {
                config = SimConfig::endurance();
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {}", other);
            }
        }
        i += 1;
    }

    (config, json)
}

fn print_help() {
    println!("Delve Dungeon Simulator");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin simulate -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -n, --runs <N>      Number of campaigns (default: 100)");
    println!("    -s, --seed <S>      Random seed for reproducibility");
    println!("    -l, --level <L>     Starting dungeon level (default: 1)");
    println!("    -t, --target <T>    Stop after clearing level T, or 'none' (default: 10)");
    println!("    --speed <X>         Tick speed multiplier: 1, 2 or 3");
    println!("    --max-ticks <T>     Tick budget per campaign (default: 200,000)");
    println!("    --no-auto           Run a single dungeon per campaign");
    println!("    --no-invest         Never spend skill points or gold");
    println!("    --json              Print the report as JSON");
    println!("    --quick             5 short campaigns to level 3");
    println!("    --endurance         20 campaigns without a target level");
    println!("    -v, --verbose       Per-campaign and debug logging");
    println!("    -h, --help          Show this help");
    println!();
    println!("Logging honours RUST_LOG (default: delve=info).");
}
