//! Simulator entry point: CLI wiring and config-driven run construction.

use std::path::Path;
use std::process;

use tracing_subscriber::EnvFilter;

use der_sim::config::ScenarioConfig;
use der_sim::error::SimError;
use der_sim::io::export::{export_house_csv, export_load_csv};
use der_sim::scenario;
use der_sim::sim::engine::Simulator;
use der_sim::sim::house::House;
use der_sim::sim::report::RunReport;
use der_sim::sim::strategies::{GreedyHousehold, Uncontrolled};

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    houses_override: Option<usize>,
    load_out: Option<String>,
    houses_out: Option<String>,
}

fn print_help() {
    eprintln!("der-sim: neighborhood energy-flexibility simulator");
    eprintln!();
    eprintln!("Usage: der-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>    Load scenario from TOML config file");
    eprintln!("  --preset <name>      Use a built-in preset (baseline, cold_snap, sunny_week)");
    eprintln!("  --seed <u64>         Override random seed");
    eprintln!("  --houses <n>         Override number of houses");
    eprintln!("  --load-out <path>    Export aggregate feeder load to CSV");
    eprintln!("  --houses-out <path>  Export per-house detail to CSV");
    eprintln!("  --help               Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        houses_override: None,
        load_out: None,
        houses_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--houses" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --houses requires a count argument");
                    process::exit(1);
                }
                if let Ok(n) = args[i].parse::<usize>() {
                    cli.houses_override = Some(n);
                } else {
                    eprintln!("error: --houses value \"{}\" is not a valid count", args[i]);
                    process::exit(1);
                }
            }
            "--load-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --load-out requires a path argument");
                    process::exit(1);
                }
                cli.load_out = Some(args[i].clone());
            }
            "--houses-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --houses-out requires a path argument");
                    process::exit(1);
                }
                cli.houses_out = Some(args[i].clone());
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Runs the simulation with the configured policy and returns the feeder
/// load, the final house states, and the summary report.
fn run_simulation(cfg: &ScenarioConfig) -> Result<(Vec<f64>, Vec<House>, RunReport), SimError> {
    let sim_config = cfg.sim_config();
    let data = scenario::synthesize(cfg)?;
    let houses = scenario::build_houses(cfg, &data)?;
    let order = cfg.control_order()?;
    let dt_hours = sim_config.dt_hours;

    if cfg.simulation.policy == "uncontrolled" {
        let mut sim = Simulator::new(
            sim_config,
            houses,
            data.ambient_temperature,
            data.renewable_share,
            order,
            Uncontrolled,
        )?;
        sim.run()?;
        let total = sim.total_load().to_vec();
        let report = RunReport::from_total_load(&total, dt_hours);
        Ok((total, sim.into_houses(), report))
    } else {
        let mut sim = Simulator::new(
            sim_config,
            houses,
            data.ambient_temperature,
            data.renewable_share,
            order,
            GreedyHousehold,
        )?;
        sim.run()?;
        let total = sim.total_load().to_vec();
        let report = RunReport::from_total_load(&total, dt_hours);
        Ok((total, sim.into_houses(), report))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline default
    let mut config = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed_override {
        config.simulation.seed = seed;
    }
    if let Some(houses) = cli.houses_override {
        config.simulation.houses = houses;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let (total_load, houses, report) = match run_simulation(&config) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    println!("{report}");

    let dt_hours = config.sim_config().dt_hours;
    if let Some(ref path) = cli.load_out {
        if let Err(e) = export_load_csv(&total_load, dt_hours, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Feeder load written to {path}");
    }
    if let Some(ref path) = cli.houses_out {
        if let Err(e) = export_house_csv(&houses, dt_hours, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("House detail written to {path}");
    }
}
