//! Ant Route Simulator - Command Line Interface
//!
//! Loads a station network, runs a sequence of ants over it and prints each ant's
//! route, distance, deposit and (optionally) the trail matrix.

use clap::{Parser, Subcommand, ValueEnum};
use ant_route_sim::colony::{desirability, ColonyConfig, ColonyRunner, EvaporationPolicy, DEFAULT_DECAY};
use ant_route_sim::instance::{station_label, ColonyInstance};
use ant_route_sim::report::RunReport;
use ant_route_sim::ColonyResult;

use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Above this many ants a progress bar replaces per-ant logging on the terminal.
const PROGRESS_THRESHOLD: usize = 50;

#[derive(Parser)]
#[command(name = "ant-route-sim")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Stigmergic route construction over a labelled station network")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a colony of ants over an instance
    Run {
        /// Instance file (.json or TSP-LIB style text)
        #[arg(short, long)]
        instance: PathBuf,

        /// Start station, as a label (A, B, ..) or an index
        #[arg(short, long, default_value = "A")]
        start: String,

        /// JSON file with a colony configuration; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of ants
        #[arg(short, long)]
        ants: Option<usize>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Exponent applied to inverse-distance desirability
        #[arg(long)]
        desirability_exponent: Option<f64>,

        /// Exponent applied to trail strength
        #[arg(long)]
        trail_exponent: Option<f64>,

        /// Evaporation schedule
        #[arg(long, value_enum)]
        evaporation: Option<Evaporation>,

        /// Decay factor applied when the schedule evaporates
        #[arg(long)]
        decay: Option<f64>,

        /// Do not reinforce the return edge to the start station
        #[arg(long)]
        no_closing_edge: bool,

        /// Write one row per ant to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the full report, trail matrices included, to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,

        /// Print the trail matrix after every ant
        #[arg(short, long)]
        verbose: bool,
    },

    /// Analyze an instance
    Analyze {
        /// Instance file (.json or TSP-LIB style text)
        #[arg(short, long)]
        instance: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Evaporation {
    /// Evaporate before every ant
    EveryAnt,
    /// Evaporate once, before the first ant
    FirstAnt,
    /// Evaporate once, before the second ant
    SecondAnt,
    /// Evaporate before every ant except the second
    AllButSecond,
    /// Never evaporate
    Never,
}

struct RunArgs {
    start: String,
    config: Option<PathBuf>,
    ants: Option<usize>,
    seed: Option<u64>,
    desirability_exponent: Option<f64>,
    trail_exponent: Option<f64>,
    evaporation: Option<Evaporation>,
    decay: Option<f64>,
    no_closing_edge: bool,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run {
            instance, start, config, ants, seed, desirability_exponent, trail_exponent,
            evaporation, decay, no_closing_edge, csv, json, verbose,
        } => {
            let args = RunArgs {
                start, config, ants, seed, desirability_exponent, trail_exponent,
                evaporation, decay, no_closing_edge,
            };
            run_colony(&instance, args, csv, json, verbose)
        }

        Commands::Analyze { instance } => analyze_instance(&instance),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Start from the config file (or defaults) and apply explicit flags on top.
fn build_config(args: &RunArgs) -> ColonyResult<ColonyConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            serde_json::from_reader(std::io::BufReader::new(file))?
        }
        None => ColonyConfig::default(),
    };

    if let Some(ants) = args.ants {
        config.num_ants = ants;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(p) = args.desirability_exponent {
        config.desirability_exponent = p;
    }
    if let Some(q) = args.trail_exponent {
        config.trail_exponent = q;
    }
    if args.no_closing_edge {
        config.reinforce_closing_edge = false;
    }

    let decay = args
        .decay
        .or_else(|| config.evaporation.decay())
        .unwrap_or(DEFAULT_DECAY);
    if let Some(kind) = args.evaporation {
        config.evaporation = match kind {
            Evaporation::EveryAnt => EvaporationPolicy::EveryAnt { decay },
            Evaporation::FirstAnt => EvaporationPolicy::FirstAntOnly { decay },
            Evaporation::SecondAnt => EvaporationPolicy::SecondAntOnly { decay },
            Evaporation::AllButSecond => EvaporationPolicy::AllButSecond { decay },
            Evaporation::Never => EvaporationPolicy::Never,
        };
    } else if args.decay.is_some() {
        config.evaporation = match config.evaporation {
            EvaporationPolicy::EveryAnt { .. } => EvaporationPolicy::EveryAnt { decay },
            EvaporationPolicy::FirstAntOnly { .. } => EvaporationPolicy::FirstAntOnly { decay },
            EvaporationPolicy::SecondAntOnly { .. } => EvaporationPolicy::SecondAntOnly { decay },
            EvaporationPolicy::AllButSecond { .. } => EvaporationPolicy::AllButSecond { decay },
            EvaporationPolicy::Never => EvaporationPolicy::Never,
        };
    }

    config.validate()?;
    Ok(config)
}

fn run_colony(
    path: &Path,
    args: RunArgs,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
    verbose: bool,
) -> ColonyResult<()> {
    println!("Loading instance from {:?}...", path);
    let instance = ColonyInstance::from_file(path)?;
    let start = instance.resolve_station(&args.start)?;
    let config = build_config(&args)?;

    println!(
        "Running {} ant(s) from station {} (p={}, q={}, evaporation: {})",
        config.num_ants,
        station_label(start),
        config.desirability_exponent,
        config.trail_exponent,
        config.evaporation.name(),
    );

    let progress = if config.num_ants > PROGRESS_THRESHOLD {
        let pb = ProgressBar::new(config.num_ants as u64);
        pb.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} ants")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    } else {
        None
    };

    let started = Instant::now();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut runner = ColonyRunner::new(&instance.distances, start, config)?;
    let run = runner.run_observed(&mut rng, |_| {
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    })?;
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    let report = RunReport::new(&instance, &run);
    print!("{}", report.render_text(verbose));
    println!("Time: {:.4}s", started.elapsed().as_secs_f64());

    if let Some(csv_path) = csv {
        report.export_csv(&csv_path)?;
        println!("Per-ant results exported to {:?}", csv_path);
    }
    if let Some(json_path) = json {
        report.export_json(&json_path)?;
        println!("Report exported to {:?}", json_path);
    }

    Ok(())
}

fn analyze_instance(path: &Path) -> ColonyResult<()> {
    let instance = ColonyInstance::from_file(path)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    let n = instance.dimension();
    println!("Outgoing edges without desirability:");
    let mut any = false;
    for i in 0..n {
        let eta = desirability(i, &instance.distances);
        let dead: Vec<String> = (0..n)
            .filter(|&j| j != i && eta[j] <= 0.0)
            .map(station_label)
            .collect();
        if !dead.is_empty() {
            any = true;
            println!("  {} -> {}", station_label(i), dead.join(", "));
        }
    }
    if !any {
        println!("  none");
    }

    Ok(())
}
