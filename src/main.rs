//! Sector Route Solver - Command Line Interface
//!
//! Finds the cheapest route through every sector of a map.

use clap::{Parser, Subcommand, ValueEnum};
use sector_route_solver::annealing::AnnealingConfig;
use sector_route_solver::benchmark::{Benchmark, BenchmarkConfig};
use sector_route_solver::constraint::{Constraint, Seeds};
use sector_route_solver::distance::{DistanceMatrix, PathPolicy, UNREACHABLE};
use sector_route_solver::graph::SectorGraph;
use sector_route_solver::progress::{ProgressBarSink, ProgressSink};
use sector_route_solver::solver::{Execution, Expansion, SolverConfig, DEFAULT_DEPTH_THRESHOLD};
use sector_route_solver::strategy::{config_for_accuracy, Strategy, MAX_ACCURACY};
use sector_route_solver::Result;

use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sector-route")]
#[command(version = "1.0")]
#[command(about = "Finds the cheapest route through every sector of a map")]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a map
    Solve {
        /// JSON map file
        #[arg(short, long)]
        map: PathBuf,

        /// Accuracy 1-5; below 5 keeps only that many nearest neighbours
        #[arg(short, long)]
        accuracy: Option<i32>,

        /// Engine to run
        #[arg(short, long, value_enum)]
        engine: Option<Engine>,

        /// Expand only the K nearest unvisited sectors
        #[arg(long)]
        nearest: Option<usize>,

        /// Worker threads (pool and fork-join)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Remaining sectors at which fork-join spawns tasks
        #[arg(long, default_value_t = DEFAULT_DEPTH_THRESHOLD)]
        depth_threshold: usize,

        /// Direct edges only, no transit through other sectors
        #[arg(long)]
        static_paths: bool,

        /// Reuse completions of earlier incumbents (may miss the optimum)
        #[arg(long)]
        cache: bool,

        /// Required starting sectors, comma separated
        #[arg(long, value_delimiter = ',')]
        start: Vec<String>,

        /// Required ending sectors, comma separated
        #[arg(long, value_delimiter = ',')]
        end: Vec<String>,

        /// Seed route, comma separated; repeatable
        #[arg(long)]
        seed_path: Vec<String>,

        /// Search only from the seed routes
        #[arg(long)]
        seeds_required: bool,

        /// Annealing iterations
        #[arg(long, default_value = "1000000")]
        iterations: u64,

        /// Annealing random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Write the solution as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show a depth progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Print map and distance statistics
    Analyze {
        #[arg(short, long)]
        map: PathBuf,
    },

    /// Run every engine on a map and compare
    Compare {
        #[arg(short, long)]
        map: PathBuf,

        /// Runs per engine
        #[arg(short, long, default_value = "3")]
        runs: usize,

        /// Per-run CSV output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Engine {
    /// Single-threaded branch and bound
    Sequential,
    /// Worker pool over the initial frontier
    Pool,
    /// Fork-join on a work-stealing pool
    ForkJoin,
    /// Simulated annealing
    Annealing,
}

struct SolveArgs {
    accuracy: Option<i32>,
    engine: Option<Engine>,
    nearest: Option<usize>,
    threads: Option<usize>,
    depth_threshold: usize,
    static_paths: bool,
    cache: bool,
    iterations: u64,
    seed: u64,
}

impl SolveArgs {
    fn strategy(&self) -> Strategy {
        let path_policy = if self.static_paths {
            PathPolicy::Static
        } else {
            PathPolicy::Transitive
        };

        let execution = match self.engine {
            Some(Engine::Annealing) => {
                return Strategy::Annealing(AnnealingConfig {
                    iterations: self.iterations,
                    seed: self.seed,
                    path_policy,
                    ..Default::default()
                });
            }
            Some(Engine::Sequential) => Execution::Sequential,
            Some(Engine::ForkJoin) => Execution::ForkJoin {
                depth_threshold: self.depth_threshold,
                threads: self.threads,
            },
            Some(Engine::Pool) | None => Execution::WorkerPool {
                threads: self.threads,
            },
        };

        let mut config = match self.accuracy {
            Some(accuracy) => config_for_accuracy(accuracy),
            None => SolverConfig::default(),
        };
        config.execution = execution;
        config.path_policy = path_policy;
        config.use_route_cache = self.cache;
        if let Some(k) = self.nearest {
            config.expansion = Expansion::Nearest(k);
        }
        Strategy::BranchAndBound(config)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_millis()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Commands::Solve {
            map,
            accuracy,
            engine,
            nearest,
            threads,
            depth_threshold,
            static_paths,
            cache,
            start,
            end,
            seed_path,
            seeds_required,
            iterations,
            seed,
            output,
            progress,
        } => {
            let args = SolveArgs {
                accuracy,
                engine,
                nearest,
                threads,
                depth_threshold,
                static_paths,
                cache,
                iterations,
                seed,
            };
            let constraint = Constraint::new(start, end);
            let seed_paths = seed_path
                .iter()
                .map(|p| p.split(',').map(|s| s.trim().to_string()).collect())
                .collect();
            let seeds = if seeds_required {
                Seeds::required(seed_paths)
            } else {
                Seeds::optional(seed_paths)
            };
            solve_map(&map, &args, constraint, seeds, output, progress)
        }

        Commands::Analyze { map } => analyze_map(&map),

        Commands::Compare { map, runs, output } => compare_strategies(&map, runs, output),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn solve_map(
    path: &Path,
    args: &SolveArgs,
    constraint: Constraint,
    seeds: Seeds,
    output: Option<PathBuf>,
    progress: bool,
) -> Result<()> {
    println!("Loading map from {:?}...", path);
    let graph = SectorGraph::from_json_file(path)?;
    println!("{}", graph.statistics());

    let strategy = args.strategy();
    if let Some(accuracy) = args.accuracy {
        println!("Accuracy {}/{}", accuracy, MAX_ACCURACY);
    }
    println!("Solving with {}...", strategy.name());

    let bar = progress.then(|| Arc::new(ProgressBarSink::new(graph.len())));
    let sink = bar.clone().map(|b| b as Arc<dyn ProgressSink>);
    let constraints = if constraint.is_empty() {
        Vec::new()
    } else {
        vec![constraint]
    };
    let solution = strategy.run(&graph, &constraints, &seeds, sink)?;
    if let Some(bar) = bar {
        bar.finish();
    }

    println!("\n========== Results ==========");
    println!("{}", solution);
    println!("\n{}", solution.statistics);

    if let Some(out_path) = output {
        let json = serde_json::to_string_pretty(&solution)?;
        std::fs::write(&out_path, json)?;
        println!("\nSolution saved to {:?}", out_path);
    }
    Ok(())
}

fn analyze_map(path: &Path) -> Result<()> {
    let graph = SectorGraph::from_json_file(path)?;

    println!("========== Map Analysis ==========\n");
    println!("{}", graph.statistics());

    for policy in [PathPolicy::Transitive, PathPolicy::Static] {
        let matrix = DistanceMatrix::build(&graph, policy);
        let mut reachable: Vec<i64> = Vec::new();
        for i in 0..matrix.len() {
            for j in 0..matrix.len() {
                if i != j && matrix.is_reachable(i, j) {
                    reachable.push(matrix.get(i, j));
                }
            }
        }

        println!("\n{:?} distances:", policy);
        println!("  Unreachable pairs: {}", matrix.unreachable_pairs());
        if let (Some(min), Some(max)) = (reachable.iter().min(), reachable.iter().max()) {
            let avg = reachable.iter().sum::<i64>() as f64 / reachable.len() as f64;
            println!("  Average: {:.2}", avg);
            println!("  Min: {}", min);
            println!("  Max: {}", max);
        }
        if policy == PathPolicy::Static {
            println!("  Sentinel: {}", matrix.sentinel());
        } else if matrix.sentinel() == UNREACHABLE && matrix.unreachable_pairs() > 0 {
            println!("  Some sectors cannot reach others; complete routes may not exist");
        }
    }

    let quick = Strategy::BranchAndBound(config_for_accuracy(1));
    let solution = quick.run(&graph, &[], &Seeds::default(), None)?;
    println!("\nQuick estimate ({}):", quick.name());
    println!("  Cost: {:?} ({:?})", solution.cost, solution.status);
    Ok(())
}

fn compare_strategies(path: &Path, runs: usize, output: Option<PathBuf>) -> Result<()> {
    let graph = SectorGraph::from_json_file(path)?;
    println!("Comparing strategies on {} (n={})...\n", graph.name(), graph.len());

    let mut benchmark = Benchmark::new(BenchmarkConfig {
        num_runs: runs,
        ..Default::default()
    });
    benchmark.run(&graph)?;

    println!("{}", benchmark.generate_report());

    if let Some(out_path) = output {
        benchmark.export_to_csv(&out_path)?;
        println!("\nResults exported to {:?}", out_path);
        let stats_path = out_path.with_extension("stats.csv");
        benchmark.export_statistics_csv(&stats_path)?;
        println!("Statistics exported to {:?}", stats_path);
    }
    Ok(())
}
