//! Strategy comparison on a single map.
//!
//! Runs each strategy several times, records cost and wall time per run, and
//! aggregates the runs into per-strategy statistics exportable as CSV.

use crate::constraint::Seeds;
use crate::distance::Cost;
use crate::error::Result;
use crate::graph::SectorGraph;
use crate::strategy::Strategy;

use log::info;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// One run of one strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub strategy: String,
    pub map: String,
    pub sectors: usize,
    pub run: usize,
    pub cost: Option<Cost>,
    pub complete: bool,
    /// Wall time in seconds
    pub time: f64,
    pub nodes_expanded: u64,
}

/// Aggregate over all runs of one strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyStatistics {
    pub strategy: String,
    pub runs: usize,
    pub completed: usize,
    pub best_cost: Option<Cost>,
    pub worst_cost: Option<Cost>,
    pub avg_cost: Option<f64>,
    pub avg_time: f64,
    pub total_time: f64,
}

#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Runs per strategy
    pub num_runs: usize,
    pub strategies: Vec<Strategy>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            strategies: Strategy::catalogue(),
        }
    }
}

pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<RunResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    pub fn results(&self) -> &[RunResult] {
        &self.results
    }

    /// Runs every configured strategy `num_runs` times. Annealing runs use the
    /// run index as seed.
    pub fn run(&mut self, graph: &SectorGraph) -> Result<()> {
        let strategies = self.config.strategies.clone();
        for strategy in &strategies {
            for run in 0..self.config.num_runs {
                let strategy = match strategy {
                    Strategy::Annealing(config) => {
                        let mut config = config.clone();
                        config.seed = run as u64;
                        Strategy::Annealing(config)
                    }
                    other => other.clone(),
                };
                let solution = strategy.run(graph, &[], &Seeds::default(), None)?;
                info!(
                    "{} run {}: cost {:?} in {:.4}s",
                    strategy.name(),
                    run,
                    solution.cost,
                    solution.computation_time
                );
                self.results.push(RunResult {
                    strategy: strategy.name(),
                    map: graph.name().to_string(),
                    sectors: graph.len(),
                    run,
                    cost: solution.cost,
                    complete: solution.is_complete(),
                    time: solution.computation_time,
                    nodes_expanded: solution.statistics.nodes_expanded,
                });
            }
        }
        Ok(())
    }

    /// Per-strategy statistics, fastest first.
    pub fn compute_statistics(&self) -> Vec<StrategyStatistics> {
        let mut by_strategy: HashMap<&str, Vec<&RunResult>> = HashMap::new();
        for result in &self.results {
            by_strategy
                .entry(result.strategy.as_str())
                .or_default()
                .push(result);
        }

        let mut statistics: Vec<StrategyStatistics> = by_strategy
            .into_iter()
            .map(|(strategy, runs)| {
                let costs: Vec<Cost> = runs.iter().filter_map(|r| r.cost).collect();
                let total_time: f64 = runs.iter().map(|r| r.time).sum();
                let avg_cost = if costs.is_empty() {
                    None
                } else {
                    Some(costs.iter().sum::<Cost>() as f64 / costs.len() as f64)
                };
                StrategyStatistics {
                    strategy: strategy.to_string(),
                    runs: runs.len(),
                    completed: runs.iter().filter(|r| r.complete).count(),
                    best_cost: costs.iter().copied().min(),
                    worst_cost: costs.iter().copied().max(),
                    avg_cost,
                    avg_time: total_time / runs.len() as f64,
                    total_time,
                }
            })
            .collect();

        statistics.sort_by_key(|s| OrderedFloat(s.avg_time));
        statistics
    }

    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        for result in &self.results {
            writer.serialize(result)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        report.push_str("========================================\n");
        report.push_str("      Route Strategy Comparison\n");
        report.push_str("========================================\n\n");

        report.push_str(&format!(
            "{:<36} {:>9} {:>8} {:>10} {:>10}\n",
            "Strategy", "Complete", "Best", "Average", "Avg Time"
        ));
        report.push_str(&"-".repeat(78));
        report.push('\n');

        let dash = || "-".to_string();
        for stat in self.compute_statistics() {
            report.push_str(&format!(
                "{:<36} {:>9} {:>8} {:>10} {:>10.4}\n",
                stat.strategy,
                format!("{}/{}", stat.completed, stat.runs),
                stat.best_cost.map(|c| c.to_string()).unwrap_or_else(dash),
                stat.avg_cost.map(|c| format!("{:.2}", c)).unwrap_or_else(dash),
                stat.avg_time
            ));
        }
        report
    }
}
