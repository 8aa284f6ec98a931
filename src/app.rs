//! Headless runner behind the `orchard` binary.

use anyhow::{Context, Result};
use orchard_core::config::AppConfig;
use orchard_core::stats::PopulationStats;
use orchard_core::Simulation;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub ticks: u64,
    /// Log population stats every this many ticks; 0 disables reports.
    pub report_every: u64,
    /// Write every event as one JSON line to the output.
    pub print_events: bool,
    pub save_trees: Option<PathBuf>,
    pub load_trees: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ticks: 3600,
            report_every: 600,
            print_events: false,
            save_trees: None,
            load_trees: None,
        }
    }
}

/// What a finished run reports.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub stats: PopulationStats,
    pub counters: BTreeMap<String, u64>,
    pub saved_trees: Option<PathBuf>,
}

pub struct App {
    pub sim: Simulation,
    options: RunOptions,
}

impl App {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load_config(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Config file not found; using defaults");
            return Ok(AppConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        AppConfig::from_toml(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Builds and populates a simulation. Trees come from a distribution
    /// file when one is given on the command line or in the config.
    pub fn new(config: AppConfig, options: RunOptions) -> Result<Self> {
        let mut sim = Simulation::new(config)?;
        sim.populate_creatures()?;

        let distribution_path = options.load_trees.clone().or_else(|| {
            sim.config()
                .tree
                .distribution_path
                .as_ref()
                .map(PathBuf::from)
        });
        match distribution_path {
            Some(path) => {
                let distribution = orchard_io::distribution::load(&path)?;
                sim.load_tree_distribution(&distribution)?;
            }
            None => {
                sim.populate_trees()?;
            }
        }
        Ok(Self { sim, options })
    }

    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        for _ in 0..self.options.ticks {
            let events = self.sim.step();
            if self.options.print_events {
                for event in &events {
                    writeln!(out, "{}", orchard_io::to_json(event)?)?;
                }
            }

            let tick = self.sim.tick();
            if self.options.report_every > 0 && tick % self.options.report_every == 0 {
                let stats = self.sim.stats();
                tracing::info!(
                    tick,
                    creatures = stats.creatures,
                    trees = stats.mature_trees,
                    saplings = stats.saplings,
                    fruit = stats.hanging_fruit + stats.fallen_fruit,
                    mean_speed = stats.mean_speed,
                    mean_awareness = stats.mean_awareness,
                    "Population report"
                );
            }

            let stats = self.sim.stats();
            if stats.creatures == 0 && stats.mature_trees + stats.saplings == 0 {
                tracing::info!(tick, "World is empty; stopping early");
                break;
            }
        }

        let saved_trees = match &self.options.save_trees {
            Some(path) => {
                orchard_io::distribution::save(&self.sim.capture_tree_distribution(), path)?;
                Some(path.clone())
            }
            None => None,
        };

        Ok(RunSummary {
            ticks: self.sim.tick(),
            stats: self.sim.stats(),
            counters: self.sim.metrics().counters(),
            saved_trees,
        })
    }
}
