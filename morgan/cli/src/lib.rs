//! Crate for loading and ranking Morgan's graph files.  The CLI itself is a very thin wrapper
//! around this crate, parsing CLI args and immediately calling into it.  This crate is also
//! shared with the integration test runner, making sure that the integration tests run in
//! exactly the same way as the CLI.

#![deny(clippy::all)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod args;
mod toml_file;
mod utils;

use std::{
    path::Path,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use anyhow::Context;
use colored::Colorize;
use itertools::Itertools;
use log::LevelFilter;
use morgan::{Config, Ranking, SimpleGraph};
use simple_logger::SimpleLogger;

use crate::{args::Options, toml_file::GraphFile};

pub fn init_logging(log_level: LevelFilter) -> anyhow::Result<()> {
    SimpleLogger::new()
        .without_timestamps()
        .with_colors(true)
        .with_level(log_level)
        .init()
        .context("Error initialising logger")
}

/// Load a graph file and rank it, returning `Ok(None)` if a [`DebugOption`] stopped the run
/// before ranking.
pub fn run(
    input_file: &Path,
    options: &Options,
    ctrl_c_behaviour: CtrlCBehaviour,
) -> anyhow::Result<Option<RunResult>> {
    /// If the user specifies a [`DebugOption`] flag with e.g. `-D graph`, then debug print the
    /// corresponding value and exit.
    macro_rules! debug_print {
        ($variant: ident, $val: expr) => {
            if options.debug_option == Some(DebugOption::$variant) {
                dbg!($val);
                return Ok(None);
            }
        };
    }

    let graph_file = GraphFile::read_from_file(input_file)?;
    debug_print!(Toml, &graph_file);

    let graph = graph_file.lower()?;
    debug_print!(Graph, &graph);
    let flags = options.apply_to(graph_file.flags());
    debug_print!(Flags, flags);
    if options.debug_option == Some(DebugOption::StopBeforeRanking) {
        return Ok(None);
    }

    let abort_flag = match ctrl_c_behaviour {
        CtrlCBehaviour::RecoverPartialRanking => {
            let flag = Arc::new(AtomicBool::new(false));
            let handler_flag = flag.clone();
            ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed))
                .context("Error setting Ctrl-C handler")?;
            Some(flag)
        }
        CtrlCBehaviour::TerminateProcess => None,
    };
    let config = Config {
        stability_check: options.stability_check(),
        abort_flag,
        max_iterations: options.max_iterations,
    };

    log::info!(
        "Ranking {} atoms and {} bonds",
        graph.len(),
        graph.num_bonds()
    );
    let start_time = Instant::now();
    let ranking = graph.ranking_with_config(flags, &config);
    Ok(Some(RunResult {
        graph,
        ranking,
        duration: start_time.elapsed(),
    }))
}

/// What should happen when the user presses Ctrl-C during a ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlCBehaviour {
    /// Stop refining and print the partial ranking.  This registers a process-wide handler, so
    /// can only be used once per process.
    RecoverPartialRanking,
    /// Let Ctrl-C kill the process as normal
    TerminateProcess,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub graph: SimpleGraph<u32>,
    pub ranking: Ranking<u32>,
    pub duration: Duration,
}

impl RunResult {
    pub fn print(&self) {
        println!();
        for class in self.ranking.classes() {
            let Some(code) = class.first().and_then(|id| self.ranking.get(id)) else {
                continue;
            };
            let atoms = class
                .iter()
                .map(|&&id| self.atom_label(id))
                .join(" ");
            println!("{:>8}: {}", code.to_string().bold(), atoms);
        }

        println!();
        for warning in self.ranking.warnings() {
            println!("{}: {}", "warning".yellow().bold(), warning);
        }
        let summary = format!(
            "{} atoms in {} classes after {} iterations",
            self.ranking.len(),
            self.ranking.num_classes(),
            self.ranking.iterations(),
        );
        let summary = if self.ranking.is_degraded() {
            summary.yellow()
        } else {
            summary.green()
        };
        println!("{} (took {:.2?})", summary, self.duration);
    }

    /// The element symbol followed by the atom's ID, e.g. `C12`
    fn atom_label(&self, id: u32) -> String {
        match self.graph.atom(&id) {
            Some(atom) => format!("{}{}", atom.element, id),
            None => id.to_string(),
        }
    }
}

/// What item should be debug printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugOption {
    Toml,
    Graph,
    Flags,
    /// Stop just before ranking, to check that the graph file is valid
    StopBeforeRanking,
}

impl FromStr for DebugOption {
    type Err = String;

    fn from_str(v: &str) -> Result<Self, String> {
        Ok(match v.to_lowercase().as_str() {
            "toml" => Self::Toml,
            "graph" => Self::Graph,
            "flags" => Self::Flags,
            "no-rank" => Self::StopBeforeRanking,
            _ => {
                return Err(format!(
                    "Unknown value {:?}. Expected `toml`, `graph`, `flags` or `no-rank`.",
                    v
                ))
            }
        })
    }
}
