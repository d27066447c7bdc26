use std::path::PathBuf;

use log::LevelFilter;
use morgan::{InvariantFlags, StabilityCheck};
use structopt::StructOpt;

use crate::DebugOption;

/// A struct storing the CLI args taken by Morgan.  `StructOpt` will generate the argument
/// parsing/help code for us.
#[derive(Debug, Clone, StructOpt)]
#[structopt(name = "Morgan", about = "Canonical ranking of the atoms of a molecule")]
pub struct CliArgs {
    /// The name of the graph file to rank (`*.toml`)
    #[structopt(parse(from_os_str))]
    pub input_file: PathBuf,

    #[structopt(flatten)]
    pub options: Options,

    /// Makes Morgan print more output (`-vv` will log every iteration).
    #[structopt(short, long = "verbose", parse(from_occurrences))]
    pub verbosity: usize,
    /// Makes Morgan print less output (`-qq` will only produce errors).
    #[structopt(short, long = "quiet", parse(from_occurrences))]
    pub quietness: usize,
}

// Parameters passed directly into `morgan_cli::run`, used to generate the `InvariantFlags` and
// `morgan::Config` for the ranking.  This isn't a doc-comment because doc comments override
// `#[structopt(about = "...")]`.
#[derive(Default, Debug, Clone, StructOpt)]
pub struct Options {
    /// Distinguish atoms by isotope.  Overrides the graph file's `[invariants]` table.
    #[structopt(long)]
    pub isotope: bool,
    /// Distinguish atoms and bonds by their stereo marks
    #[structopt(long)]
    pub stereo: bool,
    /// Distinguish atoms by hybridization
    #[structopt(long)]
    pub hybridization: bool,
    /// Distinguish atoms by their number of neighbours
    #[structopt(long)]
    pub neighbors: bool,
    /// Don't distinguish atoms by element or charge, leaving only topology and bond orders
    #[structopt(long)]
    pub no_element: bool,
    /// Check the most populous class (rather than the class with the largest code) when deciding
    /// whether the ranking has stabilised
    #[structopt(long)]
    pub most_populous: bool,
    /// Stop after this many iterations, rather than 4 per atom
    #[structopt(long)]
    pub max_iterations: Option<usize>,

    /// Debug options.  `toml`, `graph` and `flags` print the corresponding data structures.
    /// `no-rank` will run as normal but stop just before ranking.
    #[structopt(short = "D", long)]
    pub debug_option: Option<DebugOption>,
}

impl Options {
    /// Apply these options on top of the [`InvariantFlags`] given by the graph file
    pub fn apply_to(&self, mut flags: InvariantFlags) -> InvariantFlags {
        flags.isotope |= self.isotope;
        flags.stereo |= self.stereo;
        flags.hybridization |= self.hybridization;
        flags.neighbors |= self.neighbors;
        if self.no_element {
            flags.element = false;
        }
        flags
    }

    pub fn stability_check(&self) -> StabilityCheck {
        if self.most_populous {
            StabilityCheck::MostPopulousClass
        } else {
            StabilityCheck::LargestCode
        }
    }
}

impl CliArgs {
    /// Parse the `-q`/`-v` args into the [`LevelFilter`] to give to the `log` library
    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity as isize - self.quietness as isize {
            x if x < -2 => LevelFilter::Off, // -qqq (or more `q`s)
            -2 => LevelFilter::Error,        // -qq
            -1 => LevelFilter::Warn,         // -q
            0 => LevelFilter::Info,          // <none of -q or -v>
            1 => LevelFilter::Debug,         // -v
            2 => LevelFilter::Trace,         // -vv
            _ => LevelFilter::Trace,         // -vvv (or more `v`s)
        }
    }
}
