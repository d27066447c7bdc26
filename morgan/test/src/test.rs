//! Runner for the graph files in `morgan/test/cases/`.  Every case is ranked through exactly the
//! same code path as the CLI, and the resulting classes are compared against `results.toml`.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::Context;
use colored::{Color, ColoredString, Colorize};
use itertools::Itertools;
use morgan_cli::{args::Options, CtrlCBehaviour};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};

// NOTE: All paths are relative to the `morgan` directory.  Cargo runs custom test code in the
// same directory as the `Cargo.toml` for that crate (in our case `morgan/cli/Cargo.toml`), so
// these will all be prefixed with `PATH_TO_MORGAN_DIR`.
const EXPECTED_RESULTS_PATH: &str = "test/results.toml";
const ACTUAL_RESULTS_PATH: &str = "test/.last-results.toml";
const TEST_DIR: &str = "test/cases/";
const PATH_TO_MORGAN_DIR: &str = "../";

/// Runs every case, or with `bless` (optionally `bless --fails`) copies the results of the last
/// run into `results.toml`
fn main() -> anyhow::Result<()> {
    // `cargo test` passes its own args to every test binary, so anything else just runs the cases
    let args = std::env::args().skip(1).collect_vec();
    if args.first().map(String::as_str) == Some("bless") {
        bless_tests(args.iter().any(|arg| arg == "--fails"))
    } else {
        run()
    }
}

/// Run the full test suite, failing if any case is unspecified or wrong
fn run() -> anyhow::Result<()> {
    morgan_cli::init_logging(log::LevelFilter::Error)?; // Equivalent to '-qq'
    let start = Instant::now();

    let cases = collect_cases()?;
    println!("running {} tests", cases.len());
    let completed_tests: Vec<RunTestCase> = cases.into_par_iter().map(run_test).collect();
    report_failures(&completed_tests);
    let passed = print_summary_string(&completed_tests, start.elapsed());
    // Saved so that `bless` doesn't have to rerun the cases
    write_actual_results(completed_tests)?;
    anyhow::ensure!(passed, "Tests failed");
    Ok(())
}

/// Add the results of the last run for new cases to `results.toml`, also overwriting the
/// expected results of failed cases if `include_fails` is set.  Cases which weren't part of the
/// last run are dropped.
fn bless_tests(include_fails: bool) -> anyhow::Result<()> {
    let mut expected_results = load_results(EXPECTED_RESULTS_PATH)?;
    let actual_results = load_results(ACTUAL_RESULTS_PATH)?;

    let mut blessed = Vec::<(CaseOutcome, String)>::new();
    let mut merged_results = ResultsFile::new();
    for (name, actual) in actual_results {
        let entry = match expected_results.remove(&name) {
            None => {
                blessed.push((CaseOutcome::Unspecified, name.clone()));
                actual
            }
            Some(expected) if include_fails && expected != actual => {
                blessed.push((CaseOutcome::Fail, name.clone()));
                actual
            }
            Some(expected) => expected,
        };
        merged_results.insert(name, entry);
    }

    if blessed.is_empty() {
        println!("Nothing to bless");
        return Ok(());
    }
    for (outcome, name) in &blessed {
        println!("    ({}) {}", outcome.colored_string(), name.bold());
    }
    println!("{} test cases blessed", blessed.len());
    write_results(&merged_results, EXPECTED_RESULTS_PATH)
}

////////////////////////
// LOADING TEST CASES //
////////////////////////

/// Walk [`TEST_DIR`] for `*.toml` files, pairing each with its expected result
fn collect_cases() -> anyhow::Result<Vec<UnrunTestCase>> {
    let mut results = load_results(EXPECTED_RESULTS_PATH)?;

    let mut cases = Vec::new();
    let dir = PathBuf::from(PATH_TO_MORGAN_DIR).join(TEST_DIR);
    for entry in walkdir::WalkDir::new(&dir).sort_by_file_name() {
        let entry = entry.with_context(|| "Error reading directory")?;
        if entry.path().extension().and_then(|s| s.to_str()) != Some("toml") {
            continue; // Skip anything that isn't a TOML file
        }
        let name = case_name(entry.path())?;
        cases.push(UnrunTestCase {
            expected_result: results.remove(&name),
            name,
        });
    }
    Ok(cases)
}

/// The path of a case, relative to the `morgan` directory and always using `/`, so that
/// `results.toml` is the same on every platform
fn case_name(path: &Path) -> anyhow::Result<String> {
    let relative_path = path
        .strip_prefix(PATH_TO_MORGAN_DIR)
        .with_context(|| format!("{:?} is outside the `morgan` directory", path))?;
    Ok(relative_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .join("/"))
}

//////////////////
// RESULT FILES //
//////////////////

/// The contents of the `results.toml` file, found at [`EXPECTED_RESULTS_PATH`].  We use a
/// [`BTreeMap`] so that the test cases are always written in a consistent order (i.e.
/// alphabetical order by file path), thus making the diffs easier to digest.
type ResultsFile = BTreeMap<String, ResultsFileEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
enum ResultsFileEntry {
    Error {
        error_message: String,
    },
    Ranking {
        /// The atom IDs in each class, in order of code
        classes: Vec<Vec<u32>>,
        iterations: usize,
        warnings: Vec<String>,
    },
}

fn load_results(path: &str) -> anyhow::Result<ResultsFile> {
    let full_path = PathBuf::from(PATH_TO_MORGAN_DIR).join(path);
    if !full_path.exists() {
        return Ok(ResultsFile::new());
    }
    let toml = std::fs::read_to_string(&full_path)
        .with_context(|| format!("Error loading results file ({:?})", full_path))?;
    let results_file: ResultsFile = toml::from_str(&toml)
        .with_context(|| format!("Error parsing results file ({:?})", full_path))?;
    Ok(results_file)
}

fn write_actual_results(cases: Vec<RunTestCase>) -> anyhow::Result<()> {
    let actual_results: ResultsFile = cases
        .into_iter()
        .map(|case| (case.base.name, case.actual_result))
        .collect();
    write_results(&actual_results, ACTUAL_RESULTS_PATH)
}

fn write_results(results: &ResultsFile, path: &str) -> anyhow::Result<()> {
    let toml = toml::to_string_pretty(results)
        .with_context(|| format!("Error serialising results file {:?}", path))?;
    let path_from_cargo_toml = PathBuf::from(PATH_TO_MORGAN_DIR).join(path);
    std::fs::write(path_from_cargo_toml, toml.as_bytes())
        .with_context(|| format!("Error writing results to {:?}", path))
}

////////////////////////
// RUNNING TEST CASES //
////////////////////////

/// Rank a test case and print a status line once finished
fn run_test(case: UnrunTestCase) -> RunTestCase {
    let path = PathBuf::from(PATH_TO_MORGAN_DIR).join(&case.name);
    let actual_result = match morgan_cli::run(
        &path,
        &Options::default(),
        CtrlCBehaviour::TerminateProcess, // Ctrl-C handlers can't be shared between cases
    ) {
        Ok(Some(result)) => ResultsFileEntry::Ranking {
            classes: result
                .ranking
                .classes()
                .into_iter()
                .map(|class| class.into_iter().copied().collect_vec())
                .collect_vec(),
            iterations: result.ranking.iterations(),
            warnings: result
                .ranking
                .warnings()
                .iter()
                .map(ToString::to_string)
                .collect_vec(),
        },
        Ok(None) => unreachable!("No debug options are set"),
        Err(e) => ResultsFileEntry::Error {
            error_message: e.to_string(),
        },
    };

    let run_case = RunTestCase {
        base: case,
        actual_result,
    };
    println!(
        "{} ... {}",
        run_case.base.name,
        run_case.outcome().colored_string()
    );
    run_case
}

////////////////////////////
// PRINT ERRORS & SUMMARY //
////////////////////////////

/// Given the completed tests, print reports for the unspecified and failed tests
fn report_failures(run_cases: &[RunTestCase]) {
    for case in run_cases {
        if case.outcome() == CaseOutcome::Unspecified {
            println!();
            println!(
                "Unspecified results for {}.  This is the output:",
                unspecified_str(&case.base.name)
            );
            println!("{:?}", case.actual_result);
        }
    }
    for case in run_cases {
        if let Some(expected) = &case.base.expected_result {
            if *expected != case.actual_result {
                println!();
                println!("{} produced the wrong output:", fail_str(&case.base.name));
                println!("    expected: {:?}", expected);
                println!("         got: {:?}", case.actual_result);
            }
        }
    }
}

/// Print a summary line for the tests, returning `true` if every case passed
fn print_summary_string(completed_tests: &[RunTestCase], duration: Duration) -> bool {
    let counts = completed_tests.iter().map(RunTestCase::outcome).counts();
    let count = |outcome: CaseOutcome| counts.get(&outcome).copied().unwrap_or(0);
    let num_ok = count(CaseOutcome::Ok);
    let num_unspecified = count(CaseOutcome::Unspecified);
    let num_failures = count(CaseOutcome::Fail);

    let passed = num_failures == 0 && num_unspecified == 0;
    println!();
    println!(
        "test result: {}. {} passed; {} unspecified; {} failed in {:.2?}",
        if passed { ok_string() } else { fail_string() },
        num_ok,
        num_unspecified,
        num_failures,
        duration
    );
    if num_unspecified > 0 {
        println!(
            "{}: run with `{}` to add the results for the new tests.",
            "note".white().bold(),
            "bless".bright_white()
        );
    }
    if num_failures > 0 {
        println!(
            "{}: If these failures are correct, then run with `{}` to 'bless' your results.",
            "note".white().bold(),
            "bless --fails".bright_white()
        );
    }
    passed
}

/////////////////////
// TEST CASE TYPES //
/////////////////////

#[derive(Debug)]
struct UnrunTestCase {
    name: String,
    expected_result: Option<ResultsFileEntry>,
}

#[derive(Debug)]
struct RunTestCase {
    base: UnrunTestCase,
    actual_result: ResultsFileEntry,
}

impl RunTestCase {
    fn outcome(&self) -> CaseOutcome {
        match &self.base.expected_result {
            None => CaseOutcome::Unspecified,
            Some(expected) if *expected == self.actual_result => CaseOutcome::Ok,
            Some(_) => CaseOutcome::Fail,
        }
    }
}

/// The outcomes of a test, corresponding to what's printed to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CaseOutcome {
    Ok,
    Unspecified,
    Fail,
}

impl CaseOutcome {
    fn colored_string(self) -> ColoredString {
        match self {
            Self::Ok => ok_string(),
            Self::Unspecified => "unspecified".color(UNSPECIFIED_COLOR),
            Self::Fail => fail_string(),
        }
    }
}

///////////
// UTILS //
///////////

fn unspecified_str(s: &str) -> ColoredString {
    s.color(UNSPECIFIED_COLOR).bold()
}

fn fail_str(s: &str) -> ColoredString {
    s.color(FAIL_COLOR).bold()
}

fn ok_string() -> ColoredString {
    "ok".color(Color::Green)
}

fn fail_string() -> ColoredString {
    "fail".color(FAIL_COLOR)
}

const FAIL_COLOR: Color = Color::BrightRed;
const UNSPECIFIED_COLOR: Color = Color::BrightBlue;
