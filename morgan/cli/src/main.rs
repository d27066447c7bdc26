#![deny(clippy::all)]
#![deny(rustdoc::broken_intra_doc_links)]

use morgan_cli::{args::CliArgs, CtrlCBehaviour};
use structopt::StructOpt;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::from_args();
    morgan_cli::init_logging(args.log_level())?;
    let maybe_result = morgan_cli::run(
        &args.input_file,
        &args.options,
        CtrlCBehaviour::RecoverPartialRanking,
    )?;
    if let Some(result) = maybe_result {
        result.print();
    }
    Ok(())
}
