use std::panic;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use fdmgen::pipeline::run_sheet_pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "sheet2fdm",
    about = "Convert a sheet workbook (exported CSV tables) to a flight model XML"
)]
struct Args {
    /// Directory containing the exported T_* CSV tables
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Output directory
    #[arg(short = 'o', long = "outdir", default_value = "output")]
    outdir: PathBuf,
}

fn run(args: &Args) -> fdmgen::Result<()> {
    let artifacts = run_sheet_pipeline(&args.input, &args.outdir)?;
    println!("Wrote IR: {}", artifacts.ir_json.display());
    println!("Wrote XML: {}", artifacts.xml.display());
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    match panic::catch_unwind(|| run(&args)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            eprintln!("error: {e}");
            process::exit(e.exit_code());
        }
        Err(_) => process::exit(99),
    }
}
