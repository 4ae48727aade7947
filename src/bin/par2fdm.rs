use std::panic;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use fdmgen::config::Assumptions;
use fdmgen::pipeline::run_par_pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "par2fdm",
    about = "Convert a legacy FMS .par file to a flight model XML"
)]
struct Args {
    /// Input .par file
    input: PathBuf,

    /// Output directory
    #[arg(short = 'o', long = "outdir", default_value = "output")]
    outdir: PathBuf,

    /// Aircraft name override (default: input file stem)
    #[arg(short = 'n', long = "name")]
    name: Option<String>,

    /// Aerodynamic assumptions YAML (default: built-in values)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
}

fn run(args: &Args) -> fdmgen::Result<()> {
    let assumptions = match &args.config {
        Some(path) => Assumptions::from_yaml(path)?,
        None => Assumptions::standard(),
    };

    let artifacts = run_par_pipeline(
        &args.input,
        &args.outdir,
        args.name.as_deref(),
        &assumptions,
    )?;
    println!("Wrote {}", artifacts.xml.display());
    println!("Reports under {}", artifacts.output_dir.display());
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
