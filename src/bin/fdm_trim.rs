use std::panic;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use fdmgen::ir::AircraftIr;
use fdmgen::trim::{assess_quality, run_trim_multiple_speeds, LongitudinalModel, TrimScoring};

#[derive(Parser, Debug)]
#[command(
    name = "fdm-trim",
    about = "Trim smoke test of a dumped model IR using the built-in longitudinal model"
)]
struct Args {
    /// model_ir.json produced by a conversion run
    input: PathBuf,

    /// Airspeeds to trim at, m/s
    #[arg(short = 's', long = "speeds", value_delimiter = ',', default_values_t = vec![10.0, 15.0, 20.0])]
    speeds: Vec<f64>,

    /// Altitude, m
    #[arg(short = 'a', long = "altitude", default_value_t = 30.5)]
    altitude: f64,

    /// Weight on the vertical-acceleration residual
    #[arg(long = "wdot-weight", default_value_t = 1.0)]
    wdot_weight: f64,

    /// Weight on the pitch-acceleration residual
    #[arg(long = "qdot-weight", default_value_t = 10.0)]
    qdot_weight: f64,
}

fn run(args: &Args) -> fdmgen::Result<bool> {
    let ir = AircraftIr::read_json(&args.input)?;
    let model = LongitudinalModel::from_ir(&ir)?;
    let elevator_max_rad = model.elevator_max_rad();
    let scoring = TrimScoring {
        wdot_weight: args.wdot_weight,
        qdot_weight: args.qdot_weight,
    };

    let results = run_trim_multiple_speeds(&model, &args.speeds, args.altitude, scoring)?;

    let mut all_converged = true;
    for result in &results {
        let (quality, issues) = assess_quality(result, elevator_max_rad);
        println!(
            "{:.1} m/s: {} (elevator {:+.3}, throttle {:.3}, alpha {:+.2} deg, L/D {:.1})",
            result.airspeed_mps,
            quality,
            result.elevator_norm,
            result.throttle_norm,
            result.alpha_rad.to_degrees(),
            result.lift_to_drag,
        );
        println!(
            "  residuals: wdot {:+.3} ft/s2, qdot {:+.5} rad/s2, score {:.4} ({})",
            result.wdot_fps2, result.qdot_radps2, result.score, result.guess
        );
        for issue in &issues {
            println!("  issue: {issue}");
        }
        all_converged &= result.converged;
    }
    Ok(all_converged)
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    match panic::catch_unwind(|| run(&args)) {
        Ok(Ok(true)) => {}
        Ok(Ok(false)) => {
            eprintln!("error: trim did not converge at every requested speed");
            process::exit(4);
        }
        Ok(Err(e)) => {
            eprintln!("error: {e}");
            process::exit(e.exit_code());
        }
        Err(_) => process::exit(99),
    }
}
