use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use log::info;

use lightoff::baseline::DEFAULT_BINS;
use lightoff::{
    conversion_curve, read_spectrum_dir, read_spectrum_file, write_conversion_table,
    BaselineMethod, FlowRates,
};

/// Compute catalytic CO2 conversion vs. temperature from a directory of
/// QMS scan exports and a calibration run
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding one scan export per temperature point
    spectra_dir: PathBuf,

    /// Scan export of the calibration run with known feed composition
    calibration_file: PathBuf,

    /// Helium carrier flow rate [sccm]
    #[arg(long, default_value_t = 30.0)]
    helium: f64,

    /// Initial CO feed flow rate [sccm]
    #[arg(long, default_value_t = 2.0)]
    carbon_monoxide: f64,

    /// Initial O2 feed flow rate [sccm]
    #[arg(long, default_value_t = 4.0)]
    oxygen: f64,

    /// Baseline estimator applied to every trace: "mode" for the most
    /// common exact value, "histogram" for the mean of the densest
    /// intensity bin
    #[arg(long, value_parser = parse_baseline, default_value = "mode")]
    baseline: BaselineMethod,
}

fn parse_baseline(value: &str) -> Result<BaselineMethod, String> {
    match value {
        "mode" => Ok(BaselineMethod::Mode),
        "histogram" => Ok(BaselineMethod::Histogram { bins: DEFAULT_BINS }),
        other => Err(format!(
            "unknown baseline estimator {other:?}, expected \"mode\" or \"histogram\""
        )),
    }
}

fn usage_error(message: String) -> ExitCode {
    eprintln!("error: {message}");
    eprintln!("{}", Args::command().render_usage());
    ExitCode::from(2)
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let flows = FlowRates::new(args.helium, args.carbon_monoxide, args.oxygen);
    info!(
        "calculating conversion vs. temperature using files in: {}",
        args.spectra_dir.display()
    );

    let calibration = read_spectrum_file(&args.calibration_file)?;
    let spectra = read_spectrum_dir(&args.spectra_dir)?;
    let curve = conversion_curve(&spectra, &calibration, flows, args.baseline)?;
    let path = write_conversion_table(&args.spectra_dir, &curve)?;
    println!(
        "wrote {} conversion points to {}",
        curve.len(),
        path.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    if !args.spectra_dir.is_dir() {
        return usage_error(format!(
            "{} is not a readable directory",
            args.spectra_dir.display()
        ));
    }
    if !args.calibration_file.is_file() {
        return usage_error(format!(
            "{} is not a readable file",
            args.calibration_file.display()
        ));
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
