// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::Parser;
use clap::error::ErrorKind;

use waste_classifier::cli::args::{Cli, USAGE};
use waste_classifier::cli::classify::run_classification;
use waste_classifier::cli::logging::set_verbose;
use waste_classifier::{NAME, VERSION, error, info};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return;
        }
        Err(e) => {
            let rendered = e.to_string();
            let reason = rendered.lines().next().unwrap_or_default();
            error!("{}", reason.trim_start_matches("error: "));
            println!("{USAGE}");
            return;
        }
    };

    set_verbose(cli.verbose);
    if cli.verbose {
        info!("{NAME} {VERSION} 🚀 ONNX Runtime");
    }

    let output = run_classification(&cli);
    match output.to_json() {
        Ok(line) => println!("{line}"),
        Err(e) => {
            error!("Failed to serialize result: {e}");
        }
    }
}
