use canopy_watch::{AnalysisReport, Configuration, VegetationChangeAnalyzer};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn, Level};

const USAGE: &str = "Usage: canopy-watch <before_image> <after_image>";

fn init_logging(level: Level) {
    // stdout is reserved for the JSON report
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn print_error(message: &str) {
    let report = AnalysisReport::Failed {
        error: message.to_string(),
    };
    let json = report
        .to_json()
        .unwrap_or_else(|_| format!("{{\"error\": {message:?}}}"));
    println!("{json}");
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let [before, after] = match <[OsString; 2]>::try_from(args) {
        Ok(paths) => paths,
        Err(_) => {
            print_error(USAGE);
            return ExitCode::FAILURE;
        }
    };

    let (configuration, config_error) = match Configuration::load() {
        Ok(configuration) => (configuration, None),
        Err(e) => (Configuration::default(), Some(e)),
    };
    init_logging(configuration.level());
    if let Some(e) = config_error {
        warn!("{}; falling back to default settings", e);
    }

    let analyzer = VegetationChangeAnalyzer::new(&configuration.detection);
    let result = analyzer
        .analyze_images(&PathBuf::from(before), &PathBuf::from(after))
        .await
        .and_then(|report| report.to_json());

    match result {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
