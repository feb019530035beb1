use std::fs;
use std::path::PathBuf;

use bundle_charts::bundle::FileFetcher;
use bundle_charts::{HostElement, SessionConfig, SessionLoader, SessionOutcome};

const DEFAULT_HOST_ID: &str = "charts";
const USAGE: &str =
    "Usage: cargo run --bin render_bundle -- --bundle <path> [--output <file.html>] [--config <json>]";

#[derive(Debug)]
struct CliArgs {
    bundle_path: PathBuf,
    output_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

fn main() {
    let _ = bundle_charts::telemetry::init_default_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let config = match &args.config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
            SessionConfig::from_json_str(&raw).map_err(|err| err.to_string())?
        }
        None => SessionConfig::default(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("failed to start runtime: {err}"))?;

    let host = HostElement::new(DEFAULT_HOST_ID);
    let loader = SessionLoader::new(FileFetcher::new(), config);
    let url = args.bundle_path.to_string_lossy().into_owned();
    let report = runtime.block_on(loader.load(&url, &host));

    let html = host.to_html().map_err(|err| err.to_string())?;
    match &args.output_path {
        Some(path) => fs::write(path, format!("{html}\n"))
            .map_err(|err| format!("failed to write `{}`: {err}", path.display()))?,
        None => println!("{html}"),
    }

    match report.outcome {
        SessionOutcome::Failed(err) => Err(err.to_string()),
        SessionOutcome::Loaded { title, .. } => {
            for (filename, err) in &report.omitted {
                eprintln!("warning: chart `{filename}` omitted: {err}");
            }
            eprintln!(
                "rendered {} of {} chart(s) from `{title}`",
                report.rendered.len(),
                report.rendered.len() + report.omitted.len()
            );
            Ok(())
        }
    }
}

fn parse_args() -> Result<CliArgs, String> {
    let mut bundle_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--bundle" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --bundle".to_owned())?;
                bundle_path = Some(PathBuf::from(value));
            }
            "--output" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --output".to_owned())?;
                output_path = Some(PathBuf::from(value));
            }
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --config".to_owned())?;
                config_path = Some(PathBuf::from(value));
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ => {
                return Err(format!("unknown argument `{arg}`"));
            }
        }
    }

    Ok(CliArgs {
        bundle_path: bundle_path.ok_or_else(|| format!("missing --bundle\n{USAGE}"))?,
        output_path,
        config_path,
    })
}
