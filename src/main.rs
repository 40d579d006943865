use anyhow::{Context, Result};
use clap::Parser;
use presence_analyzer::cli::{Cli, Command};
use presence_analyzer::{report, AnalyzerConfig, PresenceAnalyzer};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Configuration file first, then command-line source overrides
fn load_config(cli: &Cli) -> Result<AnalyzerConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };

    if let Some(csv) = &cli.csv {
        config.data_csv = csv.clone();
    }
    if let Some(xml) = &cli.xml {
        config.data_xml = xml.clone();
    }

    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn run(cli: &Cli, analyzer: &PresenceAnalyzer) -> Result<String> {
    let pretty = cli.pretty;
    match cli.command {
        Command::Users => {
            let directory = analyzer.directory()?;
            to_json(&report::users(&directory), pretty)
        }
        Command::Avatar { user_id } => {
            let directory = analyzer.directory()?;
            to_json(&report::avatar(&directory, user_id)?, pretty)
        }
        Command::MeanWeekday { user_id } => {
            let store = analyzer.presence_store()?;
            to_json(&report::mean_time_weekday(&store, user_id)?, pretty)
        }
        Command::Weekday { user_id } => {
            let store = analyzer.presence_store()?;
            to_json(&report::presence_weekday(&store, user_id)?, pretty)
        }
        Command::StartEnd { user_id } => {
            let store = analyzer.presence_store()?;
            to_json(&report::presence_start_end(&store, user_id)?, pretty)
        }
        Command::Monthly { user_id } => {
            let store = analyzer.presence_store()?;
            to_json(&report::monthly_presence(&store, user_id)?, pretty)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = load_config(&cli)?;
    tracing::debug!(?config, "Using configuration");

    let analyzer = PresenceAnalyzer::new(config);
    let output = run(&cli, &analyzer)?;
    println!("{}", output);

    Ok(())
}
