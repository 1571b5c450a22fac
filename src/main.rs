//! Paddock: horse race tracker CLI.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paddock::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging on stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paddock=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::AddRace { input } => cli::run_add_race(input),
        Commands::AddHorse {
            name,
            jockey,
            weight,
            odds,
            number,
        } => cli::run_add_horse(name, jockey, weight, odds, number),
        Commands::List { upcoming } => cli::run_list(upcoming),
        Commands::Horses => cli::run_horses(),
        Commands::Show { race_id } => cli::run_show(race_id),
        Commands::Predict { race_id } => cli::run_predict(race_id),
        Commands::Result { race_id, winner } => cli::run_result(race_id, winner),
        Commands::Stats => cli::run_stats(),
        Commands::Activity => cli::run_activity(),
        Commands::Fetch {
            provider,
            max_races,
            import,
        } => cli::run_fetch(provider, max_races, import).await,
        Commands::Export { output } => cli::run_export(output),
        Commands::Import { input } => cli::run_import(input),
        Commands::Clear { yes } => cli::run_clear(yes),
    }
}
