use clap::Parser;
use tracing_subscriber::EnvFilter;

use saboteur::cli::{Cli, Commands};
use saboteur::client::AgentClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    let client = AgentClient::default();
    let outcomes = match &cli.command {
        Commands::Add(args) => client.add(&args.hosts.hosts, &args.to_request()).await,
        Commands::Reset(args) => client.reset(&args.hosts).await,
    };

    for outcome in &outcomes {
        println!("{}", outcome.report());
    }

    if outcomes.iter().all(|o| o.succeeded()) {
        Ok(())
    } else {
        std::process::exit(1)
    }
}
