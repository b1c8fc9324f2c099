mod commands;
mod ingest;
mod terminal;

use commands::{CommandLine, Commands, run, validate};
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    logging::init();

    match commands.command {
        Commands::Run(args) => run::run(args).await,
        Commands::Validate { config } => validate::validate(&config),
    }
}
