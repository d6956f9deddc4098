mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use pingbox::app::{App, shutdown_signal};
use pingbox::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    observability::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = args.load_config()?;
            App::new(config).run_until(shutdown_signal()).await?;
        }
        Commands::Check(args) => {
            let config = args.common.load_config()?;
            let summary = App::new(config).check().await?;
            if !summary.all_succeeded() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
