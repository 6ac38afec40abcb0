use clap::Parser;

use client::cli::Cli;
use client::commands;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    common::utils::logging::init_logging_cli(cli.verbose);

    if let Err(e) = commands::execute(cli).await {
        eprintln!("Error: {}", commands::describe(&e));
        std::process::exit(1);
    }
}
