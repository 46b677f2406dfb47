use clap::Parser;
use dotenv::dotenv;
use std::error::Error;
use tour_guide_chat::cli::{ Args, Command };

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    let args = Args::parse();

    // The chat UI shares the terminal with its log output, so it stays quiet
    // unless RUST_LOG asks otherwise.
    let default_filter = match args.command {
        Command::Serve(_) => "info",
        Command::Chat(_) => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    tour_guide_chat::run(args).await
}
