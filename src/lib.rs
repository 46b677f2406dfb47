pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod server;
pub mod ui;

use cli::{ Args, ChatArgs, Command, ServeArgs };
use config::prompt::load_prompt;
use llm::{ chat::new_client as new_chat_client, LlmConfig };
use log::{ info, warn };
use server::{ api::AppState, Server };
use std::error::Error;
use ui::{ ChatRepl, ConsoleRenderer, ProxyClient };

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.command {
        Command::Serve(serve) => serve_proxy(serve).await,
        Command::Chat(chat) => run_chat(chat).await,
    }
}

pub async fn serve_proxy(args: ServeArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let prompt = load_prompt(args.system_prompt_path.as_deref())?;
    let llm_config = LlmConfig::new(
        args.openai_api_key.clone(),
        Some(args.chat_model.clone()),
        args.chat_base_url.clone(),
    );
    let chat_client = new_chat_client(&llm_config)?;

    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Model: {}", chat_client.get_model());
    info!("Chat Base URL: {}", chat_client.get_base_url().unwrap_or_default());
    info!("System Prompt: {:?}", prompt.source);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");
    if llm_config.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set. Chat requests will fail until it is configured.");
    }

    let state = AppState::new(chat_client, prompt.system_prompt);
    let server = Server::new(args.server_addr.clone(), state, args);
    server.run().await
}

pub async fn run_chat(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let client = ProxyClient::new(&args.proxy_url)?;
    info!("Chatting through {}", client.endpoint());

    let renderer = ConsoleRenderer::stdout(!args.no_color);
    let mut repl = ChatRepl::new(client, renderer);
    repl.run_interactive().await?;
    Ok(())
}
