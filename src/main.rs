mod clock;
mod commands;
mod config;
mod constants;
mod embed;
mod error;
mod gateway;
mod handler;
mod models;
mod probe;
mod registry;
mod reply;
mod rest;
mod tiers;

use clock::SystemClock;
use commands::dev::{DevTools, DevToolsParts};
use commands::fun::FunCog;
use commands::general::GeneralCog;
use commands::{BotStats, CommandTree};
use config::{Config, SystemEnv};
use dotenv::dotenv;
use handler::BotState;
use probe::SysinfoProbe;
use rest::RestClient;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rimuru_devtools=info")),
        )
        .init();

    let config = match Config::from_env(&SystemEnv) {
        Ok(c) => c,
        Err(e) => {
            error!("❌ {}", e);
            return;
        }
    };

    info!(
        "🦀 rimuru-devtools starting (prefix='{}', mode={}) — raw WebSocket + HTTP, no wrapper",
        config.prefix,
        config.mode_name()
    );
    if let Some(guild) = config.dev_guild_id {
        info!("Development guild: {}", guild);
    }

    let rest = match RestClient::new(&config.token, config.application_id) {
        Ok(r) => Arc::new(r),
        Err(e) => {
            error!("❌ Failed to build HTTP client: {:?}", e);
            return;
        }
    };

    if let Err(e) = rest.validate_token().await {
        error!("❌ Token validation failed: {:?}", e);
        return;
    }

    let general = Arc::new(GeneralCog::new());
    let fun = Arc::new(FunCog::new());
    let tree = Arc::new(CommandTree::new(commands::default_cogs(general.clone(), fun.clone())));
    let loaded = tree.load_all().await;
    info!("📦 {} of {} cogs loaded", loaded, tree.cog_names().len());

    let dev = Arc::new(DevTools::new(DevToolsParts {
        config: config.clone(),
        tree,
        registry: rest.clone(),
        privileges: rest.clone(),
        probe: Arc::new(SysinfoProbe::new()),
        stats: Arc::new(BotStats::default()),
        clock: Arc::new(SystemClock),
    }));

    let state = Arc::new(BotState::new(rest, dev, general, fun));
    gateway::run(config.token, state).await;
}
