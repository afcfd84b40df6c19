use crate::commands::dev::{DevRequest, DevTools};
use crate::commands::fun::{self, FunCog};
use crate::commands::general::{self, GeneralCog};
use crate::commands::BotStats;
use crate::constants::emojis;
use crate::embed::EmbedBuilder;
use crate::models::{channel_type, interaction_type, Guild, Interaction, Message, ReadyData};
use crate::reply::{Invocation, Responder};
use crate::rest::RestClient;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{error, info, warn};

/// Everything the event handlers share.
pub struct BotState {
    pub rest: Arc<RestClient>,
    /// Where replies go; the REST client outside tests.
    out: Arc<dyn Responder>,
    pub dev: Arc<DevTools>,
    pub general: Arc<GeneralCog>,
    pub fun: Arc<FunCog>,
    bot_id: OnceLock<u64>,
    guilds: Mutex<HashSet<u64>>,
    /// Guilds announced by READY that have not streamed in yet.
    pending: Mutex<HashSet<u64>>,
}

impl BotState {
    pub fn new(rest: Arc<RestClient>, dev: Arc<DevTools>, general: Arc<GeneralCog>, fun: Arc<FunCog>) -> Self {
        Self {
            out: rest.clone(),
            rest,
            dev,
            general,
            fun,
            bot_id: OnceLock::new(),
            guilds: Mutex::new(HashSet::new()),
            pending: Mutex::new(HashSet::new()),
        }
    }

    fn stats(&self) -> &BotStats {
        self.dev.stats()
    }

    fn prefix(&self) -> &str {
        &self.dev.config().prefix
    }

    #[cfg(test)]
    fn with_responder(mut self, out: Arc<dyn Responder>) -> Self {
        self.out = out;
        self
    }

    /// Guilds whose next GUILD_CREATE is a stream-in, not a join: those
    /// announced by READY and those coming back from an outage.
    pub fn expect_guilds(&self, ids: impl IntoIterator<Item = u64>) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.extend(ids);
        }
    }

    /// Whether a GUILD_CREATE for `guild_id` means the bot was just added.
    fn take_join(&self, guild_id: u64) -> bool {
        self.pending
            .lock()
            .map(|mut pending| !pending.remove(&guild_id))
            .unwrap_or(false)
    }

    fn update_guilds(&self, f: impl FnOnce(&mut HashSet<u64>)) {
        if let Ok(mut guilds) = self.guilds.lock() {
            f(&mut guilds);
            self.dev.set_guild_count(guilds.len());
        }
    }
}

pub async fn handle_ready(state: Arc<BotState>, ready: ReadyData) {
    info!(
        "✅ READY — logged in as {} (session: {}, {} guilds)",
        ready.user.tag(),
        ready.session_id,
        ready.guilds.len()
    );
    let _ = state.bot_id.set(ready.user.id);

    if state.dev.is_ready() {
        // a fresh session after reconnecting; commands are already in place
        return;
    }
    state.dev.mark_ready();
    state.dev.startup_sync().await;
}

pub async fn handle_guild_create(state: Arc<BotState>, guild: Guild) {
    state.update_guilds(|g| {
        g.insert(guild.id);
    });
    if !state.take_join(guild.id) {
        return;
    }

    info!(
        "🏠 Joined guild {} ({}, {} members)",
        guild.name,
        guild.id,
        guild.member_count.unwrap_or(0)
    );

    if !state.dev.config().allows_guild(guild.id) {
        warn!("Development mode: leaving non-development guild {} ({})", guild.name, guild.id);
        if let Err(e) = state.rest.leave_guild(guild.id).await {
            error!("Failed to leave guild {}: {:?}", guild.id, e);
        }
        return;
    }

    let Some(channel_id) = welcome_channel(&guild) else {
        warn!("No text channel to welcome {} in", guild.name);
        return;
    };
    let embed = general::welcome_embed(&guild.name, guild.member_count, state.prefix());
    if let Err(e) = state.out.send_message(channel_id, json!({ "embeds": [embed] })).await {
        error!("Failed to send welcome message to {}: {:?}", guild.id, e);
    }
}

pub async fn handle_guild_delete(state: Arc<BotState>, data: Value) {
    let Some(id) = data["id"].as_str().and_then(|s| s.parse::<u64>().ok()) else {
        return;
    };
    // an outage, not a removal; the guild streams back in later
    if data["unavailable"].as_bool().unwrap_or(false) {
        warn!("Guild {} became unavailable", id);
        state.expect_guilds([id]);
        return;
    }
    state.update_guilds(|g| {
        g.remove(&id);
    });
    info!("👋 Removed from guild {}", id);
}

/// System channel, else a text channel called `general`, else the first
/// text channel by position.
pub fn welcome_channel(guild: &Guild) -> Option<u64> {
    if let Some(id) = guild.system_channel_id {
        return Some(id);
    }
    let mut text: Vec<_> = guild
        .channels
        .iter()
        .filter(|c| c.kind == channel_type::GUILD_TEXT)
        .collect();
    text.sort_by_key(|c| c.position);
    text.iter()
        .find(|c| c.name.as_deref() == Some("general"))
        .or(text.first())
        .map(|c| c.id)
}

pub async fn handle_message(state: Arc<BotState>, msg: Message) {
    if msg.author.bot {
        return;
    }
    BotStats::bump(&state.stats().messages_processed);

    let prefix = state.prefix().to_string();
    let out: &dyn Responder = state.out.as_ref();

    let Some(content) = msg.content.strip_prefix(prefix.as_str()) else {
        let mentioned = state
            .bot_id
            .get()
            .is_some_and(|id| msg.mentions.iter().any(|u| u.id == *id));
        if mentioned {
            let embed = general::mention_embed(msg.author.display_name(), &prefix);
            if let Err(e) = out.send_message(msg.channel_id, json!({ "embeds": [embed] })).await {
                error!("Failed to answer mention: {:?}", e);
            }
        }
        return;
    };

    let mut parts = content.split_whitespace();
    let cmd = match parts.next() {
        Some(c) => c.to_lowercase(),
        None => return,
    };
    let args = parts.collect::<Vec<&str>>().join(" ");

    info!("Command \"{}\" from {} (args: \"{}\")", cmd, msg.author.tag(), args);
    let inv = Invocation::from_message(&msg);

    let result = match cmd.as_str() {
        "ping" => ping(&state, &inv).await,
        "roll" | "dice" | "d20" => roll(&state, &inv).await,
        "help" => help(&state, &inv, args.split_whitespace().next()).await,
        "dev" => {
            match DevRequest::from_args(&args) {
                Ok(request) => state.dev.execute(&inv, out, request).await,
                Err(e) => reject(&state, &inv, &e.user_message(state.dev.config().dev_mode)).await,
            }
            Ok(())
        }
        _ => {
            warn!("Unknown command: {} (args: {})", cmd, args);
            return;
        }
    };

    if let Err(e) = result {
        BotStats::bump(&state.stats().errors_caught);
        error!("Error executing command \"{}\": {:?}", cmd, e);
    }
    state.dev.sweep();
}

pub async fn handle_interaction(state: Arc<BotState>, interaction: Interaction) {
    if interaction.kind != interaction_type::APPLICATION_COMMAND {
        return;
    }
    let Some(inv) = Invocation::from_interaction(&interaction) else {
        warn!("Interaction {} has no invoking user", interaction.id);
        return;
    };
    let name = interaction.command_name().unwrap_or_default().to_string();
    info!("Slash command /{} from {}", name, inv.user().tag());

    let out: &dyn Responder = state.out.as_ref();
    let result = match name.as_str() {
        "ping" => ping(&state, &inv).await,
        "roll" => roll(&state, &inv).await,
        "help" => help(&state, &inv, interaction.option_str("command")).await,
        "dev" => {
            match DevRequest::from_interaction(&interaction) {
                Ok(request) => state.dev.execute(&inv, out, request).await,
                Err(e) => reject(&state, &inv, &e.user_message(state.dev.config().dev_mode)).await,
            }
            Ok(())
        }
        other => {
            warn!("Unknown slash command: /{}", other);
            reject(&state, &inv, "That command is no longer available.").await;
            Ok(())
        }
    };

    if let Err(e) = result {
        BotStats::bump(&state.stats().errors_caught);
        error!("Error executing /{}: {:?}", name, e);
        reject(&state, &inv, "Something went wrong, please try again.").await;
    }
    state.dev.sweep();
}

async fn ping(state: &BotState, inv: &Invocation) -> anyhow::Result<()> {
    BotStats::bump(&state.stats().ping);
    let latency = state.rest.measure_latency().await?;
    let embed = general::ping_embed(
        state.general.latency_status(latency),
        latency,
        state.dev.uptime(),
        state.dev.guild_count(),
        state.stats(),
        inv.user().display_name(),
    );
    inv.respond(state.out.as_ref(), embed, false).await
}

async fn roll(state: &BotState, inv: &Invocation) -> anyhow::Result<()> {
    BotStats::bump(&state.stats().roll);
    let result = state.fun.roll();
    info!("🎲 {} rolled {}", inv.user().tag(), result.value);
    let embed = fun::roll_embed(&result, inv.user().display_name());
    inv.respond(state.out.as_ref(), embed, false).await
}

async fn help(state: &BotState, inv: &Invocation, command: Option<&str>) -> anyhow::Result<()> {
    BotStats::bump(&state.stats().help);
    let show_dev = state.dev.is_developer(inv.user().id, inv.guild_id()).await;
    let embed = general::help_embed(command.map(|c| c.trim_start_matches('/')), show_dev);
    inv.respond(state.out.as_ref(), embed, false).await
}

async fn reject(state: &BotState, inv: &Invocation, message: &str) {
    let embed = EmbedBuilder::error("Command failed", format!("{} {}", emojis::WARNING, message));
    if let Err(e) = inv.respond(state.out.as_ref(), embed, true).await {
        error!("Failed to deliver error response: {:?}", e);
    }
}
