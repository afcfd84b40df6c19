//! Developer-only tooling: command sync, cog reloads, status and cleanup of
//! stale remote commands, behind a cached developer check.

pub mod cache;
pub mod history;
pub mod status;
pub mod sync;

use crate::clock::Clock;
use crate::commands::{BotStats, Cog, CommandTree};
use crate::config::Config;
use crate::constants::{colors, emojis};
use crate::embed::EmbedBuilder;
use crate::error::DevError;
use crate::models::Interaction;
use crate::probe::ProcessProbe;
use crate::registry::{CommandDescriptor, CommandOption, CommandRegistry, PrivilegeLookup};
use crate::reply::{Invocation, Responder};
use async_trait::async_trait;
use cache::{PermissionCache, DEFAULT_TTL};
use history::{CommandHistory, DevAction};
use serde_json::Value;
use status::StatusReporter;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sync::{CleanupReport, Reconciler, ReloadOutcome, SyncReport, SyncScope};
use tokio::time::Instant;
use tracing::{error, info, warn};

pub struct DevCog;

#[async_trait]
impl Cog for DevCog {
    fn name(&self) -> &'static str {
        "dev"
    }

    fn commands(&self) -> Vec<CommandDescriptor> {
        let mut action = CommandOption::string("action", "What to do", true);
        for a in DevAction::ALL {
            action = action.choice(a.as_str(), a.as_str());
        }
        let scope = CommandOption::string("scope", "Where to sync (default: guild)", false)
            .choice("guild", "guild")
            .choice("global", "global");
        let cog = CommandOption::string("cog", "Which cog to reload (default: all)", false)
            .choice("general", "general")
            .choice("fun", "fun")
            .choice("dev", "dev")
            .choice("all", "all");

        vec![CommandDescriptor::new("dev", "Developer tools for managing the bot")
            .option(action)
            .option(scope)
            .option(cog)]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DevRequest {
    pub action: DevAction,
    pub scope: SyncScope,
    pub target: Option<String>,
}

impl DevRequest {
    pub fn parse(action: &str, scope: Option<&str>, target: Option<&str>) -> Result<Self, DevError> {
        let action = action.parse::<DevAction>().map_err(DevError::InvalidArgument)?;
        let scope = scope.map(str::parse::<SyncScope>).transpose()?.unwrap_or_default();
        Ok(Self { action, scope, target: target.map(str::to_string) })
    }

    pub fn from_interaction(interaction: &Interaction) -> Result<Self, DevError> {
        Self::parse(
            interaction.option_str("action").unwrap_or_default(),
            interaction.option_str("scope"),
            interaction.option_str("cog"),
        )
    }

    /// `!dev sync [guild|global]`, `!dev reload [cog]`, `!dev status`, `!dev cleanup`.
    pub fn from_args(args: &str) -> Result<Self, DevError> {
        let mut parts = args.split_whitespace();
        let action = parts.next().ok_or_else(|| {
            DevError::InvalidArgument("usage: dev <sync|reload|status|cleanup> [scope|cog]".to_string())
        })?;
        let extra = parts.next();
        match action.parse::<DevAction>().map_err(DevError::InvalidArgument)? {
            DevAction::Reload => Self::parse(action, None, extra),
            DevAction::Sync => Self::parse(action, extra, None),
            _ => Self::parse(action, None, None),
        }
    }
}

/// Entry point for every developer command. Constructed once at startup
/// and shared by the event handlers.
pub struct DevTools {
    config: Config,
    cache: PermissionCache,
    history: CommandHistory,
    reconciler: Reconciler,
    tree: Arc<CommandTree>,
    registry: Arc<dyn CommandRegistry>,
    privileges: Arc<dyn PrivilegeLookup>,
    probe: Arc<dyn ProcessProbe>,
    stats: Arc<BotStats>,
    clock: Arc<dyn Clock>,
    started_at: Instant,
    ready: AtomicBool,
    guild_count: AtomicUsize,
}

pub struct DevToolsParts {
    pub config: Config,
    pub tree: Arc<CommandTree>,
    pub registry: Arc<dyn CommandRegistry>,
    pub privileges: Arc<dyn PrivilegeLookup>,
    pub probe: Arc<dyn ProcessProbe>,
    pub stats: Arc<BotStats>,
    pub clock: Arc<dyn Clock>,
}

impl DevTools {
    pub fn new(parts: DevToolsParts) -> Self {
        let DevToolsParts { config, tree, registry, privileges, probe, stats, clock } = parts;
        let reconciler = Reconciler::new(registry.clone(), tree.clone(), config.clone(), clock.clone());
        Self {
            cache: PermissionCache::new(clock.clone(), DEFAULT_TTL),
            history: CommandHistory::default(),
            started_at: clock.now(),
            reconciler,
            config,
            tree,
            registry,
            privileges,
            probe,
            stats,
            clock,
            ready: AtomicBool::new(false),
            guild_count: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> &BotStats {
        &self.stats
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Developer-check entries currently held, expired ones included.
    pub fn cached_permissions(&self) -> usize {
        self.cache.len()
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn set_guild_count(&self, count: usize) {
        self.guild_count.store(count, Ordering::Relaxed);
    }

    pub fn guild_count(&self) -> usize {
        self.guild_count.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.started_at)
    }

    /// Drops expired developer-check entries. Called after every command.
    pub fn sweep(&self) -> usize {
        self.cache.sweep_expired()
    }

    /// Developer check without side effects on the invoker; lookup errors
    /// read as "not a developer".
    pub async fn is_developer(&self, user_id: u64, guild_id: Option<u64>) -> bool {
        match self.cache.check(user_id, guild_id, self.privileges.as_ref(), &self.config).await {
            Ok(is_dev) => is_dev,
            Err(e) => {
                warn!("Developer check for {} failed: {:#}", user_id, e);
                false
            }
        }
    }

    /// First sync after READY: the dev guild in development, global otherwise.
    pub async fn startup_sync(&self) {
        let scope = if self.config.dev_mode { SyncScope::Guild } else { SyncScope::Global };
        match self.reconciler.sync(scope, None).await {
            Ok(report) => info!("✅ Startup sync: {} commands in {}", report.applied, report.scope),
            Err(e) => error!("❌ Startup sync failed ({}): {}", e.kind(), e),
        }
    }

    pub async fn execute(&self, inv: &Invocation, out: &dyn Responder, request: DevRequest) {
        BotStats::bump(&self.stats.dev);
        let user = inv.user();
        let action = request.action;
        info!("Dev command \"{}\" from {} in {:?}", action, user.tag(), inv.guild_id());

        let allowed = match self
            .cache
            .check(user.id, inv.guild_id(), self.privileges.as_ref(), &self.config)
            .await
        {
            Ok(allowed) => allowed,
            Err(e) => {
                self.fail(inv, out, action, DevError::Unknown(e)).await;
                return;
            }
        };
        if !allowed {
            let denied = DevError::PermissionDenied(format!(
                "{} Only bot developers can use this command.",
                emojis::KEY
            ));
            self.fail(inv, out, action, denied).await;
            return;
        }

        if !self.is_ready() && !action.allowed_while_starting() {
            self.fail(inv, out, action, DevError::NotReady).await;
            return;
        }

        if let Err(e) = inv.defer(out, true).await {
            warn!("Could not defer dev {}: {:#}", action, e);
        }

        self.guarded(inv, out, action, self.route(inv, &request)).await;
    }

    /// Runs one handler: on success the embed is sent and the action
    /// recorded; any error goes through [`DevTools::fail`].
    async fn guarded<F>(&self, inv: &Invocation, out: &dyn Responder, action: DevAction, handler: F)
    where
        F: Future<Output = Result<Value, DevError>>,
    {
        match handler.await {
            Ok(embed) => {
                self.history.record(inv.user().id, inv.user().display_name(), action, true);
                if let Err(e) = inv.respond(out, embed, true).await {
                    error!("Could not deliver dev {} result: {:#}", action, e);
                }
            }
            Err(err) => self.fail(inv, out, action, err).await,
        }
    }

    async fn fail(&self, inv: &Invocation, out: &dyn Responder, action: DevAction, err: DevError) {
        let user = inv.user();
        match &err {
            DevError::PermissionDenied(_) | DevError::NotReady => {
                warn!("Dev {} rejected for {}: {}", action, user.tag(), err)
            }
            _ => {
                BotStats::bump(&self.stats.errors_caught);
                error!(
                    "Dev {} failed for {} in {:?} ({}): {:?}",
                    action,
                    user.tag(),
                    inv.guild_id(),
                    err.kind(),
                    err
                );
            }
        }
        self.history.record(user.id, user.display_name(), action, false);

        let title = match &err {
            DevError::PermissionDenied(_) => "Access denied",
            DevError::NotReady => "Still starting",
            DevError::Configuration(_) => "Configuration error",
            DevError::PartialReload { .. } => "Reload incomplete",
            _ => "Command failed",
        };
        let message = err.user_message(self.config.dev_mode);
        let embed = match &err {
            DevError::PartialReload { outcomes, .. } => EmbedBuilder::new()
                .title(emojis::ERROR, title)
                .description(message)
                .color(colors::ERROR)
                .field("Results", reload_lines(outcomes), false)
                .now()
                .build(),
            _ => EmbedBuilder::error(title, message),
        };
        if let Err(e) = inv.respond(out, embed, true).await {
            error!("Could not deliver dev {} error: {:#}", action, e);
        }
    }

    async fn route(&self, inv: &Invocation, request: &DevRequest) -> Result<Value, DevError> {
        match request.action {
            DevAction::Sync => {
                let report = self.reconciler.sync(request.scope, inv.guild_id()).await?;
                Ok(sync_embed(&report))
            }
            DevAction::Reload => {
                let target = request.target.as_deref().unwrap_or("all");
                let outcomes = self.reconciler.reload(target).await?;
                if outcomes.iter().any(|o| o.success && o.name == "dev") {
                    // a fresh dev cog starts without remembered checks or history
                    self.cache.clear();
                    self.history.clear();
                    info!("Dev cog reloaded, permission cache and history cleared");
                }
                let embed = reload_embed(&outcomes);
                match DevError::partial_reload(outcomes) {
                    Some(err) => Err(err),
                    None => Ok(embed),
                }
            }
            DevAction::Status => {
                let scope = self.reconciler.resolve(SyncScope::Guild, inv.guild_id()).ok();
                let reporter = StatusReporter {
                    mode: self.config.mode_name(),
                    guild_count: self.guild_count(),
                    uptime: self.uptime(),
                    registry: self.registry.as_ref(),
                    tree: &self.tree,
                    reconciler: &self.reconciler,
                    history: &self.history,
                    cache: &self.cache,
                    probe: self.probe.as_ref(),
                    stats: &self.stats,
                };
                Ok(reporter.snapshot(scope).await.to_embed())
            }
            DevAction::Cleanup => {
                let report = self.reconciler.cleanup(inv.guild_id()).await?;
                self.cache.clear();
                info!("Permission cache cleared by cleanup");
                Ok(cleanup_embed(&report))
            }
        }
    }
}

fn sync_embed(report: &SyncReport) -> Value {
    let mut embed = EmbedBuilder::new()
        .title(emojis::REFRESH, "Commands synced")
        .color(if report.warnings.is_empty() { colors::SUCCESS } else { colors::WARNING })
        .field("Scope", report.scope.to_string(), true)
        .field("Before", report.old_count.to_string(), true)
        .field("Now", report.applied.to_string(), true);
    if report.removal_failures > 0 {
        embed = embed.field(
            format!("{} Removal failures", emojis::WARNING),
            report.removal_failures.to_string(),
            true,
        );
    }
    if !report.warnings.is_empty() {
        embed = embed.field(format!("{} Warnings", emojis::WARNING), report.warnings.join("\n"), false);
    }
    embed.now().build()
}

/// One line per cog: a check mark on success, the cross and the reason on
/// failure.
fn reload_lines(outcomes: &[ReloadOutcome]) -> String {
    outcomes
        .iter()
        .map(|o| match (&o.error, o.success) {
            (_, true) => format!("{} `{}`", emojis::SUCCESS, o.name),
            (Some(reason), false) => format!("{} `{}`: {}", emojis::ERROR, o.name, reason),
            (None, false) => format!("{} `{}`", emojis::ERROR, o.name),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn reload_embed(outcomes: &[ReloadOutcome]) -> Value {
    EmbedBuilder::new()
        .title(emojis::RECYCLE, "Cogs reloaded")
        .description(reload_lines(outcomes))
        .color(colors::SUCCESS)
        .footer("Run /dev action:sync to publish command changes")
        .now()
        .build()
}

fn cleanup_embed(report: &CleanupReport) -> Value {
    if report.removed == 0 {
        return EmbedBuilder::success("Nothing to clean", "No obsolete commands are registered.");
    }
    let scopes: Vec<String> = report.resynced.iter().map(|s| s.to_string()).collect();
    let resynced = if scopes.is_empty() { "none".to_string() } else { scopes.join(", ") };
    EmbedBuilder::new()
        .title(emojis::BROOM, "Cleanup finished")
        .color(colors::SUCCESS)
        .field("Removed", report.removed.to_string(), true)
        .field("Re-synced", resynced, true)
        .now()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::commands::fake::FakeCog;
    use crate::probe::FixedProbe;
    use crate::registry::fake::{FakePrivileges, FakeRegistry};
    use crate::registry::Scope;
    use crate::reply::fake::{interaction, user, RecordingResponder};

    const OWNER: u64 = 1;
    const DEV_GUILD: u64 = 500;

    fn config(dev_mode: bool) -> Config {
        Config {
            token: "t".to_string(),
            application_id: Some(9),
            prefix: "!".to_string(),
            dev_mode,
            dev_guild_id: Some(DEV_GUILD),
            global_sync_override: false,
            settle: Duration::ZERO,
        }
    }

    async fn tools_with(
        config: Config,
        privileges: impl Into<Arc<FakePrivileges>>,
        cogs: Vec<Arc<dyn Cog>>,
    ) -> (DevTools, Arc<FakeRegistry>) {
        let privileges: Arc<FakePrivileges> = privileges.into();
        let tree = Arc::new(CommandTree::new(cogs));
        tree.load_all().await;
        let registry = Arc::new(FakeRegistry::new());
        let tools = DevTools::new(DevToolsParts {
            config,
            tree,
            registry: registry.clone(),
            privileges,
            probe: Arc::new(FixedProbe(None)),
            stats: Arc::new(BotStats::default()),
            clock: Arc::new(MockClock::new()),
        });
        (tools, registry)
    }

    async fn tools(dev_mode: bool) -> (DevTools, Arc<FakeRegistry>) {
        let cogs: Vec<Arc<dyn Cog>> = vec![
            Arc::new(FakeCog::new("general", &["ping", "help"])),
            Arc::new(FakeCog::new("fun", &["roll"])),
        ];
        let (tools, registry) = tools_with(config(dev_mode), FakePrivileges::owners(&[OWNER]), cogs).await;
        tools.mark_ready();
        (tools, registry)
    }

    fn request(action: DevAction) -> DevRequest {
        DevRequest { action, scope: SyncScope::Guild, target: None }
    }

    #[tokio::test]
    async fn non_developer_is_denied_and_recorded() {
        let (tools, registry) = tools(true).await;
        let out = RecordingResponder::default();

        tools.execute(&interaction(2, Some(DEV_GUILD)), &out, request(DevAction::Sync)).await;

        let embeds = out.embeds();
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0]["title"], format!("{} Access denied", emojis::ERROR));
        assert!(registry.calls().is_empty());
        let last = &tools.history().recent(1)[0];
        assert_eq!((last.user_id, last.action, last.success), (2, DevAction::Sync, false));
    }

    #[tokio::test]
    async fn role_holder_in_dev_guild_may_sync() {
        let mut privileges = FakePrivileges::owners(&[]);
        privileges.roles.insert((DEV_GUILD, 3), vec!["Bot Developer".to_string()]);
        let cogs: Vec<Arc<dyn Cog>> = vec![Arc::new(FakeCog::new("general", &["ping"]))];
        let (tools, registry) = tools_with(config(true), privileges, cogs).await;
        let out = RecordingResponder::default();

        tools.execute(&interaction(3, Some(DEV_GUILD)), &out, request(DevAction::Sync)).await;

        assert_eq!(registry.names(Scope::Guild(DEV_GUILD)), vec!["ping"]);
        assert!(tools.history().recent(1)[0].success);
    }

    #[tokio::test]
    async fn sync_defers_then_answers_once() {
        let (tools, registry) = tools(true).await;
        let out = RecordingResponder::default();

        tools.execute(&interaction(OWNER, Some(DEV_GUILD)), &out, request(DevAction::Sync)).await;

        assert_eq!(out.sent().len(), 2);
        let embeds = out.embeds();
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0]["title"], format!("{} Commands synced", emojis::REFRESH));
        assert_eq!(registry.names(Scope::Guild(DEV_GUILD)), vec!["help", "ping", "roll"]);
        assert_eq!(BotStats::get(&tools.stats().dev), 1);
    }

    #[tokio::test]
    async fn global_sync_in_dev_mode_reports_configuration_error() {
        let (tools, registry) = tools(true).await;
        let out = RecordingResponder::default();
        let req = DevRequest { action: DevAction::Sync, scope: SyncScope::Global, target: None };

        tools.execute(&interaction(OWNER, Some(DEV_GUILD)), &out, req).await;

        let embeds = out.embeds();
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0]["title"], format!("{} Configuration error", emojis::ERROR));
        assert!(registry.calls().is_empty());
        assert!(!tools.history().recent(1)[0].success);
        assert_eq!(BotStats::get(&tools.stats().errors_caught), 1);
    }

    #[tokio::test]
    async fn only_sync_and_status_run_before_ready() {
        let cogs: Vec<Arc<dyn Cog>> = vec![Arc::new(FakeCog::new("general", &["ping"]))];
        let (tools, _) = tools_with(config(true), FakePrivileges::owners(&[OWNER]), cogs).await;

        let out = RecordingResponder::default();
        tools.execute(&interaction(OWNER, Some(DEV_GUILD)), &out, request(DevAction::Cleanup)).await;
        assert_eq!(out.embeds()[0]["title"], format!("{} Still starting", emojis::ERROR));

        let out = RecordingResponder::default();
        tools.execute(&interaction(OWNER, Some(DEV_GUILD)), &out, request(DevAction::Status)).await;
        assert_eq!(out.embeds()[0]["title"], format!("{} Developer Status", emojis::TOOLS));

        let recent = tools.history().recent(2);
        assert_eq!(recent[0].action, DevAction::Status);
        assert!(recent[0].success);
        assert!(!recent[1].success);
    }

    #[tokio::test]
    async fn partial_reload_is_reported_as_failure() {
        let cogs: Vec<Arc<dyn Cog>> = vec![
            Arc::new(FakeCog::new("general", &["ping"])),
            Arc::new(FakeCog::new("fun", &["roll"]).failing()),
            Arc::new(FakeCog::new("dev", &["dev"])),
        ];
        let (tools, _) = tools_with(config(true), FakePrivileges::owners(&[OWNER]), cogs).await;
        tools.mark_ready();
        let out = RecordingResponder::default();

        tools.execute(&interaction(OWNER, Some(DEV_GUILD)), &out, request(DevAction::Reload)).await;

        let embeds = out.embeds();
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0]["title"], format!("{} Reload incomplete", emojis::ERROR));
        assert_eq!(embeds[0]["description"], "1 of 3 reloads failed: fun");
        let results = embeds[0]["fields"][0]["value"].as_str().unwrap();
        assert!(results.contains(&format!("{} `general`", emojis::SUCCESS)));
        assert!(results.contains(&format!("{} `dev`", emojis::SUCCESS)));
        assert!(results.contains(&format!("{} `fun`: fun exploded during setup", emojis::ERROR)));

        let last = &tools.history().recent(1)[0];
        assert_eq!((last.action, last.success), (DevAction::Reload, false));
    }

    #[tokio::test]
    async fn cleanup_forgets_cached_developer_checks() {
        let privileges = Arc::new(FakePrivileges::owners(&[OWNER]));
        let cogs: Vec<Arc<dyn Cog>> = vec![Arc::new(FakeCog::new("general", &["ping"]))];
        let (tools, _) = tools_with(config(true), privileges.clone(), cogs).await;
        tools.mark_ready();

        assert!(tools.is_developer(OWNER, Some(DEV_GUILD)).await);
        assert_eq!(privileges.lookups(), 1);

        let out = RecordingResponder::default();
        tools.execute(&interaction(OWNER, Some(DEV_GUILD)), &out, request(DevAction::Cleanup)).await;
        assert_eq!(out.embeds()[0]["title"], format!("{} Nothing to clean", emojis::SUCCESS));
        assert_eq!(privileges.lookups(), 1);
        assert_eq!(tools.cached_permissions(), 0);

        assert!(tools.is_developer(OWNER, Some(DEV_GUILD)).await);
        assert_eq!(privileges.lookups(), 2);
    }

    #[tokio::test]
    async fn reloading_the_dev_cog_resets_cache_and_history() {
        let privileges = Arc::new(FakePrivileges::owners(&[OWNER]));
        let cogs: Vec<Arc<dyn Cog>> = vec![
            Arc::new(FakeCog::new("general", &["ping"])),
            Arc::new(FakeCog::new("dev", &["dev"])),
        ];
        let (tools, _) = tools_with(config(true), privileges.clone(), cogs).await;
        tools.mark_ready();
        let inv = interaction(OWNER, Some(DEV_GUILD));

        tools.execute(&inv, &RecordingResponder::default(), request(DevAction::Status)).await;
        let reload_general = DevRequest { target: Some("general".to_string()), ..request(DevAction::Reload) };
        tools.execute(&inv, &RecordingResponder::default(), reload_general).await;
        assert_eq!(tools.history().len(), 2);
        assert_eq!(tools.cached_permissions(), 1);

        let reload_dev = DevRequest { target: Some("dev".to_string()), ..request(DevAction::Reload) };
        tools.execute(&inv, &RecordingResponder::default(), reload_dev).await;
        assert_eq!(tools.history().len(), 1);
        assert_eq!(tools.cached_permissions(), 0);
        assert_eq!(privileges.lookups(), 1);
    }

    #[tokio::test]
    async fn lookup_failure_denies_with_an_error() {
        let mut privileges = FakePrivileges::owners(&[OWNER]);
        privileges.fail = true;
        let (tools, registry) = tools_with(config(false), privileges, Vec::new()).await;
        tools.mark_ready();
        let out = RecordingResponder::default();

        tools.execute(&interaction(OWNER, Some(42)), &out, request(DevAction::Sync)).await;

        assert_eq!(out.embeds().len(), 1);
        assert_eq!(out.embeds()[0]["title"], format!("{} Command failed", emojis::ERROR));
        assert!(registry.calls().is_empty());
        assert!(!tools.is_developer(OWNER, None).await);
    }

    #[tokio::test]
    async fn prefix_invocation_answers_in_channel() {
        let (tools, registry) = tools(false).await;
        registry.seed(Scope::Guild(42), &["dice"]);
        let out = RecordingResponder::default();
        let inv = Invocation::Context { channel_id: 77, guild_id: Some(42), author: user(OWNER, "owner") };

        tools.execute(&inv, &out, DevRequest::from_args("cleanup").unwrap()).await;

        let sent = out.sent();
        assert_eq!(sent.len(), 1);
        assert!(matches!(&sent[0], crate::reply::fake::Sent::Channel(77, _)));
        let embed = &out.embeds()[0];
        assert_eq!(embed["fields"][0]["value"], "1");
        assert_eq!(embed["fields"][1]["value"], "none");
        // production publishes globally, so the guild is only pruned
        assert!(registry.names(Scope::Guild(42)).is_empty());
    }

    #[test]
    fn prefix_arguments_map_to_scope_or_cog() {
        let sync = DevRequest::from_args("sync global").unwrap();
        assert_eq!((sync.action, sync.scope), (DevAction::Sync, SyncScope::Global));
        let reload = DevRequest::from_args("reload fun").unwrap();
        assert_eq!(reload.target.as_deref(), Some("fun"));
        assert!(DevRequest::from_args("").is_err());
        assert!(DevRequest::from_args("deploy").is_err());
        assert!(DevRequest::parse("sync", Some("everywhere"), None).is_err());
    }

    #[test]
    fn dev_cog_exposes_one_validated_command() {
        let commands = DevCog.commands();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].validate().is_ok());
        assert_eq!(commands[0].options[0].choices.len(), 4);
    }
}
