use super::cache::PermissionCache;
use super::history::{CommandHistory, CommandRecord};
use super::sync::{Reconciler, SyncRecord};
use crate::commands::general::format_uptime;
use crate::commands::{BotStats, CommandTree};
use crate::constants::{colors, emojis};
use crate::embed::{relative_time, EmbedBuilder};
use crate::probe::{ProcessProbe, ProcessStats};
use crate::registry::{CommandRegistry, Scope};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

const HISTORY_SHOWN: usize = 5;

#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub mode: &'static str,
    pub guild_count: usize,
    pub scope: Option<Scope>,
    /// Remote count for `scope`; `None` when it could not be listed.
    pub command_count: Option<usize>,
    pub local_command_count: usize,
    pub uptime: Duration,
    pub last_sync: Option<SyncRecord>,
    pub process_stats: Option<ProcessStats>,
    pub recent_history: Vec<CommandRecord>,
    pub cached_dev_count: usize,
    pub commands_used: u64,
    pub errors_caught: u64,
}

/// Read-only view over the dev tool components.
pub struct StatusReporter<'a> {
    pub mode: &'static str,
    pub guild_count: usize,
    pub uptime: Duration,
    pub registry: &'a dyn CommandRegistry,
    pub tree: &'a CommandTree,
    pub reconciler: &'a Reconciler,
    pub history: &'a CommandHistory,
    pub cache: &'a PermissionCache,
    pub probe: &'a dyn ProcessProbe,
    pub stats: &'a BotStats,
}

impl StatusReporter<'_> {
    pub async fn snapshot(&self, scope: Option<Scope>) -> StatusSnapshot {
        let command_count = match scope {
            Some(scope) => match self.registry.list(scope).await {
                Ok(cmds) => Some(cmds.len()),
                Err(e) => {
                    warn!("Could not count commands in {}: {:#}", scope, e);
                    None
                }
            },
            None => None,
        };

        StatusSnapshot {
            mode: self.mode,
            guild_count: self.guild_count,
            scope,
            command_count,
            local_command_count: self.tree.local_commands().await.len(),
            uptime: self.uptime,
            last_sync: self.reconciler.last_sync(),
            process_stats: self.probe.sample(),
            recent_history: self.history.recent(HISTORY_SHOWN),
            cached_dev_count: self.cache.active_developers(),
            commands_used: self.stats.commands_used(),
            errors_caught: BotStats::get(&self.stats.errors_caught),
        }
    }
}

impl StatusSnapshot {
    pub fn to_embed(&self) -> Value {
        let remote = match (self.scope, self.command_count) {
            (Some(scope), Some(n)) => format!("{} registered ({})", n, scope),
            (Some(scope), None) => format!("unavailable ({})", scope),
            (None, _) => "no scope".to_string(),
        };

        let last_sync = match &self.last_sync {
            Some(record) => format!(
                "{}: {} → {} {}",
                record.scope,
                record.old_count,
                record.new_count,
                relative_time(record.timestamp)
            ),
            None => "Not synced since startup".to_string(),
        };

        let mut embed = EmbedBuilder::new()
            .title(emojis::TOOLS, "Developer Status")
            .color(colors::INFO)
            .field(format!("{} Mode", emojis::SETTINGS), self.mode, true)
            .field(format!("{} Servers", emojis::SERVER), self.guild_count.to_string(), true)
            .field(format!("{} Uptime", emojis::CLOCK), format_uptime(self.uptime), true)
            .field(
                format!("{} Commands", emojis::PACKAGE),
                format!("{} local\n{}", self.local_command_count, remote),
                true,
            )
            .field(format!("{} Last sync", emojis::REFRESH), last_sync, true)
            .field(
                format!("{} Usage", emojis::CHART),
                format!(
                    "Commands used: {}\nErrors caught: {}\nCached developers: {}",
                    self.commands_used, self.errors_caught, self.cached_dev_count
                ),
                true,
            );

        if let Some(stats) = &self.process_stats {
            let mut lines = vec![
                format!("Memory: {:.1} MB", stats.memory_mb()),
                format!("CPU: {:.1}%", stats.cpu_percent),
            ];
            if let Some(threads) = stats.threads {
                lines.push(format!("Threads: {}", threads));
            }
            embed = embed.field(format!("{} Process", emojis::ROBOT), lines.join("\n"), false);
        }

        let recent = if self.recent_history.is_empty() {
            "No developer commands yet".to_string()
        } else {
            self.recent_history
                .iter()
                .map(|r| {
                    let mark = if r.success { emojis::SUCCESS } else { emojis::ERROR };
                    format!("{} `{}` by {} {}", mark, r.action, r.display_name, relative_time(r.timestamp))
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        embed
            .field(format!("{} Recent commands", emojis::NOTE), recent, false)
            .now()
            .build()
    }
}
