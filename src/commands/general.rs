use crate::commands::{BotStats, Cog};
use crate::constants::{colors, emojis};
use crate::embed::EmbedBuilder;
use crate::registry::{CommandDescriptor, CommandOption};
use crate::tiers::Tiers;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyStatus {
    pub color: u32,
    pub emoji: &'static str,
    pub label: &'static str,
}

const POOR: LatencyStatus = LatencyStatus {
    color: colors::ERROR,
    emoji: emojis::RED,
    label: "Slow connection",
};

fn latency_table() -> Tiers<LatencyStatus> {
    Tiers::new(vec![
        (100, LatencyStatus { color: colors::SUCCESS, emoji: emojis::GREEN, label: "Excellent connection" }),
        (200, LatencyStatus { color: colors::WARNING, emoji: emojis::YELLOW, label: "Moderate connection" }),
    ])
}

pub struct CommandInfo {
    pub name: &'static str,
    pub emoji: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub examples: &'static [&'static str],
    pub dev_only: bool,
}

pub const CATALOG: &[CommandInfo] = &[
    CommandInfo {
        name: "ping",
        emoji: emojis::PING,
        category: "System",
        description: "Check the bot's latency and uptime",
        usage: "/ping",
        examples: &["See how fast the bot answers", "Check usage statistics"],
        dev_only: false,
    },
    CommandInfo {
        name: "roll",
        emoji: emojis::DICE,
        category: "Games",
        description: "Roll a d20",
        usage: "/roll",
        examples: &["Roll to decide something", "Chase a natural 20"],
        dev_only: false,
    },
    CommandInfo {
        name: "help",
        emoji: emojis::HELP,
        category: "General",
        description: "Show how to use the commands",
        usage: "/help [command]",
        examples: &["/help", "/help roll"],
        dev_only: false,
    },
    CommandInfo {
        name: "dev",
        emoji: emojis::TOOLS,
        category: "Development",
        description: "Developer tools for managing the bot",
        usage: "/dev action:<sync|reload|status|cleanup> [scope:guild|global] [cog:name]",
        examples: &[
            "/dev action:sync scope:guild",
            "/dev action:sync scope:global",
            "/dev action:reload cog:all",
            "/dev action:status",
            "/dev action:cleanup",
        ],
        dev_only: true,
    },
];

fn category_emoji(category: &str) -> &'static str {
    match category {
        "General" => emojis::WRENCH,
        "Games" => emojis::GAME,
        "System" => emojis::SETTINGS,
        _ => emojis::TOOLS,
    }
}

pub struct GeneralCog {
    latency: RwLock<Tiers<LatencyStatus>>,
}

impl GeneralCog {
    pub fn new() -> Self {
        Self { latency: RwLock::new(latency_table()) }
    }

    pub fn latency_status(&self, latency_ms: u64) -> LatencyStatus {
        match self.latency.read() {
            Ok(table) => table.below(latency_ms).copied().unwrap_or(POOR),
            Err(_) => POOR,
        }
    }
}

#[async_trait]
impl Cog for GeneralCog {
    fn name(&self) -> &'static str {
        "general"
    }

    fn commands(&self) -> Vec<CommandDescriptor> {
        let mut scope = CommandOption::string("command", "Command to explain", false);
        for info in CATALOG {
            scope = scope.choice(info.name, info.name);
        }
        vec![
            CommandDescriptor::new("ping", "Check the bot's latency"),
            CommandDescriptor::new("help", "Show how to use the commands").option(scope),
        ]
    }

    async fn setup(&self) -> anyhow::Result<()> {
        let mut table = self
            .latency
            .write()
            .map_err(|_| anyhow::anyhow!("latency table lock poisoned"))?;
        *table = latency_table();
        Ok(())
    }
}

/// `1d 2h 3m 4s`, leading zero units dropped, seconds always present.
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let units = [
        (secs / 86_400, "d"),
        ((secs % 86_400) / 3_600, "h"),
        ((secs % 3_600) / 60, "m"),
    ];

    let mut parts: Vec<String> = Vec::new();
    for (value, unit) in units {
        if value > 0 || !parts.is_empty() {
            parts.push(format!("{}{}", value, unit));
        }
    }
    parts.push(format!("{}s", secs % 60));
    parts.join(" ")
}

pub fn ping_embed(
    status: LatencyStatus,
    latency_ms: u64,
    uptime: Duration,
    guild_count: usize,
    stats: &BotStats,
    invoker: &str,
) -> Value {
    EmbedBuilder::new()
        .title(emojis::PING, "Pong!")
        .description(format!("{} Connection and system check", emojis::CHART))
        .color(status.color)
        .field(format!("{} Latency", emojis::ROCKET), format!("`{}ms`", latency_ms), true)
        .field(
            format!("{} Status", emojis::ANTENNA),
            format!("{} {}", status.emoji, status.label),
            true,
        )
        .field(format!("{} Uptime", emojis::CLOCK), format_uptime(uptime), true)
        .field(
            format!("{} Usage", emojis::CHART),
            format!(
                "{} Servers: {}\n{} Commands used: {}\n{} Roll: {}\n{} Ping: {}",
                emojis::SERVER,
                guild_count,
                emojis::NOTE,
                stats.commands_used(),
                emojis::DICE,
                BotStats::get(&stats.roll),
                emojis::PING,
                BotStats::get(&stats.ping),
            ),
            false,
        )
        .footer(format!("{} Checked by {}", emojis::SEARCH, invoker))
        .now()
        .build()
}

/// Overview of every command, or the detail page of one. Developer-only
/// commands are listed only for developers.
pub fn help_embed(command: Option<&str>, show_dev: bool) -> Value {
    if let Some(name) = command {
        if let Some(info) = CATALOG.iter().find(|c| c.name == name && (show_dev || !c.dev_only)) {
            let examples = info
                .examples
                .iter()
                .map(|e| format!("• {}", e))
                .collect::<Vec<_>>()
                .join("\n");
            return EmbedBuilder::new()
                .title(info.emoji, format!("/{}", info.name))
                .description(info.description)
                .color(colors::BLURPLE)
                .field("Usage", format!("`{}`", info.usage), false)
                .field("Examples", examples, false)
                .field("Category", format!("{} {}", category_emoji(info.category), info.category), true)
                .now()
                .build();
        }
        return EmbedBuilder::error("Unknown command", format!("There is no command named `{}`.", name));
    }

    let mut categories: Vec<&str> = Vec::new();
    for info in CATALOG {
        if !categories.contains(&info.category) {
            categories.push(info.category);
        }
    }

    let mut embed = EmbedBuilder::new()
        .title(emojis::HELP, "Command Help")
        .description("Use `/help <command>` for details on a single command.")
        .color(colors::BLURPLE);
    for category in categories {
        let lines: Vec<String> = CATALOG
            .iter()
            .filter(|c| c.category == category && (show_dev || !c.dev_only))
            .map(|c| format!("{} `/{}` {}", c.emoji, c.name, c.description))
            .collect();
        if lines.is_empty() {
            continue;
        }
        embed = embed.field(format!("{} {}", category_emoji(category), category), lines.join("\n"), false);
    }
    embed.footer(format!("{} {} commands", emojis::ROBOT, CATALOG.len())).now().build()
}

/// Sent when someone mentions the bot.
pub fn mention_embed(invoker: &str, prefix: &str) -> Value {
    EmbedBuilder::new()
        .title(emojis::WAVE, format!("Hi {}!", invoker))
        .description(format!(
            "Use `/help` to see every command, or `{}help` if you prefer prefix commands.",
            prefix
        ))
        .color(colors::BLURPLE)
        .build()
}

pub fn welcome_embed(guild_name: &str, member_count: Option<u64>, prefix: &str) -> Value {
    let mut embed = EmbedBuilder::new()
        .title(emojis::PARTY, format!("Thanks for adding me to {}!", guild_name))
        .description(format!(
            "I answer to slash commands and to the `{}` prefix.\nStart with `/help` to see everything I can do.",
            prefix
        ))
        .color(colors::BLURPLE)
        .field(
            format!("{} Getting started", emojis::HOME),
            format!("`/ping` check the connection\n`/roll` roll a d20\n`{}help` the same help, by prefix", prefix),
            false,
        );
    if let Some(count) = member_count {
        embed = embed.field(format!("{} Members", emojis::MEMBERS), count.to_string(), true);
    }
    embed.now().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_mentions_prefix_and_members() {
        let embed = welcome_embed("Tempest", Some(12), "?");
        assert_eq!(embed["title"], format!("{} Thanks for adding me to Tempest!", emojis::PARTY));
        assert!(embed["description"].as_str().unwrap().contains("`?`"));
        assert_eq!(embed["fields"][1]["value"], "12");
        assert!(welcome_embed("Tempest", None, "!")["fields"].as_array().unwrap().len() == 1);
    }

    #[test]
    fn latency_thresholds() {
        let cog = GeneralCog::new();
        assert_eq!(cog.latency_status(150).label, "Moderate connection");
        assert_eq!(cog.latency_status(40).label, "Excellent connection");
        assert_eq!(cog.latency_status(200), POOR);
        assert_eq!(cog.latency_status(5_000), POOR);
    }

    #[test]
    fn uptime_drops_leading_zero_units() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0s");
        assert_eq!(format_uptime(Duration::from_secs(59)), "59s");
        assert_eq!(format_uptime(Duration::from_secs(3_600)), "1h 0m 0s");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 1h 1m 1s");
        assert_eq!(format_uptime(Duration::from_millis(61_999)), "1m 1s");
    }

    #[test]
    fn help_hides_dev_command_from_regular_users() {
        let public = help_embed(None, false).to_string();
        let dev = help_embed(None, true).to_string();
        assert!(!public.contains("/dev"));
        assert!(dev.contains("/dev"));
        assert_eq!(help_embed(Some("dev"), false)["title"], format!("{} Unknown command", emojis::ERROR));
    }

    #[test]
    fn help_detail_lists_examples() {
        let embed = help_embed(Some("roll"), false);
        assert_eq!(embed["title"], format!("{} /roll", emojis::DICE));
        assert!(embed["fields"][1]["value"].as_str().unwrap().contains("natural 20"));
    }

    #[test]
    fn ping_embed_uses_status_colour() {
        let stats = BotStats::default();
        let status = GeneralCog::new().latency_status(50);
        let embed = ping_embed(status, 50, Duration::from_secs(65), 3, &stats, "tester");
        assert_eq!(embed["color"], colors::SUCCESS);
        assert_eq!(embed["fields"][2]["value"], "1m 5s");
    }
}
