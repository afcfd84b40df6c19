pub mod dev;
pub mod fun;
pub mod general;

use crate::registry::CommandDescriptor;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// A loadable unit of commands. `setup` builds whatever tables the cog
/// answers from; reloading a cog runs it again and re-reads its commands.
#[async_trait]
pub trait Cog: Send + Sync {
    fn name(&self) -> &'static str;

    fn commands(&self) -> Vec<CommandDescriptor>;

    async fn setup(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// The local command tree: every cog and the descriptors it contributed
/// the last time it was (re)loaded.
pub struct CommandTree {
    cogs: Vec<Arc<dyn Cog>>,
    loaded: RwLock<HashMap<&'static str, Vec<CommandDescriptor>>>,
}

impl CommandTree {
    pub fn new(cogs: Vec<Arc<dyn Cog>>) -> Self {
        Self { cogs, loaded: RwLock::new(HashMap::new()) }
    }

    pub fn cog_names(&self) -> Vec<&'static str> {
        self.cogs.iter().map(|c| c.name()).collect()
    }

    /// Loads every cog; a broken cog is logged and left out.
    pub async fn load_all(&self) -> usize {
        let mut loaded = 0;
        for cog in &self.cogs {
            match self.reload(cog.name()).await {
                Ok(count) => {
                    info!("✅ Loaded cog {} ({} commands)", cog.name(), count);
                    loaded += 1;
                }
                Err(e) => error!("❌ Failed to load cog {}: {:#}", cog.name(), e),
            }
        }
        loaded
    }

    /// Re-runs the cog's setup and replaces its commands. On failure the
    /// previously loaded commands stay in place.
    pub async fn reload(&self, name: &str) -> anyhow::Result<usize> {
        let cog = self
            .cogs
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| anyhow::anyhow!("no cog named '{}'", name))?;

        cog.setup().await?;
        let commands = cog.commands();
        for cmd in &commands {
            cmd.validate()?;
        }

        let count = commands.len();
        self.loaded.write().await.insert(cog.name(), commands);
        Ok(count)
    }

    /// All loaded definitions in cog order. Names may repeat across cogs.
    pub async fn local_commands(&self) -> Vec<CommandDescriptor> {
        let loaded = self.loaded.read().await;
        self.cogs
            .iter()
            .filter_map(|c| loaded.get(c.name()))
            .flat_map(|cmds| cmds.iter().cloned())
            .collect()
    }
}

/// The bot's cogs in registration order.
pub fn default_cogs(general: Arc<general::GeneralCog>, fun: Arc<fun::FunCog>) -> Vec<Arc<dyn Cog>> {
    vec![general, fun, Arc::new(dev::DevCog)]
}

/// Usage counters shown by `ping` and `dev status`.
#[derive(Default)]
pub struct BotStats {
    pub ping: AtomicU64,
    pub roll: AtomicU64,
    pub help: AtomicU64,
    pub dev: AtomicU64,
    pub errors_caught: AtomicU64,
    pub messages_processed: AtomicU64,
}

impl BotStats {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    pub fn commands_used(&self) -> u64 {
        [&self.ping, &self.roll, &self.help, &self.dev]
            .iter()
            .map(|c| Self::get(c))
            .sum()
    }
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// A cog whose setup can be made to fail, counting every attempt.
    pub struct FakeCog {
        pub name: &'static str,
        pub commands: Vec<&'static str>,
        pub fail: bool,
        pub setups: AtomicUsize,
    }

    impl FakeCog {
        pub fn new(name: &'static str, commands: &[&'static str]) -> Self {
            Self { name, commands: commands.to_vec(), fail: false, setups: AtomicUsize::new(0) }
        }

        pub fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        pub fn setups(&self) -> usize {
            self.setups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Cog for FakeCog {
        fn name(&self) -> &'static str {
            self.name
        }

        fn commands(&self) -> Vec<CommandDescriptor> {
            self.commands
                .iter()
                .map(|n| CommandDescriptor::new(n, "test command"))
                .collect()
        }

        async fn setup(&self) -> anyhow::Result<()> {
            self.setups.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("{} exploded during setup", self.name);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeCog;
    use super::*;

    #[tokio::test]
    async fn local_commands_follow_cog_order_and_keep_duplicates() {
        let tree = CommandTree::new(vec![
            Arc::new(FakeCog::new("a", &["ping", "help"])),
            Arc::new(FakeCog::new("b", &["roll", "ping"])),
        ]);
        assert_eq!(tree.load_all().await, 2);
        let names: Vec<String> = tree.local_commands().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["ping", "help", "roll", "ping"]);
    }

    #[tokio::test]
    async fn failed_cog_is_left_out() {
        let tree = CommandTree::new(vec![
            Arc::new(FakeCog::new("a", &["ping"])),
            Arc::new(FakeCog::new("b", &["roll"]).failing()),
        ]);
        assert_eq!(tree.load_all().await, 1);
        assert_eq!(tree.local_commands().await.len(), 1);
        assert!(tree.reload("missing").await.is_err());
    }

    #[tokio::test]
    async fn invalid_descriptor_fails_the_reload() {
        let tree = CommandTree::new(vec![Arc::new(FakeCog::new("a", &["Bad Name"]))]);
        assert!(tree.reload("a").await.is_err());
        assert!(tree.local_commands().await.is_empty());
    }

    #[tokio::test]
    async fn default_cogs_register_the_public_commands() {
        let tree = CommandTree::new(default_cogs(
            Arc::new(general::GeneralCog::new()),
            Arc::new(fun::FunCog::new()),
        ));
        assert_eq!(tree.load_all().await, 3);
        let names: Vec<String> = tree.local_commands().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["ping", "help", "roll", "dev"]);
    }

    #[test]
    fn commands_used_sums_command_counters_only() {
        let stats = BotStats::default();
        BotStats::bump(&stats.ping);
        BotStats::bump(&stats.roll);
        BotStats::bump(&stats.errors_caught);
        assert_eq!(stats.commands_used(), 2);
    }
}
