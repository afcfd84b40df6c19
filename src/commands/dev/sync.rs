use crate::clock::Clock;
use crate::commands::CommandTree;
use crate::config::Config;
use crate::constants::OBSOLETE_COMMANDS;
use crate::error::DevError;
use crate::registry::{duplicate_names, CommandDescriptor, CommandRegistry, Scope};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Scope as the operator names it; resolved to a concrete [`Scope`] per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncScope {
    #[default]
    Guild,
    Global,
}

impl FromStr for SyncScope {
    type Err = DevError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "guild" | "" => Ok(SyncScope::Guild),
            "global" => Ok(SyncScope::Global),
            other => Err(DevError::InvalidArgument(format!(
                "scope must be 'guild' or 'global', got '{}'",
                other
            ))),
        }
    }
}

/// Snapshot of the most recent sync, overwritten each time.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRecord {
    pub scope: Scope,
    pub old_count: usize,
    pub new_count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub scope: Scope,
    pub old_count: usize,
    pub applied: usize,
    pub removal_failures: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReloadOutcome {
    pub name: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanupReport {
    pub removed: usize,
    pub resynced: Vec<Scope>,
}

pub struct Reconciler {
    registry: Arc<dyn CommandRegistry>,
    tree: Arc<CommandTree>,
    config: Config,
    clock: Arc<dyn Clock>,
    last_sync: Mutex<Option<SyncRecord>>,
}

impl Reconciler {
    pub fn new(
        registry: Arc<dyn CommandRegistry>,
        tree: Arc<CommandTree>,
        config: Config,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { registry, tree, config, clock, last_sync: Mutex::new(None) }
    }

    pub fn last_sync(&self) -> Option<SyncRecord> {
        self.last_sync.lock().ok().and_then(|r| r.clone())
    }

    pub fn resolve(&self, scope: SyncScope, origin_guild: Option<u64>) -> Result<Scope, DevError> {
        match scope {
            SyncScope::Global => {
                if self.config.dev_mode && !self.config.global_sync_override {
                    return Err(DevError::Configuration(
                        "global sync is disabled in development mode (set DEV_GLOBAL_SYNC_OVERRIDE to allow it)"
                            .to_string(),
                    ));
                }
                Ok(Scope::Global)
            }
            SyncScope::Guild => {
                let target = if self.config.dev_mode {
                    self.config.dev_guild_id
                } else {
                    origin_guild.or(self.config.dev_guild_id)
                };
                target.map(Scope::Guild).ok_or_else(|| {
                    DevError::Configuration("guild sync needs a guild or DEV_GUILD_ID".to_string())
                })
            }
        }
    }

    /// Where startup publishes commands: the dev guild in development,
    /// global otherwise.
    pub fn home_scope(&self) -> Option<Scope> {
        if self.config.dev_mode {
            self.config.dev_guild_id.map(Scope::Guild)
        } else {
            Some(Scope::Global)
        }
    }

    pub async fn sync(&self, scope: SyncScope, origin_guild: Option<u64>) -> Result<SyncReport, DevError> {
        let target = self.resolve(scope, origin_guild)?;
        self.sync_scope(target).await
    }

    /// Clear-then-resync of one scope: remove everything registered, settle,
    /// submit the de-duplicated local set, then correct duplicates once.
    pub async fn sync_scope(&self, scope: Scope) -> Result<SyncReport, DevError> {
        info!("🔄 Syncing commands ({})", scope);

        let existing = self
            .registry
            .list(scope)
            .await
            .map_err(|e| DevError::remote("list", e))?;
        let old_count = existing.len();

        let mut removal_failures = 0;
        for cmd in &existing {
            if let Err(e) = self.registry.remove(scope, cmd).await {
                warn!("Could not remove /{} from {}: {:#}", cmd.name, scope, e);
                removal_failures += 1;
            }
        }

        self.clock.sleep(self.config.settle).await;

        let local = dedupe_by_name(self.tree.local_commands().await);
        let mut applied = self
            .registry
            .submit(scope, &local)
            .await
            .map_err(|e| DevError::remote("submit", e))?;

        let mut warnings = Vec::new();
        let dups = duplicate_names(&applied);
        if !dups.is_empty() {
            warn!("Duplicate commands after submit in {}: {}. Retrying once", scope, dups.join(", "));
            for cmd in applied.iter().filter(|c| dups.contains(&c.name)) {
                if let Err(e) = self.registry.remove(scope, cmd).await {
                    warn!("Could not remove duplicate /{} from {}: {:#}", cmd.name, scope, e);
                    removal_failures += 1;
                }
            }
            applied = self
                .registry
                .submit(scope, &local)
                .await
                .map_err(|e| DevError::remote("resubmit", e))?;

            let remaining = duplicate_names(&applied);
            if !remaining.is_empty() {
                let warning = DevError::DuplicateDetected(remaining);
                warn!("{}", warning);
                warnings.push(warning.to_string());
            }
        }

        let record = SyncRecord {
            scope,
            old_count,
            new_count: applied.len(),
            timestamp: Utc::now(),
        };
        if let Ok(mut last) = self.last_sync.lock() {
            *last = Some(record);
        }

        info!("✅ Synced {} commands to {} (was {})", applied.len(), scope, old_count);
        Ok(SyncReport {
            scope,
            old_count,
            applied: applied.len(),
            removal_failures,
            warnings,
        })
    }

    /// Reloads one cog or, for `"all"`, every cog. Each cog is attempted even
    /// when an earlier one fails.
    pub async fn reload(&self, target: &str) -> Result<Vec<ReloadOutcome>, DevError> {
        let names = self.tree.cog_names();
        let targets: Vec<&'static str> = if target.eq_ignore_ascii_case("all") {
            names
        } else {
            let found = names.into_iter().find(|n| n.eq_ignore_ascii_case(target));
            vec![found.ok_or_else(|| DevError::InvalidArgument(format!("no cog named '{}'", target)))?]
        };

        let mut outcomes = Vec::with_capacity(targets.len());
        for name in targets {
            match self.tree.reload(name).await {
                Ok(count) => {
                    info!("🔁 Reloaded {} ({} commands)", name, count);
                    outcomes.push(ReloadOutcome { name: name.to_string(), success: true, error: None });
                }
                Err(e) => {
                    warn!("Reload of {} failed: {:#}", name, e);
                    outcomes.push(ReloadOutcome {
                        name: name.to_string(),
                        success: false,
                        error: Some(format!("{:#}", e)),
                    });
                }
            }
        }
        Ok(outcomes)
    }

    /// Removes leftover commands from earlier versions of the bot. Only the
    /// home scope is re-synced afterwards; other guilds are just pruned.
    pub async fn cleanup(&self, origin_guild: Option<u64>) -> Result<CleanupReport, DevError> {
        let mut scopes = Vec::new();
        if let Ok(scope) = self.resolve(SyncScope::Guild, origin_guild) {
            scopes.push(scope);
        }
        if !self.config.dev_mode {
            scopes.push(Scope::Global);
        }
        if scopes.is_empty() {
            return Err(DevError::Configuration("cleanup needs a guild or DEV_GUILD_ID".to_string()));
        }

        let mut report = CleanupReport::default();
        for scope in scopes {
            let registered = self
                .registry
                .list(scope)
                .await
                .map_err(|e| DevError::remote("list", e))?;

            let mut removed_here = 0;
            for cmd in registered.iter().filter(|c| OBSOLETE_COMMANDS.contains(&c.name.as_str())) {
                match self.registry.remove(scope, cmd).await {
                    Ok(()) => {
                        info!("🧹 Removed obsolete /{} from {}", cmd.name, scope);
                        removed_here += 1;
                    }
                    Err(e) => warn!("Could not remove obsolete /{} from {}: {:#}", cmd.name, scope, e),
                }
            }

            report.removed += removed_here;
            if removed_here > 0 && self.home_scope() == Some(scope) {
                self.sync_scope(scope).await?;
                report.resynced.push(scope);
            }
        }
        Ok(report)
    }
}

/// Keeps the first definition of every name.
fn dedupe_by_name(commands: Vec<CommandDescriptor>) -> Vec<CommandDescriptor> {
    let mut seen = HashSet::new();
    commands
        .into_iter()
        .filter(|c| seen.insert(c.name.clone()))
        .collect()
}
