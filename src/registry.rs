//! Contract for the remote command registry and privilege lookups.
//!
//! `RestClient` is the live implementation; tests swap in in-memory fakes.

use crate::models::snowflake;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a command definition is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Guild(u64),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Guild(id) => write!(f, "guild {}", id),
        }
    }
}

/// A remotely registered (or about to be registered) slash command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    #[serde(
        default,
        with = "snowflake::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<u64>,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
}

impl CommandDescriptor {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            description: description.to_string(),
            options: Vec::new(),
        }
    }

    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// Checks the naming rules the gateway enforces for chat-input commands.
    pub fn validate(&self) -> anyhow::Result<()> {
        let name_ok = !self.name.is_empty()
            && self.name.chars().count() <= 32
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !name_ok {
            anyhow::bail!("invalid command name '{}'", self.name);
        }
        let len = self.description.chars().count();
        if len == 0 || len > 100 {
            anyhow::bail!("command '{}' needs a 1-100 character description", self.name);
        }
        if self.options.len() > 25 {
            anyhow::bail!("command '{}' has more than 25 options", self.name);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
}

pub const OPTION_STRING: u8 = 3;

impl CommandOption {
    pub fn string(name: &str, description: &str, required: bool) -> Self {
        Self {
            kind: OPTION_STRING,
            name: name.to_string(),
            description: description.to_string(),
            required,
            choices: Vec::new(),
        }
    }

    pub fn choice(mut self, name: &str, value: &str) -> Self {
        self.choices.push(OptionChoice {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChoice {
    pub name: String,
    pub value: String,
}

#[async_trait]
pub trait CommandRegistry: Send + Sync {
    async fn list(&self, scope: Scope) -> anyhow::Result<Vec<CommandDescriptor>>;

    async fn remove(&self, scope: Scope, command: &CommandDescriptor) -> anyhow::Result<()>;

    /// Replaces the registered set for `scope` and returns what the remote side applied.
    async fn submit(
        &self,
        scope: Scope,
        commands: &[CommandDescriptor],
    ) -> anyhow::Result<Vec<CommandDescriptor>>;
}

#[async_trait]
pub trait PrivilegeLookup: Send + Sync {
    async fn is_owner(&self, user_id: u64) -> anyhow::Result<bool>;

    /// Role names held by the member, `None` when the user is not in the guild.
    async fn member_role_names(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> anyhow::Result<Option<Vec<String>>>;
}

/// Names that occur more than once, in first-seen order.
pub fn duplicate_names(commands: &[CommandDescriptor]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut dups: Vec<String> = Vec::new();
    for cmd in commands {
        if !seen.insert(cmd.name.as_str()) && !dups.contains(&cmd.name) {
            dups.push(cmd.name.clone());
        }
    }
    dups
}

#[cfg(test)]
pub mod fake {
    //! In-memory registry and privilege fakes shared by the dev tool tests.

    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeRegistry {
        pub scopes: Mutex<HashMap<Scope, Vec<CommandDescriptor>>>,
        next_id: AtomicU64,
        pub calls: Mutex<Vec<String>>,
        pub fail_list: Mutex<bool>,
        pub fail_submit: Mutex<bool>,
        pub fail_remove: Mutex<HashSet<String>>,
        /// Names the fake re-adds once per submit, simulating a registry that
        /// has not caught up with earlier removals.
        pub sticky_duplicates: Mutex<HashMap<String, usize>>,
    }

    impl FakeRegistry {
        pub fn new() -> Self {
            Self {
                next_id: AtomicU64::new(1000),
                ..Default::default()
            }
        }

        pub fn seed(&self, scope: Scope, names: &[&str]) {
            let mut scopes = self.scopes.lock().unwrap();
            let entry = scopes.entry(scope).or_default();
            for name in names {
                let mut cmd = CommandDescriptor::new(name, "seeded");
                cmd.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst));
                entry.push(cmd);
            }
        }

        pub fn names(&self, scope: Scope) -> Vec<String> {
            let scopes = self.scopes.lock().unwrap();
            let mut names: Vec<String> = scopes
                .get(&scope)
                .map(|v| v.iter().map(|c| c.name.clone()).collect())
                .unwrap_or_default();
            names.sort();
            names
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl CommandRegistry for FakeRegistry {
        async fn list(&self, scope: Scope) -> anyhow::Result<Vec<CommandDescriptor>> {
            self.log(format!("list {}", scope));
            if *self.fail_list.lock().unwrap() {
                anyhow::bail!("list unavailable");
            }
            Ok(self
                .scopes
                .lock()
                .unwrap()
                .get(&scope)
                .cloned()
                .unwrap_or_default())
        }

        async fn remove(&self, scope: Scope, command: &CommandDescriptor) -> anyhow::Result<()> {
            self.log(format!("remove {} {}", scope, command.name));
            if self.fail_remove.lock().unwrap().contains(&command.name) {
                anyhow::bail!("cannot remove {}", command.name);
            }
            let mut scopes = self.scopes.lock().unwrap();
            if let Some(list) = scopes.get_mut(&scope) {
                list.retain(|c| c.id != command.id);
            }
            Ok(())
        }

        async fn submit(
            &self,
            scope: Scope,
            commands: &[CommandDescriptor],
        ) -> anyhow::Result<Vec<CommandDescriptor>> {
            self.log(format!("submit {} {}", scope, commands.len()));
            if *self.fail_submit.lock().unwrap() {
                anyhow::bail!("submit rejected");
            }
            let mut applied: Vec<CommandDescriptor> = commands
                .iter()
                .cloned()
                .map(|mut c| {
                    c.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst));
                    c
                })
                .collect();
            {
                let mut sticky = self.sticky_duplicates.lock().unwrap();
                for (name, remaining) in sticky.iter_mut() {
                    if *remaining > 0 {
                        *remaining -= 1;
                        let mut ghost = CommandDescriptor::new(name, "stale");
                        ghost.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst));
                        applied.push(ghost);
                    }
                }
            }
            self.scopes.lock().unwrap().insert(scope, applied.clone());
            Ok(applied)
        }
    }

    pub struct FakePrivileges {
        pub owners: Vec<u64>,
        pub roles: HashMap<(u64, u64), Vec<String>>,
        pub fail: bool,
        pub lookups: AtomicUsize,
    }

    impl FakePrivileges {
        pub fn owners(owners: &[u64]) -> Self {
            Self {
                owners: owners.to_vec(),
                roles: HashMap::new(),
                fail: false,
                lookups: AtomicUsize::new(0),
            }
        }

        pub fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PrivilegeLookup for FakePrivileges {
        async fn is_owner(&self, user_id: u64) -> anyhow::Result<bool> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("application lookup failed");
            }
            Ok(self.owners.contains(&user_id))
        }

        async fn member_role_names(
            &self,
            guild_id: u64,
            user_id: u64,
        ) -> anyhow::Result<Option<Vec<String>>> {
            Ok(self.roles.get(&(guild_id, user_id)).cloned())
        }
    }
}
