//! One way to answer a command, whether it arrived as a prefix message or
//! as a slash-command interaction.

use crate::models::{callback_type, Interaction, Message, User, EPHEMERAL};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};

#[async_trait]
pub trait Responder: Send + Sync {
    async fn send_message(&self, channel_id: u64, body: Value) -> anyhow::Result<()>;

    async fn interaction_callback(
        &self,
        interaction_id: u64,
        interaction_token: &str,
        body: Value,
    ) -> anyhow::Result<()>;

    async fn followup(&self, interaction_token: &str, body: Value) -> anyhow::Result<()>;
}

pub enum Invocation {
    Context {
        channel_id: u64,
        guild_id: Option<u64>,
        author: User,
    },
    Interaction {
        id: u64,
        token: String,
        channel_id: Option<u64>,
        guild_id: Option<u64>,
        user: User,
        acknowledged: AtomicBool,
    },
}

impl Invocation {
    pub fn from_message(msg: &Message) -> Self {
        Invocation::Context {
            channel_id: msg.channel_id,
            guild_id: msg.guild_id,
            author: msg.author.clone(),
        }
    }

    pub fn from_interaction(interaction: &Interaction) -> Option<Self> {
        let user = interaction.invoker()?.clone();
        Some(Invocation::Interaction {
            id: interaction.id,
            token: interaction.token.clone(),
            channel_id: interaction.channel_id,
            guild_id: interaction.guild_id,
            user,
            acknowledged: AtomicBool::new(false),
        })
    }

    pub fn user(&self) -> &User {
        match self {
            Invocation::Context { author, .. } => author,
            Invocation::Interaction { user, .. } => user,
        }
    }

    pub fn guild_id(&self) -> Option<u64> {
        match self {
            Invocation::Context { guild_id, .. } | Invocation::Interaction { guild_id, .. } => *guild_id,
        }
    }

    pub fn channel_id(&self) -> Option<u64> {
        match self {
            Invocation::Context { channel_id, .. } => Some(*channel_id),
            Invocation::Interaction { channel_id, .. } => *channel_id,
        }
    }

    /// Tells the gateway an answer is coming. Only interactions need this;
    /// a second call is a no-op.
    pub async fn defer(&self, out: &dyn Responder, ephemeral: bool) -> anyhow::Result<()> {
        if let Invocation::Interaction { id, token, acknowledged, .. } = self {
            if acknowledged.swap(true, Ordering::SeqCst) {
                return Ok(());
            }
            let flags = if ephemeral { EPHEMERAL } else { 0 };
            out.interaction_callback(
                *id,
                token,
                json!({ "type": callback_type::DEFERRED_CHANNEL_MESSAGE, "data": { "flags": flags } }),
            )
            .await?;
        }
        Ok(())
    }

    /// Sends one embed back to the invoker. Ephemeral delivery only exists
    /// for interactions; prefix commands answer in the channel.
    pub async fn respond(&self, out: &dyn Responder, embed: Value, ephemeral: bool) -> anyhow::Result<()> {
        let flags = if ephemeral { EPHEMERAL } else { 0 };
        match self {
            Invocation::Context { channel_id, .. } => {
                out.send_message(*channel_id, json!({ "embeds": [embed] })).await
            }
            Invocation::Interaction { id, token, acknowledged, .. } => {
                let data = json!({ "embeds": [embed], "flags": flags });
                if acknowledged.swap(true, Ordering::SeqCst) {
                    out.followup(token, data).await
                } else {
                    out.interaction_callback(
                        *id,
                        token,
                        json!({ "type": callback_type::CHANNEL_MESSAGE, "data": data }),
                    )
                    .await
                }
            }
        }
    }
}
