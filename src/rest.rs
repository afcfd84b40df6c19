use crate::models::{Application, Role, User};
use crate::registry::{CommandDescriptor, CommandRegistry, PrivilegeLookup, Scope};
use crate::reply::Responder;
use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

const BASE: &str = "https://discord.com/api/v10";

pub struct RestClient {
    client: Client,
    application_id: OnceLock<u64>,
    owners: OnceCell<Vec<u64>>,
}

/// Logs and converts a non-2xx response into an error.
async fn ensure_ok(resp: Response, what: &str) -> anyhow::Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    error!("{} failed {}: {}", what, status, text);
    anyhow::bail!("Discord API error {} ({}): {}", status, what, text)
}

impl RestClient {
    pub fn new(token: &str, application_id: Option<u64>) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        let mut auth_header = header::HeaderValue::from_str(&format!("Bot {}", token.trim()))?;
        auth_header.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_header);

        let client = Client::builder()
            .default_headers(headers)
            .user_agent("DiscordBot (https://github.com/rimuru, 1.0)")
            .build()?;

        let app = OnceLock::new();
        if let Some(id) = application_id {
            let _ = app.set(id);
        }
        Ok(Self { client, application_id: app, owners: OnceCell::new() })
    }

    fn app_id(&self) -> anyhow::Result<u64> {
        self.application_id
            .get()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("application id not known yet"))
    }

    fn commands_url(&self, scope: Scope) -> anyhow::Result<String> {
        let app = self.app_id()?;
        Ok(match scope {
            Scope::Global => format!("{}/applications/{}/commands", BASE, app),
            Scope::Guild(guild) => format!("{}/applications/{}/guilds/{}/commands", BASE, app, guild),
        })
    }

    pub async fn get_gateway_url(&self) -> anyhow::Result<String> {
        let resp = self.client.get(format!("{}/gateway/bot", BASE)).send().await?;
        let body: Value = ensure_ok(resp, "get_gateway_url").await?.json().await?;
        let url = body["url"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing 'url' in GET /gateway/bot response: {:?}", body))?
            .to_string();
        Ok(url)
    }

    /// Checks the token and, when `APPLICATION_ID` was not configured,
    /// adopts the bot user id as the application id.
    pub async fn validate_token(&self) -> anyhow::Result<User> {
        let resp = self.client.get(format!("{}/users/@me", BASE)).send().await?;
        let user: User = ensure_ok(resp, "validate_token").await?.json().await?;
        let _ = self.application_id.set(user.id);
        info!("✅ Token validated — logged in as {}", user.tag());
        Ok(user)
    }

    pub async fn get_application(&self) -> anyhow::Result<Application> {
        let resp = self
            .client
            .get(format!("{}/oauth2/applications/@me", BASE))
            .send()
            .await?;
        Ok(ensure_ok(resp, "get_application").await?.json().await?)
    }

    pub async fn get_guild_member(&self, guild_id: u64, user_id: u64) -> anyhow::Result<Option<Value>> {
        let resp = self
            .client
            .get(format!("{}/guilds/{}/members/{}", BASE, guild_id, user_id))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(ensure_ok(resp, "get_guild_member").await?.json().await?))
    }

    pub async fn get_guild_roles(&self, guild_id: u64) -> anyhow::Result<Vec<Role>> {
        let resp = self
            .client
            .get(format!("{}/guilds/{}/roles", BASE, guild_id))
            .send()
            .await?;
        Ok(ensure_ok(resp, "get_guild_roles").await?.json().await?)
    }

    pub async fn leave_guild(&self, guild_id: u64) -> anyhow::Result<()> {
        let url = format!("{}/users/@me/guilds/{}", BASE, guild_id);
        info!("DELETE {}", url);
        let resp = self.client.delete(&url).send().await?;
        ensure_ok(resp, "leave_guild").await?;
        Ok(())
    }

    /// Round-trip time of a cheap authenticated request, in milliseconds.
    pub async fn measure_latency(&self) -> anyhow::Result<u64> {
        let started = std::time::Instant::now();
        let resp = self.client.get(format!("{}/users/@me", BASE)).send().await?;
        ensure_ok(resp, "measure_latency").await?;
        Ok(started.elapsed().as_millis() as u64)
    }
}

#[async_trait]
impl CommandRegistry for RestClient {
    async fn list(&self, scope: Scope) -> anyhow::Result<Vec<CommandDescriptor>> {
        let resp = self.client.get(self.commands_url(scope)?).send().await?;
        Ok(ensure_ok(resp, "list_commands").await?.json().await?)
    }

    async fn remove(&self, scope: Scope, command: &CommandDescriptor) -> anyhow::Result<()> {
        let id = command
            .id
            .ok_or_else(|| anyhow::anyhow!("command /{} has no id", command.name))?;
        let url = format!("{}/{}", self.commands_url(scope)?, id);
        info!("DELETE {} (/{})", url, command.name);
        let resp = self.client.delete(&url).send().await?;
        ensure_ok(resp, "delete_command").await?;
        Ok(())
    }

    async fn submit(
        &self,
        scope: Scope,
        commands: &[CommandDescriptor],
    ) -> anyhow::Result<Vec<CommandDescriptor>> {
        let url = self.commands_url(scope)?;
        info!("PUT {} ({} commands)", url, commands.len());
        let resp = self.client.put(&url).json(commands).send().await?;
        Ok(ensure_ok(resp, "bulk_overwrite_commands").await?.json().await?)
    }
}

#[async_trait]
impl PrivilegeLookup for RestClient {
    async fn is_owner(&self, user_id: u64) -> anyhow::Result<bool> {
        let owners = self
            .owners
            .get_or_try_init(|| async {
                let app = self.get_application().await?;
                let owners = app.owner_ids();
                debug!("Application owners: {:?}", owners);
                Ok::<_, anyhow::Error>(owners)
            })
            .await?;
        Ok(owners.contains(&user_id))
    }

    async fn member_role_names(&self, guild_id: u64, user_id: u64) -> anyhow::Result<Option<Vec<String>>> {
        let Some(member) = self.get_guild_member(guild_id, user_id).await? else {
            return Ok(None);
        };
        let role_ids: Vec<&str> = member["roles"]
            .as_array()
            .map(|ids| ids.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();

        let names: HashMap<String, String> = self
            .get_guild_roles(guild_id)
            .await?
            .into_iter()
            .map(|r| (r.id, r.name))
            .collect();

        Ok(Some(
            role_ids
                .into_iter()
                .filter_map(|id| names.get(id).cloned())
                .collect(),
        ))
    }
}

#[async_trait]
impl Responder for RestClient {
    async fn send_message(&self, channel_id: u64, body: Value) -> anyhow::Result<()> {
        let url = format!("{}/channels/{}/messages", BASE, channel_id);
        info!("POST {}", url);
        let resp = self.client.post(&url).json(&body).send().await?;
        ensure_ok(resp, "send_message").await?;
        Ok(())
    }

    async fn interaction_callback(
        &self,
        interaction_id: u64,
        interaction_token: &str,
        body: Value,
    ) -> anyhow::Result<()> {
        let resp = self
            .client
            .post(format!("{}/interactions/{}/{}/callback", BASE, interaction_id, interaction_token))
            .json(&body)
            .send()
            .await?;
        ensure_ok(resp, "interaction_callback").await?;
        Ok(())
    }

    async fn followup(&self, interaction_token: &str, body: Value) -> anyhow::Result<()> {
        let resp = self
            .client
            .post(format!("{}/webhooks/{}/{}", BASE, self.app_id()?, interaction_token))
            .json(&body)
            .send()
            .await?;
        ensure_ok(resp, "followup").await?;
        Ok(())
    }
}
