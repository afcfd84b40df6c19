use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GatewayPayload {

    pub op: u8,

    pub d: Option<Value>,

    pub s: Option<u64>,

    pub t: Option<String>,
}

pub type Payload = GatewayPayload;

#[allow(dead_code)]
pub mod op {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RESUME: u8 = 6;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

pub mod intent {
    pub const GUILDS: u32             = 1 << 0;
    pub const GUILD_MEMBERS: u32      = 1 << 1;
    pub const GUILD_MESSAGES: u32     = 1 << 9;
    pub const DIRECT_MESSAGES: u32    = 1 << 12;
    pub const MESSAGE_CONTENT: u32    = 1 << 15;
}

/// Discord sends ids as strings; these helpers keep them as `u64` in memory.
pub mod snowflake {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    fn from_raw<E: de::Error>(raw: Raw) -> Result<u64, E> {
        match raw {
            Raw::Str(s) => s.parse().map_err(E::custom),
            Raw::Num(n) => Ok(n),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        from_raw(Raw::deserialize(d)?)
    }

    pub fn serialize<S: Serializer>(id: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&id.to_string())
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
            Option::<Raw>::deserialize(d)?.map(from_raw::<D::Error>).transpose()
        }

        pub fn serialize<S: Serializer>(id: &Option<u64>, s: S) -> Result<S::Ok, S::Error> {
            match id {
                Some(id) => s.serialize_str(&id.to_string()),
                None => s.serialize_none(),
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct User {
    #[serde(with = "snowflake")]
    pub id: u64,
    pub username: String,
    pub discriminator: Option<String>,
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// `name#1234` for legacy accounts, plain `name` otherwise.
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if d != "0" => format!("{}#{}", self.username, d),
            _ => self.username.clone(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Message {
    #[serde(with = "snowflake")]
    pub id: u64,
    #[serde(default, with = "snowflake::option")]
    pub guild_id: Option<u64>,
    #[serde(with = "snowflake")]
    pub channel_id: u64,
    pub author: User,
    pub content: String,
    #[serde(default)]
    pub mentions: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub struct ReadyData {
    pub session_id: String,
    pub user: User,
    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,
}

#[derive(Debug, Deserialize)]
pub struct UnavailableGuild {
    #[serde(with = "snowflake")]
    pub id: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Guild {
    #[serde(with = "snowflake")]
    pub id: u64,
    pub name: String,
    #[serde(default, with = "snowflake::option")]
    pub owner_id: Option<u64>,
    #[serde(default)]
    pub member_count: Option<u64>,
    #[serde(default, with = "snowflake::option")]
    pub system_channel_id: Option<u64>,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Channel {
    #[serde(with = "snowflake")]
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: Option<String>,
    #[serde(default)]
    pub position: i64,
}

pub mod channel_type {
    pub const GUILD_TEXT: u8 = 0;
}

#[derive(Debug, Deserialize)]
pub struct Interaction {
    #[serde(with = "snowflake")]
    pub id: u64,
    #[serde(with = "snowflake")]
    pub application_id: u64,
    #[serde(rename = "type")]
    pub kind: u8,
    pub data: Option<InteractionData>,
    #[serde(default, with = "snowflake::option")]
    pub guild_id: Option<u64>,
    #[serde(default, with = "snowflake::option")]
    pub channel_id: Option<u64>,
    pub member: Option<Member>,
    pub user: Option<User>,
    pub token: String,
}

impl Interaction {
    /// The invoking user: `member.user` inside guilds, `user` in DMs.
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }

    pub fn command_name(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.name.as_deref())
    }

    /// String value of a top-level command option.
    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.data
            .as_ref()?
            .options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_ref())
            .and_then(|v| v.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct Member {
    pub user: Option<User>,
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct InteractionData {
    pub name: Option<String>,
    #[serde(default)]
    pub options: Vec<InteractionOption>,
}

#[derive(Debug, Deserialize)]
pub struct InteractionOption {
    pub name: String,
    pub value: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Application {
    #[serde(with = "snowflake")]
    pub id: u64,
    pub owner: Option<User>,
    pub team: Option<Team>,
}

#[derive(Debug, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Deserialize)]
pub struct TeamMember {
    pub user: User,
}

impl Application {
    pub fn owner_ids(&self) -> Vec<u64> {
        match &self.team {
            Some(team) => team.members.iter().map(|m| m.user.id).collect(),
            None => self.owner.iter().map(|o| o.id).collect(),
        }
    }
}

pub mod interaction_type {
    pub const APPLICATION_COMMAND: u8 = 2;
}

pub mod callback_type {
    pub const CHANNEL_MESSAGE: u8 = 4;
    pub const DEFERRED_CHANNEL_MESSAGE: u8 = 5;
}

/// Message flag that makes a reply visible to the invoker only.
pub const EPHEMERAL: u64 = 1 << 6;
