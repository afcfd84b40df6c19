use crate::commands::Cog;
use crate::constants::{colors, emojis};
use crate::embed::EmbedBuilder;
use crate::registry::CommandDescriptor;
use crate::tiers::Tiers;
use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use std::sync::RwLock;

pub const SIDES: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollTier {
    pub color: u32,
    pub emoji: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceResult {
    pub value: u64,
    pub tier: Option<RollTier>,
    pub is_critical: bool,
}

impl DiceResult {
    pub fn title(&self) -> &'static str {
        match self.value {
            20 => "Critical Success!",
            1 => "Critical Fail!",
            v if v >= 15 => "Great Roll!",
            _ => "Roll Result",
        }
    }
}

fn roll_table() -> Tiers<RollTier> {
    Tiers::new(vec![
        (20, RollTier { color: colors::GOLD, emoji: emojis::STAR, message: "A natural 20! Fortune smiles on you!" }),
        (15, RollTier { color: colors::SUCCESS, emoji: emojis::DONE, message: "A high roll!" }),
        (10, RollTier { color: colors::INFO, emoji: emojis::DICE, message: "A decent roll." }),
        (5, RollTier { color: colors::GREYPLE, emoji: emojis::TARGET, message: "An ordinary roll." }),
        (1, RollTier { color: colors::ERROR, emoji: emojis::BOOM, message: "A natural 1... better luck next time!" }),
    ])
}

pub struct FunCog {
    table: RwLock<Tiers<RollTier>>,
}

impl FunCog {
    pub fn new() -> Self {
        Self { table: RwLock::new(roll_table()) }
    }

    pub fn evaluate(&self, value: u64) -> DiceResult {
        let tier = self
            .table
            .read()
            .ok()
            .and_then(|table| table.at_least(value).copied());
        DiceResult { value, tier, is_critical: value == 1 || value == SIDES }
    }

    pub fn roll(&self) -> DiceResult {
        let value = rand::thread_rng().gen_range(1..=SIDES);
        self.evaluate(value)
    }
}

#[async_trait]
impl Cog for FunCog {
    fn name(&self) -> &'static str {
        "fun"
    }

    fn commands(&self) -> Vec<CommandDescriptor> {
        vec![CommandDescriptor::new("roll", "Roll a d20")]
    }

    async fn setup(&self) -> anyhow::Result<()> {
        let mut table = self
            .table
            .write()
            .map_err(|_| anyhow::anyhow!("roll table lock poisoned"))?;
        *table = roll_table();
        Ok(())
    }
}

pub fn roll_embed(result: &DiceResult, invoker: &str) -> Value {
    let (color, emoji) = result
        .tier
        .map(|t| (t.color, t.emoji))
        .unwrap_or((colors::GREYPLE, emojis::DICE));

    let mut embed = EmbedBuilder::new()
        .title(emoji, format!("D{} Roll", SIDES))
        .color(color)
        .field(format!("{} Result", emojis::TARGET), format!("**{}**", result.value), false);

    if let Some(tier) = result.tier {
        let note = match (result.is_critical, result.value) {
            (false, _) => emojis::NOTE,
            (true, 20) => emojis::PARTY,
            (true, _) => emojis::BROKEN,
        };
        embed = embed.field(format!("{} {}", note, result.title()), tier.message, false);
    }

    embed
        .footer(format!("{} Rolled by {}", emojis::DICE, invoker))
        .now()
        .build()
}
