use crate::constants::{colors, emojis};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

/// Builds the JSON `embed` object the REST API expects.
#[derive(Debug, Clone, Default)]
pub struct EmbedBuilder {
    title: Option<String>,
    description: Option<String>,
    color: Option<u32>,
    fields: Vec<Value>,
    footer: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

impl EmbedBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, emoji: &str, title: impl Into<String>) -> Self {
        let title = title.into();
        self.title = Some(if emoji.is_empty() { title } else { format!("{} {}", emoji, title) });
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        // the API rejects empty values and anything over 1024 chars
        let mut value: String = value.into();
        if value.is_empty() {
            value = "\u{200b}".to_string();
        }
        if value.chars().count() > 1024 {
            value = value.chars().take(1021).collect::<String>() + "...";
        }
        self.fields.push(json!({ "name": name.into(), "value": value, "inline": inline }));
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    pub fn now(self) -> Self {
        self.timestamp(Utc::now())
    }

    pub fn build(self) -> Value {
        let mut embed = json!({ "color": self.color.unwrap_or(colors::EMBED) });
        if let Some(title) = self.title {
            embed["title"] = json!(title);
        }
        if let Some(description) = self.description {
            embed["description"] = json!(description);
        }
        if !self.fields.is_empty() {
            embed["fields"] = Value::Array(self.fields);
        }
        if let Some(footer) = self.footer {
            embed["footer"] = json!({ "text": footer });
        }
        if let Some(ts) = self.timestamp {
            embed["timestamp"] = json!(ts.to_rfc3339());
        }
        embed
    }

    pub fn success(title: &str, description: impl Into<String>) -> Value {
        Self::new()
            .title(emojis::SUCCESS, title)
            .description(description)
            .color(colors::SUCCESS)
            .now()
            .build()
    }

    pub fn error(title: &str, description: impl Into<String>) -> Value {
        Self::new()
            .title(emojis::ERROR, title)
            .description(description)
            .color(colors::ERROR)
            .now()
            .build()
    }
}

/// Discord relative timestamp markup, e.g. "3 minutes ago".
pub fn relative_time(at: DateTime<Utc>) -> String {
    format!("<t:{}:R>", at.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_omits_unset_parts() {
        let embed = EmbedBuilder::new().title("", "Plain").build();
        assert_eq!(embed, json!({ "title": "Plain", "color": colors::EMBED }));
    }

    #[test]
    fn fields_are_never_empty_or_oversized() {
        let long = "x".repeat(2000);
        let embed = EmbedBuilder::new()
            .field("empty", "", true)
            .field("long", long, false)
            .build();
        assert_eq!(embed["fields"][0]["value"], "\u{200b}");
        assert_eq!(embed["fields"][1]["value"].as_str().unwrap().chars().count(), 1024);
        assert_eq!(embed["fields"][1]["inline"], false);
    }

    #[test]
    fn relative_time_uses_unix_seconds() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(relative_time(at), "<t:1700000000:R>");
    }
}
