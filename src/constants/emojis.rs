
pub const PING:       &str = "🏓";
pub const HELP:       &str = "❔";
pub const ROBOT:      &str = "🤖";
pub const TOOLS:      &str = "🛠️";

pub const SUCCESS:    &str = "✅";
pub const ERROR:      &str = "❌";
pub const WARNING:    &str = "⚠️";
pub const DONE:       &str = "✨";

pub const DICE:       &str = "🎲";
pub const TARGET:     &str = "🎯";
pub const STAR:       &str = "🌟";
pub const BOOM:       &str = "💥";
pub const PARTY:      &str = "🎉";
pub const BROKEN:     &str = "💔";
pub const NOTE:       &str = "📝";

pub const GREEN:      &str = "🟢";
pub const YELLOW:     &str = "🟡";
pub const RED:        &str = "🔴";
pub const ROCKET:     &str = "🚀";
pub const ANTENNA:    &str = "📡";
pub const CLOCK:      &str = "⏰";
pub const CHART:      &str = "📊";
pub const SEARCH:     &str = "🔍";
pub const KEY:        &str = "🔑";
pub const WAVE:       &str = "👋";
pub const SERVER:     &str = "🏢";
pub const MEMBERS:    &str = "👥";
pub const REFRESH:    &str = "🔄";
pub const RECYCLE:    &str = "♻️";
pub const BROOM:      &str = "🧹";
pub const HOME:       &str = "🏠";
pub const PACKAGE:    &str = "📦";
pub const GAME:       &str = "🎮";
pub const SETTINGS:   &str = "⚙️";
pub const WRENCH:     &str = "🔧";
