pub mod colors;
pub mod emojis;

/// Role names that grant developer access inside the development guild.
pub const DEV_ROLE_NAMES: &[&str] = &["Developer", "Bot Developer", "Admin"];

/// Command names registered by earlier revisions of the bot that must not
/// linger in the remote registry.
pub const OBSOLETE_COMMANDS: &[&str] = &[
    "sync",
    "reload",
    "status",
    "cleanup",
    "devtools",
    "dev_sync",
    "dice",
    "d20",
    "info",
];
