pub const BLURPLE: u32 = 0x5865F2;
pub const SUCCESS: u32 = 0x2ECC71;
pub const ERROR:   u32 = 0xE74C3C;
pub const WARNING: u32 = 0xF1C40F;
pub const INFO:    u32 = 0x3498DB;
pub const GOLD:    u32 = 0xF1C40F;
pub const GREYPLE: u32 = 0x99AAB5;
pub const EMBED:   u32 = 0x2B2D31;
