//! `userAccountControl` bit-flag helpers
//!
//! Account state in the directory is a single integer attribute of OR-ed
//! flags. Only the disable bit is interpreted here; everything else is
//! opaque and must survive a status toggle unchanged, which is why enabling
//! or disabling is always a read-modify-write of the full integer and never
//! a bare boolean write.

/// The account is disabled.
pub const ACCOUNT_DISABLE: u32 = 0x0002;

/// Default flags for a user object (`NORMAL_ACCOUNT`).
pub const DEFAULT_USER_FLAGS: u32 = 0x0200;

/// Default flags for a computer object (`WORKSTATION_TRUST_ACCOUNT`).
pub const DEFAULT_COMPUTER_FLAGS: u32 = 0x1000;

/// Whether the disable bit is set.
pub fn is_disabled(flags: u32) -> bool {
    flags & ACCOUNT_DISABLE != 0
}

/// Returns the flag integer with only the disable bit changed.
pub fn with_enabled(flags: u32, enabled: bool) -> u32 {
    if enabled {
        flags & !ACCOUNT_DISABLE
    } else {
        flags | ACCOUNT_DISABLE
    }
}
