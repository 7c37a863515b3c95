//! Fixed storage keys.
//!
//! The session is persisted as exactly two values. Both keys are always
//! written together and removed together.

/// Column family holding the persisted session.
pub const SESSION_CF: &str = "session";

/// Key of the bearer token (UTF-8 string).
pub const TOKEN: &str = "token";

/// Key of the user profile (JSON document).
pub const USER: &str = "user";

/// Both session keys, in write order.
pub const SESSION_KEYS: [&str; 2] = [TOKEN, USER];
