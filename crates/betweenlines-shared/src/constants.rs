/// Application name
pub const APP_NAME: &str = "Between Lines";

/// Title stored when the sender leaves it empty
pub const DEFAULT_TITLE: &str = "Untitled";

/// Envelope theme tag applied when none is chosen
pub const DEFAULT_ENVELOPE_THEME: &str = "envelope-red";

/// Letter paper theme tag applied when none is chosen
pub const DEFAULT_LETTER_THEME: &str = "letter-sticky";

/// Path prefix of shareable letter links (`<origin>/l/<id>`)
pub const LETTER_PATH_PREFIX: &str = "/l/";

/// Storage prefix for uploaded audio (`audio/<nanos>_<name>`)
pub const AUDIO_PREFIX: &str = "audio";

/// Local storage key holding the serialized history ledger
pub const HISTORY_STORAGE_KEY: &str = "betweenLinesHistory";

/// How long a history entry stays visible
pub const HISTORY_RETENTION_DAYS: i64 = 7;

/// Retention window in milliseconds (7 days)
pub const HISTORY_RETENTION_MS: i64 = HISTORY_RETENTION_DAYS * 24 * 60 * 60 * 1000;

/// Maximum audio attachment size in bytes (20 MiB)
pub const MAX_AUDIO_SIZE: usize = 20 * 1024 * 1024;

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;
