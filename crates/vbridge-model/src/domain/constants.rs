/// Maximum number of alerts accepted in a single alerts request.
pub const MAX_ALERTS_PER_REQUEST: usize = 10;

/// Maximum length of a single alert, in characters.
pub const MAX_ALERT_LEN: usize = 100;

/// Maximum length of the caller supplied alerts id, in characters.
pub const MAX_ALERT_ID_LEN: usize = 100;
