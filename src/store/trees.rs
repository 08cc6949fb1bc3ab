pub const USERS: &str = "users";
pub const SESSIONS: &str = "sessions";
pub const QUESTIONS: &str = "questions";
pub const MASTERY_RECORDS: &str = "mastery_records";
pub const ATTEMPTS: &str = "attempts";
pub const USER_PROFILES: &str = "user_profiles";
pub const BOOKMARKS: &str = "bookmarks";
pub const FOCUS_LOGS: &str = "focus_logs";
pub const CONFIG_VERSIONS: &str = "config_versions";
