pub const PROFILES: &str = "profiles";
pub const ATTEMPTS: &str = "attempts";
pub const EVENTS: &str = "events";
pub const DAILY_ACTIVITY: &str = "daily_activity";
pub const CONFIG_VERSIONS: &str = "config_versions";

// Secondary index trees
pub const ATTEMPTS_BY_TIME: &str = "attempts_by_time";
