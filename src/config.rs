use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum TraceMode {
    Off,
    Stdout,
    Log,
}

/// Per-connection tuning shared by every chat session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Messages buffered per member before new ones are dropped for it.
    pub outbox_capacity: usize,
    pub max_message_size: usize,
    pub ping_interval: Duration,
    pub read_timeout: Duration,
    /// Upper bound on a single frame write or the final close.
    pub write_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            outbox_capacity: 256,
            max_message_size: 64 * 1024,
            ping_interval: Duration::from_secs(30),
            read_timeout: Duration::from_secs(90),
            write_timeout: Duration::from_secs(10),
        }
    }
}

pub struct Config {
    pub bind: String,
    pub port: u16,
    pub session: SessionConfig,
    pub avatar_path: PathBuf,
    pub avatar_chain: Vec<String>,
    pub max_upload_size: usize,
    pub trace: TraceMode,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = SessionConfig::default();

        let session = SessionConfig {
            outbox_capacity: env_parse::<usize>("WSCHAT_OUTBOX_CAPACITY")
                .filter(|c| *c > 0)
                .unwrap_or(defaults.outbox_capacity),
            max_message_size: env_parse("WSCHAT_MAX_MESSAGE_SIZE")
                .unwrap_or(defaults.max_message_size),
            ping_interval: env_parse::<u64>("WSCHAT_PING_INTERVAL")
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.ping_interval),
            read_timeout: env_parse::<u64>("WSCHAT_READ_TIMEOUT")
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.read_timeout),
            write_timeout: env_parse::<u64>("WSCHAT_WRITE_TIMEOUT")
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.write_timeout),
        };

        let trace = match std::env::var("WSCHAT_TRACE")
            .unwrap_or_else(|_| "stdout".to_string())
            .to_lowercase()
            .as_str()
        {
            "off" | "none" => TraceMode::Off,
            "log" => TraceMode::Log,
            _ => TraceMode::Stdout,
        };

        let avatar_chain = std::env::var("WSCHAT_AVATAR_CHAIN")
            .unwrap_or_else(|_| "auth,gravatar,file".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            bind: std::env::var("WSCHAT_BIND").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("PORT").unwrap_or(8080),
            session,
            avatar_path: std::env::var("WSCHAT_AVATAR_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./avatars")),
            avatar_chain,
            max_upload_size: env_parse("WSCHAT_MAX_UPLOAD_SIZE").unwrap_or(2 * 1024 * 1024),
            trace,
        }
    }
}
