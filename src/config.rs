use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use pose_similarity::LandmarkScheme;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    pub reference: ReferenceConfig,
    pub comparison: ComparisonConfig,
    pub limits: LimitsConfig,
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone)]
pub struct ReferenceConfig {
    /// 启动时载入的参考姿态文件（检测器输出的 JSON），为空则跳过
    pub pose_file: Option<String>,
    pub default_name: String,
}

#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    pub default_scheme: LandmarkScheme,
    pub smooth_window: usize,
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_sessions: usize,
    pub max_sse_connections: usize,
    pub session_idle_ttl_secs: u64,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_sessions: 256,
            max_sse_connections: 64,
            session_idle_ttl_secs: 1800,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = LimitsConfig::default();
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/pose-coach.sled"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            reference: ReferenceConfig {
                pose_file: env::var("REFERENCE_POSE_FILE")
                    .ok()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty()),
                default_name: env_or("DEFAULT_REFERENCE_NAME", "default"),
            },
            comparison: ComparisonConfig {
                default_scheme: env_or_parse("DEFAULT_SCHEME", LandmarkScheme::BlazePose33),
                smooth_window: env_or_parse("SMOOTH_WINDOW", 5_usize).max(1),
            },
            limits: LimitsConfig {
                max_sessions: env_or_parse("MAX_SESSIONS", defaults.max_sessions),
                max_sse_connections: env_or_parse(
                    "MAX_SSE_CONNECTIONS",
                    defaults.max_sse_connections,
                ),
                session_idle_ttl_secs: env_or_parse(
                    "SESSION_IDLE_TTL_SECS",
                    defaults.session_idle_ttl_secs,
                ),
            },
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
