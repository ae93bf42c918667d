use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub alerting: AlertingConfig,
    #[serde(default)]
    pub auth_gateway: AuthGatewayConfig,
    #[serde(default)]
    pub points: PointsConfig,
    #[serde(default)]
    pub locks: LocksConfig,
    #[serde(default)]
    pub flags: FlagsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Operator alerting channel (mismatched deposits, name conflicts, malformed
/// notifications). Unset URL means log-only.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AlertingConfig {
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Identity/session subsystem used for post-payment session invalidation.
/// Unset base URL means log-only.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthGatewayConfig {
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsConfig {
    #[serde(default = "default_attendance_reward")]
    pub attendance_reward: i64,
    #[serde(default = "default_instructor_reward")]
    pub instructor_reward: i64,
    #[serde(default = "default_activity_reward")]
    pub activity_reward: i64,
    #[serde(default = "default_draw_cost")]
    pub draw_cost: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocksConfig {
    #[serde(default = "default_lock_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

/// Runtime toggles read as a snapshot, never as ambient global state. The
/// authoritative copy lives in `FlagStore`; this struct is both the TOML
/// section and the snapshot type handed to services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagsConfig {
    #[serde(default = "default_period")]
    pub current_period: String,
    #[serde(default = "default_enabled")]
    pub deposit_matching_enabled: bool,
    #[serde(default = "default_enabled")]
    pub point_shop_enabled: bool,
    #[serde(default = "default_flag_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_attendance_reward() -> i64 {
    10
}

fn default_instructor_reward() -> i64 {
    30
}

fn default_activity_reward() -> i64 {
    20
}

fn default_draw_cost() -> i64 {
    100
}

fn default_lock_timeout_ms() -> u64 {
    3000
}

fn default_enabled() -> bool {
    true
}

fn default_flag_refresh_secs() -> u64 {
    300
}

/// Academic term tag, e.g. "2026-1" (Mar-Aug) / "2026-2" (Sep-Feb).
fn default_period() -> String {
    let now = Utc::now();
    let semester = if (3..9).contains(&now.month()) { 1 } else { 2 };
    format!("{}-{}", now.year(), semester)
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            attendance_reward: default_attendance_reward(),
            instructor_reward: default_instructor_reward(),
            activity_reward: default_activity_reward(),
            draw_cost: default_draw_cost(),
        }
    }
}

impl Default for LocksConfig {
    fn default() -> Self {
        Self {
            acquire_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl Default for FlagsConfig {
    fn default() -> Self {
        Self {
            current_period: default_period(),
            deposit_matching_enabled: true,
            point_shop_enabled: true,
            refresh_secs: default_flag_refresh_secs(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("Failed to parse {config_path}: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // no config file: build from env vars and defaults
                let database_url = env::var("DATABASE_URL").map_err(|_| {
                    format!("DATABASE_URL is not set and {config_path} was not found")
                })?;

                Config {
                    server: ServerConfig {
                        host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                        port: env::var("SERVER_PORT")
                            .ok()
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(8080),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: env::var("DB_MAX_CONNECTIONS")
                            .ok()
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(10),
                    },
                    alerting: AlertingConfig::default(),
                    auth_gateway: AuthGatewayConfig::default(),
                    points: PointsConfig::default(),
                    locks: LocksConfig::default(),
                    flags: FlagsConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // env overrides apply even when the file exists
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("ALERTING_WEBHOOK_URL") {
            config.alerting.webhook_url = Some(v);
        }
        if let Ok(v) = env::var("AUTH_GATEWAY_BASE_URL") {
            config.auth_gateway.base_url = Some(v);
        }
        if let Ok(v) = env::var("CURRENT_PERIOD") {
            config.flags.current_period = v;
        }

        Ok(config)
    }
}

/// Read-through snapshot store for the runtime flags. Callers take a
/// `snapshot()` at the start of an operation and never observe a flag change
/// mid-operation; `refresh_from_file` (scheduled or explicitly invoked)
/// swaps in a new snapshot atomically.
#[derive(Clone)]
pub struct FlagStore {
    inner: Arc<RwLock<FlagsConfig>>,
}

impl FlagStore {
    pub fn new(initial: FlagsConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn snapshot(&self) -> FlagsConfig {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn replace(&self, flags: FlagsConfig) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = flags;
    }

    /// Re-read the config file and swap the snapshot. A failed read keeps
    /// the last good snapshot.
    pub fn refresh_from_file(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::from_toml()?;
        self.replace(config.flags);
        Ok(())
    }
}
