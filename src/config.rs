//! Server configuration loaded from environment variables

use crate::types::GameSettings;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_MAX_NAME_CHARS: usize = 24;
const DEFAULT_MAX_CHAT_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory served as the browser client
    pub static_dir: PathBuf,
    /// Optional JSON catalog replacing the built-in questions
    pub catalog_path: Option<PathBuf>,
    /// Lobby settings at startup and after every reset
    pub default_settings: GameSettings,
    /// Fixed seed for reproducible games (None = OS entropy)
    pub rng_seed: Option<u64>,
    pub max_name_chars: usize,
    pub max_chat_chars: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            catalog_path: None,
            default_settings: GameSettings::default(),
            rng_seed: None,
            max_name_chars: DEFAULT_MAX_NAME_CHARS,
            max_chat_chars: DEFAULT_MAX_CHAT_CHARS,
        }
    }
}

/// Read and parse an env var, falling back (with a warning) on bad values
fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}

impl ServerConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = parse_env("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let static_dir = std::env::var("STATIC_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let catalog_path = std::env::var("QUIZ_CATALOG_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let base = defaults.default_settings;
        let turns = parse_env("GAME_TURNS").unwrap_or(base.total_turns);
        let threshold = parse_env("GAME_ERROR_THRESHOLD").unwrap_or(base.error_threshold);
        let multiplier = parse_env("GAME_TRAITOR_MULTIPLIER").unwrap_or(base.traitor_multiplier);
        let default_settings = match GameSettings::new(turns, threshold, multiplier) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Invalid default game settings ({}), using built-in defaults", e);
                base
            }
        };

        let max_name_chars = parse_env("MAX_NAME_CHARS")
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.max_name_chars);
        let max_chat_chars = parse_env("MAX_CHAT_CHARS")
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.max_chat_chars);

        Self {
            bind_addr,
            static_dir,
            catalog_path,
            default_settings,
            rng_seed: parse_env("RNG_SEED"),
            max_name_chars,
            max_chat_chars,
        }
    }
}
