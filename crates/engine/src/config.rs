//! Engine configuration from environment variables.
//!
//! | variable                           | default |
//! |------------------------------------|---------|
//! | `TRUTHDARE_CONTENT_PATH`           | built-in deck |
//! | `TRUTHDARE_START_LEVEL`            | `soft`  |
//! | `TRUTHDARE_TURNS`                  | `10`    |
//! | `TRUTHDARE_LOADING_SHOW_DELAY_MS`  | `100`   |
//! | `TRUTHDARE_LOADING_MIN_VISIBLE_MS` | `1000`  |
//! | `TRUTHDARE_PROGRESSIVE`            | `false` |
//! | `TRUTHDARE_PROGRESSIVE_EVERY`      | `4`     |
//! | `TRUTHDARE_REQUIRED_TAGS`          | none (comma separated) |

use std::path::{Path, PathBuf};
use std::time::Duration;

use truthdare_domain::Level;

use crate::infrastructure::loading::LoadingTimings;
use crate::use_cases::{GameSettings, SchedulerConfig};

const DEFAULT_TURNS: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(name: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub content_path: Option<PathBuf>,
    pub turns: u32,
    pub game: GameSettings,
    pub scheduler: SchedulerConfig,
    pub required_tags: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            content_path: None,
            turns: DEFAULT_TURNS,
            game: GameSettings::default(),
            scheduler: SchedulerConfig::default(),
            required_tags: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup. Unset and blank variables use defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let start_level = match get("TRUTHDARE_START_LEVEL") {
            Some(raw) => raw
                .parse::<Level>()
                .map_err(|e| ConfigError::invalid("TRUTHDARE_START_LEVEL", &raw, e))?,
            None => defaults.game.start_level,
        };

        let turns =
            parse_number("TRUTHDARE_TURNS", get("TRUTHDARE_TURNS"))?.unwrap_or(defaults.turns);

        let show_delay = parse_number(
            "TRUTHDARE_LOADING_SHOW_DELAY_MS",
            get("TRUTHDARE_LOADING_SHOW_DELAY_MS"),
        )?
        .map(Duration::from_millis)
        .unwrap_or(defaults.scheduler.loading.show_delay);
        let min_visible = parse_number(
            "TRUTHDARE_LOADING_MIN_VISIBLE_MS",
            get("TRUTHDARE_LOADING_MIN_VISIBLE_MS"),
        )?
        .map(Duration::from_millis)
        .unwrap_or(defaults.scheduler.loading.min_visible);
        if min_visible < show_delay {
            return Err(ConfigError::invalid(
                "TRUTHDARE_LOADING_MIN_VISIBLE_MS",
                &min_visible.as_millis().to_string(),
                "must not be shorter than the show delay",
            ));
        }

        let progressive = match get("TRUTHDARE_PROGRESSIVE") {
            Some(raw) => parse_bool("TRUTHDARE_PROGRESSIVE", &raw)?,
            None => defaults.game.progressive,
        };
        let progressive_every =
            parse_number("TRUTHDARE_PROGRESSIVE_EVERY", get("TRUTHDARE_PROGRESSIVE_EVERY"))?
                .unwrap_or(defaults.game.progressive_every);
        if progressive_every == 0 {
            return Err(ConfigError::invalid("TRUTHDARE_PROGRESSIVE_EVERY", "0", "must be at least 1"));
        }

        let required_tags = get("TRUTHDARE_REQUIRED_TAGS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            content_path: get("TRUTHDARE_CONTENT_PATH").map(PathBuf::from),
            turns,
            game: GameSettings {
                start_level,
                progressive,
                progressive_every,
            },
            scheduler: SchedulerConfig {
                loading: LoadingTimings {
                    show_delay,
                    min_visible,
                },
            },
            required_tags,
        })
    }
}

fn parse_number<T>(name: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|raw| raw.parse::<T>().map_err(|e| ConfigError::invalid(name, &raw, e)))
        .transpose()
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(name, raw, "expected true or false")),
    }
}

/// Load `.env.local` then `.env` from the repo root, keeping existing variables.
pub fn load_dotenv_from_repo_root() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            if let Err(e) = dotenvy::from_path(&path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load env file");
            }
        }
    }
}
