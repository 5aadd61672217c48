use tracing::warn;

use goin_interpreter::evaluator::DEFAULT_MAX_CALL_DEPTH;

pub const PROMPT_VAR: &str = "GOIN_PROMPT";
pub const HISTORY_SIZE_VAR: &str = "GOIN_HISTORY_SIZE";
pub const MAX_CALL_DEPTH_VAR: &str = "GOIN_MAX_CALL_DEPTH";

/// Settings for an interactive session, read from `GOIN_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplConfig {
    pub prompt: String,
    /// Number of lines kept in the line editor's history
    pub history_size: usize,
    /// Limit on nested function calls before evaluation fails
    pub max_call_depth: usize,
}

impl Default for ReplConfig {
    fn default() -> Self {
        ReplConfig {
            prompt: ">> ".to_owned(),
            history_size: 1000,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl ReplConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value lookup, falling back to defaults for
    /// missing or malformed values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ReplConfig::default();

        ReplConfig {
            prompt: lookup(PROMPT_VAR).unwrap_or(defaults.prompt),
            history_size: parse_count(&lookup, HISTORY_SIZE_VAR, defaults.history_size),
            max_call_depth: parse_count(&lookup, MAX_CALL_DEPTH_VAR, defaults.max_call_depth),
        }
    }
}

fn parse_count(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: usize) -> usize {
    match lookup(key) {
        Some(value) => match value.trim().parse() {
            Ok(count) if count > 0 => count,
            _ => {
                warn!(key, %value, default, "ignoring invalid setting");
                default
            }
        },
        None => default,
    }
}
